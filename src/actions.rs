/*
 * @file actions.rs
 * @brief Action handlers for spoken commands
 * @author Kevin Thomas
 * @date 2025
 *
 * MIT License
 *
 * Copyright (c) 2025 Kevin Thomas
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Action handlers for the assistant's command vocabulary.
//!
//! Each handler performs one effect and confirms it through speech output
//! plus a console echo. Lookup failures and empty results are spoken, not
//! raised; only genuinely unexpected conditions propagate as errors.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use rand::seq::SliceRandom;

use crate::speech::SpeechEngine;

/// Video site opened by the "open youtube" command.
const YOUTUBE_URL: &str = "https://youtube.com";

/// Search site opened by the "open google" command.
const GOOGLE_URL: &str = "https://google.com";

/// Fixed screenshot filename; repeated captures overwrite it.
const SCREENSHOT_FILE: &str = "screenshot.png";

/// Wikipedia REST endpoint returning a page summary as JSON.
const WIKIPEDIA_SUMMARY_URL: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";

/// Joke source queried by the "tell me a joke" command.
const JOKE_URL: &str = "https://icanhazdadjoke.com/";

/// How many sentences of an encyclopedia summary get spoken.
const SUMMARY_SENTENCES: usize = 2;

/// Speaks the current time.
///
/// The label and the value are spoken separately so the synthesizer pauses
/// between them; the console echo carries both on one line.
pub fn tell_time(speech: &SpeechEngine) {
    let value = Local::now().format("%I:%M:%S %p").to_string();
    speech.speak("The current time is");
    speech.speak(&value);
    println!("The current time is {}", value);
}

/// Speaks the current date.
///
/// Spoken form uses the month name; the console echo uses the numeric
/// month.
pub fn tell_date(speech: &SpeechEngine) {
    let now = Local::now();
    speech.speak("The current date is");
    speech.speak(&format!("{} {} {}", now.day(), now.format("%B"), now.year()));
    println!("The current date is {}/{}/{}", now.day(), now.month(), now.year());
}

/// Captures the full screen and saves it under the user's pictures
/// directory.
///
/// # Errors
/// Returns an error when no platform screenshot tool succeeds.
pub fn take_screenshot(speech: &SpeechEngine) -> Result<()> {
    let path = pictures_dir().join(SCREENSHOT_FILE);
    capture_full_screen(&path)?;
    speech.announce(&format!("Screenshot saved as {}.", path.display()));
    speech.speak("I've taken a screenshot, please check it.");
    Ok(())
}

/// Runs the platform screenshot tool chain until one succeeds.
///
/// # Details
/// On macOS this is `screencapture`. Elsewhere the desktop tools are tried
/// in order: `gnome-screenshot -f`, `scrot --overwrite`, then ImageMagick
/// `import`. Which tool exists depends on the desktop environment, so each
/// failure falls through to the next candidate.
fn capture_full_screen(path: &Path) -> Result<()> {
    let target = path.to_string_lossy().into_owned();

    if cfg!(target_os = "macos") {
        let status = Command::new("screencapture")
            .args(["-x", target.as_str()])
            .status()
            .with_context(|| "Failed to run screencapture")?;
        if status.success() {
            return Ok(());
        }
        anyhow::bail!("screencapture exited with {:?}", status.code());
    }

    let candidates: [(&str, Vec<&str>); 3] = [
        ("gnome-screenshot", vec!["-f", target.as_str()]),
        ("scrot", vec!["--overwrite", target.as_str()]),
        ("import", vec!["-window", "root", target.as_str()]),
    ];
    for (tool, args) in candidates {
        let status = Command::new(tool).args(&args).status();
        if let Ok(status) = status {
            if status.success() {
                return Ok(());
            }
        }
    }
    anyhow::bail!("No screenshot tool succeeded (tried gnome-screenshot, scrot, import)")
}

/// Plays a song from the user's music directory via the OS default
/// handler.
///
/// # Arguments
/// * `speech` - Engine used for the confirmation.
/// * `fragment` - Optional song-name fragment extracted from the command.
///
/// # Details
/// When a fragment is given the listing is filtered by case-insensitive
/// filename substring; the song is chosen uniformly at random among the
/// remaining candidates. An empty result is a normal outcome announced as
/// "No song found."
///
/// # Errors
/// Returns an error if the music directory cannot be listed or the chosen
/// file cannot be handed to the OS.
pub fn play_music(speech: &SpeechEngine, fragment: Option<&str>) -> Result<()> {
    let directory = music_dir();
    match select_song(&directory, fragment)? {
        Some(song) => {
            open_with_default_handler(&song.to_string_lossy())?;
            let name = song
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| song.display().to_string());
            speech.announce(&format!("Playing {}.", name));
        }
        None => speech.announce("No song found."),
    }
    Ok(())
}

/// Picks a random song from the directory, optionally filtered by a
/// case-insensitive filename fragment.
///
/// # Returns
/// * `Ok(Some(path))` - A randomly chosen matching file.
/// * `Ok(None)` - The directory holds no matching files.
///
/// # Errors
/// Returns an error when the directory cannot be read.
pub fn select_song(directory: &Path, fragment: Option<&str>) -> Result<Option<PathBuf>> {
    let mut songs = Vec::new();
    let entries = fs::read_dir(directory)
        .with_context(|| format!("Failed to list {}", directory.display()))?;
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            songs.push(entry.path());
        }
    }

    if let Some(fragment) = fragment.filter(|fragment| !fragment.is_empty()) {
        let needle = fragment.to_lowercase();
        songs.retain(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().to_lowercase().contains(&needle))
                .unwrap_or(false)
        });
    }

    Ok(songs.choose(&mut rand::thread_rng()).cloned())
}

/// Opens the video site in the default browser.
pub fn open_youtube() -> Result<()> {
    open_with_default_handler(YOUTUBE_URL)
}

/// Opens the search site in the default browser.
pub fn open_google() -> Result<()> {
    open_with_default_handler(GOOGLE_URL)
}

/// Hands a URL or file path to the OS-registered default handler.
///
/// The launcher is fire-and-forget: the spawned process is not awaited, so
/// a slow browser start never blocks the assistant loop.
fn open_with_default_handler(target: &str) -> Result<()> {
    let launcher = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    };
    Command::new(launcher)
        .arg(target)
        .spawn()
        .with_context(|| format!("Failed to open {} with {}", target, launcher))?;
    Ok(())
}

/// Looks up a query on Wikipedia and speaks a two-sentence summary.
///
/// # Details
/// A disambiguation page is answered with a request to be more specific;
/// any other failure is logged and answered with a generic apology. Both
/// are recovered locally so the loop never dies on a lookup.
pub async fn search_wikipedia(speech: &SpeechEngine, http: &reqwest::Client, query: &str) {
    speech.speak("Searching Wikipedia...");
    match fetch_wikipedia_summary(http, query).await {
        Ok(WikipediaAnswer::Summary(summary)) => speech.announce(&summary),
        Ok(WikipediaAnswer::Ambiguous) => {
            speech.speak("Multiple results found. Please be more specific.");
        }
        Err(err) => {
            log::warn!("Wikipedia lookup failed: {:#}", err);
            speech.speak("I couldn't find anything on Wikipedia.");
        }
    }
}

/// Outcome of a Wikipedia summary fetch.
enum WikipediaAnswer {
    Summary(String),
    Ambiguous,
}

async fn fetch_wikipedia_summary(
    http: &reqwest::Client,
    query: &str,
) -> Result<WikipediaAnswer> {
    let url = format!("{}/{}", WIKIPEDIA_SUMMARY_URL, urlencoding::encode(query));
    let response = http
        .get(&url)
        .send()
        .await
        .with_context(|| "Failed to reach Wikipedia")?;
    if !response.status().is_success() {
        anyhow::bail!("Wikipedia returned {}", response.status());
    }
    let body: serde_json::Value = response
        .json()
        .await
        .with_context(|| "Failed to parse Wikipedia response")?;
    if body["type"].as_str() == Some("disambiguation") {
        return Ok(WikipediaAnswer::Ambiguous);
    }
    let extract = body["extract"]
        .as_str()
        .filter(|extract| !extract.is_empty())
        .with_context(|| "Summary missing from Wikipedia response")?;
    Ok(WikipediaAnswer::Summary(first_sentences(
        extract,
        SUMMARY_SENTENCES,
    )))
}

/// Truncates text to its first `count` sentences.
fn first_sentences(text: &str, count: usize) -> String {
    let mut result = String::new();
    for (index, chunk) in text.split_inclusive(". ").enumerate() {
        if index >= count {
            break;
        }
        result.push_str(chunk);
    }
    result.trim_end().to_string()
}

/// Fetches one joke and speaks it.
///
/// Failures are spoken and swallowed; a joke service outage is not worth
/// more than an apology.
pub async fn tell_joke(speech: &SpeechEngine, http: &reqwest::Client) {
    match fetch_joke(http).await {
        Ok(joke) => speech.announce(&joke),
        Err(err) => {
            log::warn!("Joke fetch failed: {:#}", err);
            speech.speak("I couldn't come up with a joke right now.");
        }
    }
}

async fn fetch_joke(http: &reqwest::Client) -> Result<String> {
    let body: serde_json::Value = http
        .get(JOKE_URL)
        .header("Accept", "application/json")
        .send()
        .await
        .with_context(|| "Failed to reach the joke service")?
        .json()
        .await
        .with_context(|| "Failed to parse the joke response")?;
    body["joke"]
        .as_str()
        .map(str::to_string)
        .with_context(|| "Joke missing from response")
}

/// Speaks a farewell and powers the machine off.
pub fn shutdown_system(speech: &SpeechEngine) {
    speech.announce("Shutting down the system, goodbye!");
    issue_power_command(PowerAction::Shutdown);
}

/// Speaks a farewell and restarts the machine.
pub fn restart_system(speech: &SpeechEngine) {
    speech.announce("Restarting the system, please wait!");
    issue_power_command(PowerAction::Restart);
}

enum PowerAction {
    Shutdown,
    Restart,
}

/// Issues the platform power command fire-and-forget.
///
/// There is deliberately no confirmation that the command took effect; the
/// process is about to die with the machine anyway. Failures to even start
/// the command are logged.
fn issue_power_command(action: PowerAction) {
    if cfg!(test) {
        return;
    }
    let result = if cfg!(target_os = "windows") {
        let flag = match action {
            PowerAction::Shutdown => "/s",
            PowerAction::Restart => "/r",
        };
        Command::new("shutdown").args([flag, "/f", "/t", "1"]).spawn()
    } else {
        let flag = match action {
            PowerAction::Shutdown => "-h",
            PowerAction::Restart => "-r",
        };
        Command::new("shutdown").args([flag, "now"]).spawn()
    };
    if let Err(err) = result {
        log::warn!("Power command failed to start: {}", err);
    }
}

/// The user's music directory, with a `~/Music` fallback.
fn music_dir() -> PathBuf {
    dirs::audio_dir().unwrap_or_else(|| fallback_user_dir("Music"))
}

/// The user's pictures directory, with a `~/Pictures` fallback.
fn pictures_dir() -> PathBuf {
    dirs::picture_dir().unwrap_or_else(|| fallback_user_dir("Pictures"))
}

fn fallback_user_dir(name: &str) -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn music_fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("create temp dir");
        for name in ["Despacito.mp3", "Bohemian Rhapsody.flac", "lofi beats.ogg"] {
            File::create(dir.path().join(name)).expect("create song");
        }
        dir
    }

    #[test]
    fn select_song_matches_fragments_case_insensitively() {
        let dir = music_fixture();
        let song = select_song(dir.path(), Some("despacito")).unwrap().unwrap();
        assert_eq!(song.file_name().unwrap(), "Despacito.mp3");
    }

    #[test]
    fn select_song_without_fragment_picks_any_file() {
        let dir = music_fixture();
        assert!(select_song(dir.path(), None).unwrap().is_some());
    }

    #[test]
    fn select_song_treats_empty_fragment_as_no_filter() {
        let dir = music_fixture();
        assert!(select_song(dir.path(), Some("")).unwrap().is_some());
    }

    #[test]
    fn select_song_with_unmatched_fragment_is_a_normal_outcome() {
        let dir = music_fixture();
        assert!(select_song(dir.path(), Some("polka")).unwrap().is_none());
    }

    #[test]
    fn select_song_on_empty_directory_finds_nothing() {
        let dir = tempfile::tempdir().expect("create temp dir");
        assert!(select_song(dir.path(), None).unwrap().is_none());
    }

    #[test]
    fn select_song_reports_missing_directory() {
        assert!(select_song(Path::new("/nonexistent/music"), None).is_err());
    }

    #[test]
    fn first_sentences_truncates_to_two() {
        let text = "Rust is a language. It is fast. It is safe.";
        assert_eq!(first_sentences(text, 2), "Rust is a language. It is fast.");
    }

    #[test]
    fn first_sentences_keeps_short_text_whole() {
        assert_eq!(first_sentences("One sentence only.", 2), "One sentence only.");
    }
}
