/*
 * @file assistant.rs
 * @brief Implementation of the voice-assistant runtime
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

//! Voice assistant orchestration module.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, Timelike};
use serde::Deserialize;

use crate::actions;
use crate::capture::{CaptureOutcome, Recognizer};
use crate::commands::{self, CommandKind};
use crate::speech::{SpeechEngine, VoiceProfile};

/// File holding the user-chosen assistant name.
///
/// Absence of the file is a valid state; the assistant then answers to
/// [`DEFAULT_ASSISTANT_NAME`].
const ASSISTANT_NAME_FILE: &str = "assistant_name.txt";

/// Name used until the user renames the assistant.
const DEFAULT_ASSISTANT_NAME: &str = "Jarvis";

/// Path to the JSON configuration file that holds runtime defaults.
const CONFIG_PATH: &str = "config.json";

/// Strongly typed representation of `config.json`.
#[derive(Clone, Deserialize)]
struct AppConfig {
    /// Language tag passed to the recognition backend.
    #[serde(default = "fallback_language")]
    language: String,
    /// Voice configuration applied once at startup.
    #[serde(default)]
    voice: VoiceProfile,
}

/// Provides default configuration values when config.json is missing or invalid.
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            language: fallback_language(),
            voice: VoiceProfile::default(),
        }
    }
}

/// Returns the fallback recognition language tag.
///
/// This function exists to satisfy serde's default attribute requirements.
fn fallback_language() -> String {
    "en".to_string()
}

/// Runs the voice assistant loop until the user issues a terminating
/// command.
///
/// # Returns
/// `Ok(())` when a shutdown, restart, or offline command ends the loop.
///
/// # Errors
/// Returns an error only for failures outside the capture path, which are
/// deliberately not recovered.
pub async fn run_assistant() -> Result<()> {
    AssistantRuntime::new()?.run_loop().await
}

/// Runtime container that owns the speech engine, the recognizer, and the
/// HTTP client.
struct AssistantRuntime {
    speech: SpeechEngine,
    recognizer: Recognizer,
    http: reqwest::Client,
}

impl AssistantRuntime {
    /// Creates a new runtime from `config.json` (or its defaults).
    fn new() -> Result<Self> {
        let config = load_app_config();
        Ok(Self {
            speech: SpeechEngine::new(config.voice),
            recognizer: Recognizer::new(config.language),
            http: reqwest::Client::builder()
                .user_agent(concat!("jarvis/", env!("CARGO_PKG_VERSION")))
                .build()
                .with_context(|| "Failed to build HTTP client")?,
        })
    }

    /// Greets the user, then repeats listen-match-act until a terminating
    /// command.
    ///
    /// # Details
    /// Capture outcomes other than recognized text speak their notice and
    /// loop straight back into listening; there is no backoff and no retry
    /// limit. Recognized text that matches no trigger is a silent no-op, a
    /// deliberate carry-over from the assistant's original behavior.
    async fn run_loop(mut self) -> Result<()> {
        self.greet_user();
        loop {
            let command = match self.recognizer.capture_command() {
                CaptureOutcome::Recognized(text) => text,
                CaptureOutcome::Timeout => {
                    self.speech.speak("Timeout occurred. Please try again.");
                    continue;
                }
                CaptureOutcome::Unintelligible => {
                    self.speech.speak("Sorry, I did not understand that.");
                    continue;
                }
                CaptureOutcome::ServiceUnavailable => {
                    self.speech.speak("Speech recognition service is unavailable.");
                    continue;
                }
                CaptureOutcome::Failed(message) => {
                    log::warn!("Capture error: {}", message);
                    self.speech.announce(&format!("An error occurred: {}", message));
                    continue;
                }
            };
            if !self.handle_command(&command).await? {
                return Ok(());
            }
        }
    }

    /// Dispatches one recognized utterance through the command table.
    ///
    /// # Arguments
    /// * `command` - The lowercased utterance.
    ///
    /// # Returns
    /// * `Ok(true)` to keep looping, `Ok(false)` after a terminating
    ///   command.
    ///
    /// # Errors
    /// Surfaces handler failures that are not recovered locally (for
    /// example an unreadable music directory).
    async fn handle_command(&mut self, command: &str) -> Result<bool> {
        let Some(rule) = commands::match_command(command) else {
            log::debug!("No trigger in utterance: {}", command);
            return Ok(true);
        };
        log::info!("Dispatching {:?}", rule.kind);

        match rule.kind {
            CommandKind::Time => actions::tell_time(&self.speech),
            CommandKind::Date => actions::tell_date(&self.speech),
            CommandKind::Wikipedia => {
                let query = commands::strip_trigger(command, "wikipedia");
                actions::search_wikipedia(&self.speech, &self.http, &query).await;
            }
            CommandKind::PlayMusic => {
                let fragment = commands::strip_trigger(command, "play music");
                let fragment = (!fragment.is_empty()).then_some(fragment.as_str());
                actions::play_music(&self.speech, fragment)?;
            }
            CommandKind::OpenYoutube => actions::open_youtube()?,
            CommandKind::OpenGoogle => actions::open_google()?,
            CommandKind::Rename => self.rename_assistant()?,
            CommandKind::Screenshot => actions::take_screenshot(&self.speech)?,
            CommandKind::Joke => actions::tell_joke(&self.speech, &self.http).await,
            CommandKind::Shutdown => {
                actions::shutdown_system(&self.speech);
                return Ok(false);
            }
            CommandKind::Restart => {
                actions::restart_system(&self.speech);
                return Ok(false);
            }
            CommandKind::Offline => {
                self.speech.announce("Going offline. Have a good day!");
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Greets the user according to the time of day and introduces the
    /// assistant by its current name.
    fn greet_user(&self) {
        self.speech.announce("Welcome back, sir!");
        self.speech.announce(salutation_for_hour(Local::now().hour()));
        let name = load_assistant_name();
        self.speech.announce(&format!(
            "{} at your service. Please tell me how may I assist you.",
            name
        ));
    }

    /// Lets the user rename the assistant through one capture attempt.
    ///
    /// # Details
    /// On recognized text the name file is overwritten in place (a plain,
    /// non-atomic write). Any non-recognized outcome leaves the stored
    /// name unchanged and apologizes instead.
    fn rename_assistant(&mut self) -> Result<()> {
        self.speech.speak("What would you like to name me?");
        match self.recognizer.capture_command() {
            CaptureOutcome::Recognized(new_name) => {
                save_assistant_name(Path::new(ASSISTANT_NAME_FILE), &new_name)?;
                self.speech.announce(&format!(
                    "Alright, I will be called {} from now on.",
                    new_name
                ));
            }
            _ => self.speech.speak("Sorry, I couldn't catch that."),
        }
        Ok(())
    }
}

/// Selects the salutation for an hour of the day.
///
/// The boundaries are fixed: [4,12) morning, [12,16) afternoon, [16,24)
/// evening, everything else night.
pub fn salutation_for_hour(hour: u32) -> &'static str {
    if (4..12).contains(&hour) {
        "Good morning!"
    } else if (12..16).contains(&hour) {
        "Good afternoon!"
    } else if (16..24).contains(&hour) {
        "Good evening!"
    } else {
        "Good night, see you tomorrow."
    }
}

/// Loads the assistant name, falling back to the default when the file is
/// absent.
pub fn load_assistant_name() -> String {
    load_assistant_name_from(Path::new(ASSISTANT_NAME_FILE))
}

/// Loads the assistant name from a specific file.
///
/// # Arguments
/// * `path` - The name file to read.
///
/// # Returns
/// The whitespace-trimmed stored name, or the default when the file cannot
/// be read.
pub fn load_assistant_name_from(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(contents) => contents.trim().to_string(),
        Err(_) => DEFAULT_ASSISTANT_NAME.to_string(),
    }
}

/// Overwrites the assistant name file.
///
/// # Errors
/// Returns an error when the file cannot be written.
pub fn save_assistant_name(path: &Path, name: &str) -> Result<()> {
    fs::write(path, name).with_context(|| format!("Failed to write {}", path.display()))
}

/// Loads configuration from `config.json`, falling back to baked defaults
/// when missing.
///
/// # Details
/// A missing file is the normal first-run state and only logged at debug
/// level; a malformed file is worth a warning but never fatal.
fn load_app_config() -> AppConfig {
    match fs::read_to_string(CONFIG_PATH) {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Config parse error ({}): {}", CONFIG_PATH, err);
                AppConfig::default()
            }
        },
        Err(err) => {
            log::debug!("Config not loaded ({}): {}", CONFIG_PATH, err);
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salutation_boundaries_are_exact() {
        assert_eq!(salutation_for_hour(4), "Good morning!");
        assert_eq!(salutation_for_hour(11), "Good morning!");
        assert_eq!(salutation_for_hour(12), "Good afternoon!");
        assert_eq!(salutation_for_hour(15), "Good afternoon!");
        assert_eq!(salutation_for_hour(16), "Good evening!");
        assert_eq!(salutation_for_hour(23), "Good evening!");
        assert_eq!(salutation_for_hour(0), "Good night, see you tomorrow.");
        assert_eq!(salutation_for_hour(3), "Good night, see you tomorrow.");
    }

    #[test]
    fn missing_name_file_defaults_to_jarvis() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("assistant_name.txt");
        assert_eq!(load_assistant_name_from(&path), "Jarvis");
    }

    #[test]
    fn stored_name_is_trimmed_on_load() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("assistant_name.txt");
        fs::write(&path, "Friday\n").expect("write name");
        assert_eq!(load_assistant_name_from(&path), "Friday");
    }

    #[test]
    fn rename_roundtrip_preserves_the_name_exactly() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("assistant_name.txt");
        save_assistant_name(&path, "Edith").expect("save name");
        assert_eq!(fs::read_to_string(&path).unwrap(), "Edith");
        assert_eq!(load_assistant_name_from(&path), "Edith");
    }

    #[test]
    fn default_config_speaks_english() {
        let config = AppConfig::default();
        assert_eq!(config.language, "en");
        assert_eq!(config.voice.rate, 150);
    }

    #[tokio::test]
    async fn terminating_commands_end_the_loop() {
        let mut runtime = AssistantRuntime::new().expect("build runtime");
        assert!(!runtime.handle_command("shutdown now please").await.unwrap());
        assert!(!runtime.handle_command("restart the machine").await.unwrap());
        assert!(!runtime.handle_command("go offline").await.unwrap());
        assert!(!runtime.handle_command("exit").await.unwrap());
    }

    #[tokio::test]
    async fn unmatched_text_keeps_the_loop_running() {
        let mut runtime = AssistantRuntime::new().expect("build runtime");
        assert!(runtime.handle_command("hello there").await.unwrap());
    }
}
