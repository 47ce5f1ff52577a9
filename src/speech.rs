//! Text-to-speech output.
//!
//! Speech goes through the platform synthesizer (`espeak-ng` on Linux, the
//! `say` command on macOS). The voice configuration is fixed at startup and
//! immutable for the process lifetime.

use std::process::Command;
use std::sync::Mutex;

use anyhow::Result;
use serde::Deserialize;

/// Process-wide voice configuration.
///
/// Built once from `config.json` during startup and handed to
/// [`SpeechEngine::new`]; never reconfigured afterwards.
#[derive(Clone, Debug, Deserialize)]
pub struct VoiceProfile {
    /// Synthesizer voice identity (an espeak-ng voice name).
    #[serde(default = "default_voice")]
    pub voice: String,
    /// Speech rate in words per minute.
    #[serde(default = "default_rate")]
    pub rate: u32,
    /// Output volume in the range 0.0 to 1.0.
    #[serde(default = "default_volume")]
    pub volume: f32,
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self {
            voice: default_voice(),
            rate: default_rate(),
            volume: default_volume(),
        }
    }
}

fn default_voice() -> String {
    // Female variant, matching the voice the assistant has always used.
    "en+f3".to_string()
}

fn default_rate() -> u32 {
    150
}

fn default_volume() -> f32 {
    1.0
}

/// Synchronous text-to-speech engine.
pub struct SpeechEngine {
    profile: VoiceProfile,
}

impl SpeechEngine {
    /// Creates an engine bound to the given voice profile.
    pub fn new(profile: VoiceProfile) -> Self {
        Self { profile }
    }

    /// Returns the voice profile this engine speaks with.
    pub fn profile(&self) -> &VoiceProfile {
        &self.profile
    }

    /// Speaks the given text, blocking until synthesis completes.
    ///
    /// # Errors
    /// Returns an error if the text is empty or the synthesizer command
    /// fails to spawn or exits unsuccessfully.
    pub fn say(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            anyhow::bail!("Cannot speak empty text");
        }
        self.run_synthesizer(text)?;
        Ok(())
    }

    /// Speaks the text, logging synthesis failures instead of propagating
    /// them so a broken synthesizer never kills the main loop.
    pub fn speak(&self, text: &str) {
        if let Err(err) = self.say(text) {
            log::warn!("TTS error: {}", err);
        }
    }

    /// Speaks the text and echoes it to the console.
    pub fn announce(&self, text: &str) {
        self.speak(text);
        println!("{}", text);
    }

    fn run_synthesizer(&self, text: &str) -> Result<()> {
        if cfg!(test) {
            if *FORCE_ERROR.lock().unwrap() {
                anyhow::bail!("Forced failure for testing");
            }
            return Ok(());
        }

        let output = if cfg!(target_os = "macos") {
            Command::new("say")
                .arg("-r")
                .arg(self.profile.rate.to_string())
                .arg(text)
                .output()?
        } else {
            // espeak-ng amplitude runs 0..=200 with 100 as nominal full
            // volume, so the 0.0..=1.0 profile volume maps onto 0..=100.
            let amplitude = (self.profile.volume * 100.0) as u32;
            Command::new("espeak-ng")
                .arg("-v")
                .arg(&self.profile.voice)
                .arg("-s")
                .arg(self.profile.rate.to_string())
                .arg("-a")
                .arg(amplitude.to_string())
                .arg(text)
                .output()?
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Synthesizer exited with an error: {}", stderr.trim());
        }
        Ok(())
    }
}

#[cfg_attr(not(test), allow(dead_code))]
static FORCE_ERROR: Mutex<bool> = Mutex::new(false);

#[cfg(test)]
mod tests {
    use super::*;

    static FORCE_ERROR_LOCK: Mutex<()> = Mutex::new(());

    fn engine() -> SpeechEngine {
        SpeechEngine::new(VoiceProfile::default())
    }

    #[test]
    fn say_succeeds_with_text() {
        let _guard = FORCE_ERROR_LOCK.lock().unwrap();
        assert!(engine().say("Hello test").is_ok());
    }

    #[test]
    fn say_fails_when_forced() {
        let _guard = FORCE_ERROR_LOCK.lock().unwrap();
        *FORCE_ERROR.lock().unwrap() = true;
        let result = engine().say("failure case");
        *FORCE_ERROR.lock().unwrap() = false;
        assert!(result.is_err());
    }

    #[test]
    fn say_rejects_empty_text() {
        assert!(engine().say("   ").is_err());
    }

    #[test]
    fn default_profile_matches_startup_configuration() {
        let profile = VoiceProfile::default();
        assert_eq!(profile.rate, 150);
        assert_eq!(profile.volume, 1.0);
    }

    #[test]
    fn profile_deserializes_with_partial_fields() {
        let profile: VoiceProfile = serde_json::from_str(r#"{"rate": 120}"#).unwrap();
        assert_eq!(profile.rate, 120);
        assert_eq!(profile.voice, "en+f3");
    }
}
