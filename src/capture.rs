//! Speech capture: one microphone listen-and-recognize attempt.
//!
//! Capture never raises for the expected "no input" cases. Every attempt
//! ends in a [`CaptureOutcome`] so the caller branches over the enumerated
//! failure kinds instead of catching errors.

use anyhow::{Context, Result};

use crate::audio;

/// Whisper model path (auto-downloaded if not present).
const WHISPER_MODEL_PATH: &str = "models/ggml-base.en.bin";

/// Download source for the Whisper GGML model (~147 MB).
const WHISPER_MODEL_URL: &str =
    "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-base.en.bin";

/// Result of a single capture attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Speech was recognized; the text is lowercased for case-insensitive
    /// matching downstream.
    Recognized(String),
    /// No speech began before the listen timeout elapsed.
    Timeout,
    /// Audio was captured but produced no usable transcript.
    Unintelligible,
    /// The recognition backend could not be initialized.
    ServiceUnavailable,
    /// Any other capture or recognition failure, with its message.
    Failed(String),
}

/// Microphone capture plus Whisper transcription.
///
/// The Whisper context is expensive to build, so it is created lazily on
/// the first capture and reused for the process lifetime.
pub struct Recognizer {
    whisper_ctx: Option<whisper_rs::WhisperContext>,
    language: String,
}

impl Recognizer {
    /// Creates a recognizer for the given recognition language tag.
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            whisper_ctx: None,
            language: language.into(),
        }
    }

    /// Performs one listen-and-recognize attempt.
    ///
    /// Blocks for the duration of the recording and the transcription.
    /// Progress states are logged so a silent assistant is observable.
    pub fn capture_command(&mut self) -> CaptureOutcome {
        log::info!("Listening...");
        let samples = match audio::record_utterance() {
            Ok(Some(samples)) => samples,
            Ok(None) => return CaptureOutcome::Timeout,
            Err(err) => return CaptureOutcome::Failed(format!("{:#}", err)),
        };

        log::info!("Recognizing...");
        let language = self.language.clone();
        let ctx = match self.ensure_whisper_context() {
            Ok(ctx) => ctx,
            Err(err) => {
                log::warn!("Recognition backend unavailable: {:#}", err);
                return CaptureOutcome::ServiceUnavailable;
            }
        };
        match transcribe(ctx, &samples, &language) {
            Ok(text) => classify_transcript(&text),
            Err(err) => CaptureOutcome::Failed(format!("{:#}", err)),
        }
    }

    fn ensure_whisper_context(&mut self) -> Result<&whisper_rs::WhisperContext> {
        if self.whisper_ctx.is_none() {
            self.whisper_ctx = Some(init_whisper()?);
        }
        Ok(self.whisper_ctx.as_ref().expect("context initialized above"))
    }
}

/// Maps a raw transcript onto a capture outcome.
///
/// An empty transcript means the recording carried no recognizable speech;
/// anything else is lowercased so keyword matching stays case-insensitive.
fn classify_transcript(text: &str) -> CaptureOutcome {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        CaptureOutcome::Unintelligible
    } else {
        log::debug!("Command: {}", trimmed);
        CaptureOutcome::Recognized(trimmed.to_lowercase())
    }
}

/// Initializes the Whisper context, downloading the model if needed.
///
/// # Errors
/// Returns an error if directory creation, model download, or context
/// initialization fails.
fn init_whisper() -> Result<whisper_rs::WhisperContext> {
    use whisper_rs::WhisperContext;
    std::fs::create_dir_all("models").context("Failed to create models directory")?;
    if !std::path::Path::new(WHISPER_MODEL_PATH).exists() {
        log::info!("Downloading Whisper model (this may take a few minutes)...");
        download_whisper_model()?;
    }
    let mut params = whisper_rs::WhisperContextParameters::default();
    params.use_gpu(false);
    WhisperContext::new_with_params(WHISPER_MODEL_PATH, params)
        .with_context(|| "Failed to initialize Whisper")
}

/// Downloads the Whisper GGML model from Hugging Face.
///
/// Uses the curl command-line tool and follows redirects to handle the
/// Hugging Face CDN. The download is blocking.
fn download_whisper_model() -> Result<()> {
    let output = std::process::Command::new("curl")
        .args(["-L", "-o", WHISPER_MODEL_PATH, WHISPER_MODEL_URL])
        .output()
        .with_context(|| "Failed to execute curl")?;
    if !output.status.success() {
        anyhow::bail!("Failed to download Whisper model");
    }
    log::info!("Whisper model downloaded successfully");
    Ok(())
}

/// Runs Whisper inference over one recorded utterance.
///
/// # Parameters
/// * `ctx` - The initialized Whisper context.
/// * `samples` - 16-bit PCM samples at 16 kHz mono.
/// * `language` - Language tag passed to the recognition backend.
///
/// # Returns
/// The concatenated transcript with whitespace trimmed.
///
/// # Errors
/// Returns an error if state creation or the transcription run fails.
fn transcribe(
    ctx: &whisper_rs::WhisperContext,
    samples: &[i16],
    language: &str,
) -> Result<String> {
    let audio_data = normalize_samples(samples);
    let mut params =
        whisper_rs::FullParams::new(whisper_rs::SamplingStrategy::Greedy { best_of: 1 });
    params.set_language(Some(language));
    params.set_print_progress(false);
    params.set_print_special(false);
    params.set_print_realtime(false);

    let mut state = ctx
        .create_state()
        .with_context(|| "Failed to create Whisper state")?;
    state
        .full(params, &audio_data)
        .with_context(|| "Transcription failed")?;

    let num_segments = state.full_n_segments().unwrap_or(0);
    let mut text = String::new();
    for i in 0..num_segments {
        if let Ok(segment) = state.full_get_segment_text(i) {
            text.push_str(&segment);
            text.push(' ');
        }
    }
    Ok(text.trim().to_string())
}

/// Normalizes i16 samples to the f32 range [-1.0, 1.0] Whisper expects.
fn normalize_samples(samples: &[i16]) -> Vec<f32> {
    samples.iter().map(|&s| s as f32 / 32768.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_lowercases_recognized_text() {
        assert_eq!(
            classify_transcript("  Open YouTube  "),
            CaptureOutcome::Recognized("open youtube".to_string())
        );
    }

    #[test]
    fn classify_treats_blank_transcript_as_unintelligible() {
        assert_eq!(classify_transcript("   "), CaptureOutcome::Unintelligible);
        assert_eq!(classify_transcript(""), CaptureOutcome::Unintelligible);
    }

    #[test]
    fn normalize_maps_extremes_into_unit_range() {
        let normalized = normalize_samples(&[0, i16::MAX, i16::MIN]);
        assert_eq!(normalized[0], 0.0);
        assert!(normalized[1] > 0.99 && normalized[1] <= 1.0);
        assert_eq!(normalized[2], -1.0);
    }
}
