/*
 * @file audio.rs
 * @brief Microphone capture helpers for Jarvis
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

//! Microphone recording.
//!
//! This module owns the CPAL input stream and the silence detection that
//! turns an open-ended recording into a single bounded utterance. The
//! microphone is acquired per call and released when the stream is dropped,
//! whatever the outcome.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Result;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig, StreamError};

/// Sample rate for audio recording (16kHz).
///
/// Value is expressed in Hertz and matches Whisper's preferred input rate.
const SAMPLE_RATE: u32 = 16000;

/// Number of audio channels (mono).
///
/// Mono input keeps bandwidth low while remaining compatible with Whisper.
const CHANNELS: u16 = 1;

/// How long to wait for speech to begin before giving up on the attempt.
const LISTEN_TIMEOUT: Duration = Duration::from_secs(5);

/// Trailing silence that marks the end of an utterance.
const PAUSE_THRESHOLD: Duration = Duration::from_secs(1);

/// Hard cap on utterance length so a noisy room cannot record forever.
const MAX_UTTERANCE: Duration = Duration::from_secs(15);

/// Interval at which freshly captured samples are inspected for speech.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Minimum RMS amplitude considered speech.
///
/// Values much above ~300 miss normal speaking levels on some microphones, so
/// we bias toward a lower threshold and rely on Whisper to filter background noise.
const SPEECH_RMS_THRESHOLD: f32 = 150.0;

/// Records one utterance from the default input device.
///
/// # Details
/// Opens the microphone, waits up to [`LISTEN_TIMEOUT`] for speech to begin,
/// then keeps recording until [`PAUSE_THRESHOLD`] of trailing silence or the
/// [`MAX_UTTERANCE`] cap. The stream is dropped before returning, so the
/// device is never held across loop iterations.
///
/// # Returns
/// * `Ok(Some(samples))` - A recorded utterance as 16-bit PCM at 16 kHz mono.
/// * `Ok(None)` - No speech began before the listen timeout elapsed.
///
/// # Errors
/// Returns an error if no input device is available or the stream cannot be
/// built or started.
pub fn record_utterance() -> Result<Option<Vec<i16>>> {
    let device = default_input_device()?;
    let config = input_config();
    let samples = shared_samples();
    let stream = build_input_stream(&device, &config, samples.clone())?;
    stream.play()?;

    let started = Instant::now();
    let mut consumed = 0;
    let mut speech_started = false;
    let mut silent_for = Duration::ZERO;

    loop {
        std::thread::sleep(POLL_INTERVAL);
        let frame = drain_new_samples(&samples, &mut consumed);
        if rms(&frame) >= SPEECH_RMS_THRESHOLD {
            speech_started = true;
            silent_for = Duration::ZERO;
        } else if speech_started {
            silent_for += POLL_INTERVAL;
        }

        if speech_started && silent_for >= PAUSE_THRESHOLD {
            break;
        }
        if !speech_started && started.elapsed() >= LISTEN_TIMEOUT {
            drop(stream);
            return Ok(None);
        }
        if started.elapsed() >= MAX_UTTERANCE {
            break;
        }
    }

    drop(stream);
    let recorded = samples.lock().unwrap().clone();
    Ok(Some(recorded))
}

/// Locates the system default input device.
///
/// # Returns
/// A CPAL [`Device`] ready for stream construction.
///
/// # Errors
/// Returns an error when the user has no available microphone.
fn default_input_device() -> Result<Device> {
    cpal::default_host()
        .default_input_device()
        .ok_or_else(|| anyhow::anyhow!("No input device"))
}

/// Builds the CPAL stream configuration used by the recorder.
///
/// The configuration uses mono audio, a 16 kHz sample rate, and a default buffer.
///
/// # Returns
/// A [`StreamConfig`] tailored to Whisper-friendly audio settings.
fn input_config() -> StreamConfig {
    StreamConfig {
        channels: CHANNELS,
        sample_rate: cpal::SampleRate(SAMPLE_RATE),
        buffer_size: cpal::BufferSize::Default,
    }
}

/// Creates the shared buffer that accumulates captured samples.
///
/// # Returns
/// A thread-safe vector suitable for use inside CPAL callbacks.
fn shared_samples() -> Arc<Mutex<Vec<i16>>> {
    Arc::new(Mutex::new(Vec::new()))
}

/// Builds and configures the CPAL input stream.
///
/// # Parameters
/// * `device` - The input device to capture from.
/// * `config` - The stream configuration (channels/rate/buffer).
/// * `samples` - Shared buffer that receives converted samples.
///
/// # Returns
/// A started-but-paused [`Stream`] the caller can `play`.
///
/// # Errors
/// Returns any stream-construction issues wrapped in [`anyhow::Error`].
fn build_input_stream(
    device: &Device,
    config: &StreamConfig,
    samples: Arc<Mutex<Vec<i16>>>,
) -> Result<Stream> {
    let shared = samples.clone();
    device
        .build_input_stream(
            config,
            move |data: &[f32], _: &_| push_samples(&shared, data),
            log_stream_error,
            None,
        )
        .map_err(|err| anyhow::anyhow!(err))
}

/// Converts floating-point frames into 16-bit PCM and appends them to the buffer.
///
/// # Parameters
/// * `buffer` - Shared sample accumulator.
/// * `data` - The latest interleaved floating-point frames from CPAL.
fn push_samples(buffer: &Arc<Mutex<Vec<i16>>>, data: &[f32]) {
    let mut guard = buffer.lock().unwrap();
    for &sample in data {
        guard.push((sample * i16::MAX as f32) as i16);
    }
}

/// Copies samples the poll loop has not seen yet out of the shared buffer.
///
/// # Parameters
/// * `buffer` - Shared sample accumulator fed by the CPAL callback.
/// * `consumed` - Number of samples already inspected; updated in place.
///
/// # Returns
/// The slice of samples appended since the previous poll, as an owned vector.
fn drain_new_samples(buffer: &Arc<Mutex<Vec<i16>>>, consumed: &mut usize) -> Vec<i16> {
    let guard = buffer.lock().unwrap();
    let fresh = guard[*consumed..].to_vec();
    *consumed = guard.len();
    fresh
}

/// Computes the root mean square amplitude of a frame of samples.
///
/// # Parameters
/// * `samples` - PCM audio samples as signed 16-bit integers.
///
/// # Returns
/// The RMS energy, or 0.0 for an empty frame.
fn rms(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let energy = samples
        .iter()
        .map(|sample| (*sample as f32).powi(2))
        .sum::<f32>()
        / samples.len() as f32;
    energy.sqrt()
}

/// Logs recoverable stream errors emitted by CPAL.
fn log_stream_error(error: StreamError) {
    log::warn!("Audio stream error: {}", error);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_config_matches_constants() {
        let config = input_config();
        assert_eq!(config.channels, CHANNELS);
        assert_eq!(config.sample_rate.0, SAMPLE_RATE);
    }

    #[test]
    fn shared_samples_starts_empty() {
        let samples = shared_samples();
        assert!(samples.lock().unwrap().is_empty());
    }

    #[test]
    fn push_samples_converts_floats() {
        let samples = shared_samples();
        push_samples(&samples, &[0.0, 0.5, -1.0]);
        let guard = samples.lock().unwrap();
        assert_eq!(guard.len(), 3);
        assert_eq!(guard[0], 0);
        assert!(guard[1] > 0);
        assert!(guard[2] < 0);
    }

    #[test]
    fn drain_new_samples_tracks_progress() {
        let samples = shared_samples();
        push_samples(&samples, &[0.1, 0.2]);
        let mut consumed = 0;
        assert_eq!(drain_new_samples(&samples, &mut consumed).len(), 2);
        assert!(drain_new_samples(&samples, &mut consumed).is_empty());
        push_samples(&samples, &[0.3]);
        assert_eq!(drain_new_samples(&samples, &mut consumed).len(), 1);
    }

    #[test]
    fn rms_requires_energy() {
        assert_eq!(rms(&[]), 0.0);
        assert!(rms(&[0_i16; 1600]) < SPEECH_RMS_THRESHOLD);
        let loud = vec![i16::MAX / 2; 1600];
        assert!(rms(&loud) >= SPEECH_RMS_THRESHOLD);
    }
}
