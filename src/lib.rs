/*
 * @file lib.rs
 * @brief Jarvis library root
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

//! Jarvis - a voice-controlled desktop assistant.
//!
//! The assistant runs a single listen-match-act loop:
//! - microphone capture and Whisper recognition turn speech into
//!   lowercase text,
//! - an ordered keyword table maps the text onto one of a dozen actions
//!   (time, date, Wikipedia lookups, music playback, web navigation,
//!   screenshots, jokes, power control),
//! - each action confirms itself through the platform speech synthesizer.
//!
//! # Example
//! ```no_run
//! use anyhow::Result;
//! use jarvis::assistant;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     dotenv::dotenv().ok();
//!     env_logger::init();
//!     assistant::run_assistant().await
//! }
//! ```

pub mod actions;
pub mod assistant;
pub mod audio;
pub mod capture;
pub mod commands;
pub mod speech;
