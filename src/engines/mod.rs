//! Local implementations of the external service traits.
//!
//! Hosted language-model, synthesis and recognition services are provided
//! by the embedding application. This module only carries backends that can
//! run in-process.
//!
//! ## Whisper (feature `whisper`)
//!
//! [`whisper::WhisperRecognizer`] transcribes local 16 kHz mono WAV files with
//! a GGML Whisper model and reports token-level timestamps, which the
//! generator then re-keys onto the punctuated transcript.
//!
//! ```rust,ignore
//! use sentence_cards::{engines::whisper::WhisperRecognizer, SpeechRecognizer};
//! use std::path::Path;
//!
//! let mut recognizer = WhisperRecognizer::load(Path::new("models/whisper-medium-q4_1.bin"))?;
//! let recognition = recognizer.transcribe("recording.wav", &["ja"])?;
//! println!("{}", recognition.text);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#[cfg(feature = "whisper")]
pub mod whisper;
