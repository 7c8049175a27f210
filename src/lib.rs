pub mod audio;
pub mod config;
pub mod engines;
pub mod error;
pub mod generator;
pub mod reading;
pub mod session;
pub mod splitter;
pub mod timing;

use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;

pub use audio::{AudioFormat, SynthesizedAudio};
pub use error::CardError;
pub use reading::AnalysisMode;

/// Timing of one (usually single-character) slice of a clip, in milliseconds
/// from the start of the clip.
///
/// This is the literal shape the card player consumes, so it round-trips
/// through JSON as `{"text", "begin_time", "end_time"}`. Reading is lenient:
/// time fields that are not numbers are coerced to 0 rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    #[serde(default)]
    pub text: String,
    #[serde(default, deserialize_with = "lenient_millis")]
    pub begin_time: u64,
    #[serde(default, deserialize_with = "lenient_millis")]
    pub end_time: u64,
}

impl Timestamp {
    pub fn new(text: impl Into<String>, begin_time: u64, end_time: u64) -> Self {
        Self {
            text: text.into(),
            begin_time,
            end_time,
        }
    }

    /// Zero-width marker at `at`.
    pub fn point(text: impl Into<String>, at: u64) -> Self {
        Self::new(text, at, at)
    }
}

fn lenient_millis<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(millis_from_value(&value))
}

fn millis_from_value(value: &serde_json::Value) -> u64 {
    use serde_json::Value;

    match value {
        Value::Number(number) => {
            if let Some(ms) = number.as_u64() {
                ms
            } else if let Some(ms) = number.as_f64() {
                if ms.is_finite() && ms > 0.0 {
                    ms.round() as u64
                } else {
                    0
                }
            } else {
                0
            }
        }
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|ms| ms.is_finite() && *ms > 0.0)
            .map(|ms| ms.round() as u64)
            .unwrap_or(0),
        _ => 0,
    }
}

/// Result of a speech-synthesis call.
#[derive(Debug, Clone)]
pub struct Synthesis {
    pub audio: SynthesizedAudio,
    /// Word or character timing reported by the service itself, if any.
    pub timestamps: Option<Vec<Timestamp>>,
}

/// Result of a speech-recognition call.
#[derive(Debug, Clone)]
pub struct Recognition {
    pub text: String,
    pub timestamps: Option<Vec<Timestamp>>,
}

/// Opaque identifier handed back by a [`CardStore`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

/// Everything a card store needs to persist one card.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCard {
    pub deck: String,
    pub card_type: String,
    pub front: String,
    pub back_html: String,
    /// File name or URL of the clip, when the card has audio.
    pub audio_reference: Option<String>,
    pub audio: Option<Vec<u8>>,
    /// Serialized timestamp sequence, see [`timing::to_json`].
    pub timestamps_json: String,
}

/// Produces the markdown explanation shown on the back of a card.
pub trait LanguageModel {
    fn generate(&mut self, text: &str, mode: AnalysisMode) -> Result<String, Box<dyn Error>>;
}

pub trait SpeechSynthesizer {
    fn synthesize(&mut self, text: &str) -> Result<Synthesis, Box<dyn Error>>;
}

pub trait SpeechRecognizer {
    fn transcribe(
        &mut self,
        audio_url: &str,
        language_hints: &[&str],
    ) -> Result<Recognition, Box<dyn Error>>;
}

pub trait CardStore {
    fn create(&mut self, card: &NewCard) -> Result<RecordId, Box<dyn Error>>;
}
