//! Per-character timing for highlight playback.
//!
//! Speech services do not always report where each character falls in a
//! clip, and when they do, the timing is often keyed to a different rendering
//! of the sentence than the one shown on the card. This module owns all of
//! the timing math:
//!
//! - [`estimate`] spreads a clip's duration over the characters of a text,
//!   weighted by how long each kind of character is usually spoken, after
//!   carving out configured pauses.
//! - [`align`] re-keys timestamps from the text that was spoken (a kana
//!   reading, a raw transcript) onto the text the card displays.
//!
//! Both are pure functions over strings and slices, so they can be called
//! from any thread without coordination.
//!
//! # Example
//!
//! ```rust
//! use sentence_cards::timing::{align, estimate, PauseRules};
//!
//! let reading = estimate("きょうははれ", 1200.0, &PauseRules::default())
//!     .expect("speakable text within the clip");
//! assert_eq!(reading.len(), 6);
//!
//! // Same characters, different punctuation: timing carries over 1:1.
//! let card = align("きょうは、はれ。", "きょうははれ", &reading);
//! assert_eq!(card.len(), 8);
//! ```

mod aligner;
mod chars;
mod estimator;
mod pause;

pub use aligner::align;
pub use chars::{char_weight, is_punctuation, strip_punctuation, CharClass};
pub use estimator::estimate;
pub use pause::{PauseRules, Token};

use crate::Timestamp;

/// Serialize a timestamp sequence into the JSON shape the card player reads.
pub fn to_json(timestamps: &[Timestamp]) -> Result<String, serde_json::Error> {
    serde_json::to_string(timestamps)
}

/// Parse a timestamp sequence, coercing malformed time fields to 0.
pub fn from_json(json: &str) -> Result<Vec<Timestamp>, serde_json::Error> {
    serde_json::from_str(json)
}
