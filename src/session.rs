use serde::{Deserialize, Serialize};

use crate::reading::FieldExtractor;
use crate::splitter::SentenceSplitter;
use crate::timing::{self, PauseRules};
use crate::Timestamp;

/// Request format accepted by the timing CLI helper.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Estimate per-character timing for a clip without native timestamps.
    /// `pause_rules` overrides the session's configured rules.
    Estimate {
        text: String,
        duration_ms: f64,
        #[serde(default)]
        pause_rules: Option<PauseRules>,
    },
    /// Re-key timestamps from the spoken text onto the displayed text.
    Align {
        canonical_text: String,
        source_text: String,
        #[serde(default)]
        timestamps: Vec<Timestamp>,
    },
    /// Split a block of text into sentences.
    Split { text: String },
    /// Pull the sentence reading out of a model answer.
    ExtractReading { markdown: String },
}

/// Response format produced by the timing session.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    Ready { version: String },
    Timestamps { timestamps: Vec<Timestamp> },
    Unavailable { reason: String },
    Sentences { sentences: Vec<String> },
    Reading { text: Option<String> },
    Error { message: String },
}

/// Stateless request handler around the configured pause rules.
pub struct TimingSession {
    pause_rules: PauseRules,
    splitter: SentenceSplitter,
    reading_extractor: FieldExtractor,
}

impl TimingSession {
    pub fn new(pause_rules: PauseRules) -> Self {
        Self {
            pause_rules,
            splitter: SentenceSplitter::default(),
            reading_extractor: FieldExtractor::reading(),
        }
    }

    pub fn ready_message() -> OutboundMessage {
        OutboundMessage::Ready {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn pause_rules(&self) -> &PauseRules {
        &self.pause_rules
    }

    /// Handle a request and return the responses to send back.
    pub fn handle_inbound(&self, message: InboundMessage) -> Vec<OutboundMessage> {
        match message {
            InboundMessage::Estimate {
                text,
                duration_ms,
                pause_rules,
            } => {
                let rules = pause_rules.as_ref().unwrap_or(&self.pause_rules);
                match timing::estimate(&text, duration_ms, rules) {
                    Some(timestamps) => vec![OutboundMessage::Timestamps { timestamps }],
                    None => vec![OutboundMessage::Unavailable {
                        reason: format!(
                            "no speakable time left in {duration_ms}ms clip after pauses"
                        ),
                    }],
                }
            }
            InboundMessage::Align {
                canonical_text,
                source_text,
                timestamps,
            } => vec![OutboundMessage::Timestamps {
                timestamps: timing::align(&canonical_text, &source_text, &timestamps),
            }],
            InboundMessage::Split { text } => vec![OutboundMessage::Sentences {
                sentences: self.splitter.split(&text),
            }],
            InboundMessage::ExtractReading { markdown } => vec![OutboundMessage::Reading {
                text: self.reading_extractor.extract(&markdown),
            }],
        }
    }
}
