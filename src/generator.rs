//! Card generation pipeline.
//!
//! Collects raw results from the external services, then applies all timing
//! math in one place: services only ever hand back native timestamps or
//! nothing, and this module decides whether to estimate and whether to
//! re-key timestamps onto the displayed text.

use crate::audio::{audio_file_name, SynthesizedAudio};
use crate::config::Config;
use crate::error::CardError;
use crate::reading::{markdown_to_html, AnalysisMode, FieldExtractor};
use crate::splitter::SentenceSplitter;
use crate::timing::{self, PauseRules};
use crate::{
    CardStore, LanguageModel, NewCard, RecordId, SpeechRecognizer, SpeechSynthesizer, Timestamp,
};

/// Language hint passed to the recognizer for recorded audio.
pub const DEFAULT_LANGUAGE_HINTS: &[&str] = &["ja"];

/// An optimised transcript shorter than this share of the raw transcript is
/// assumed to be truncated and is not used.
const MIN_OPTIMIZED_LENGTH_RATIO: f64 = 0.8;

#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Produce highlight timing at all (estimating it when the synthesizer
    /// reports none).
    pub timestamps_enabled: bool,
    /// Pauses the synthesizer inserts, budgeted for during estimation.
    pub pause_rules: PauseRules,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            timestamps_enabled: true,
            pause_rules: PauseRules::new(),
        }
    }
}

impl From<&Config> for GeneratorOptions {
    fn from(config: &Config) -> Self {
        Self {
            timestamps_enabled: config.interactive_player_enabled,
            pause_rules: config.effective_pause_rules(),
        }
    }
}

/// Audio attached to a drafted card.
#[derive(Debug, Clone, PartialEq)]
pub enum CardAudio {
    /// A freshly synthesized clip and the media file name to store it under.
    Synthesized {
        file_name: String,
        audio: SynthesizedAudio,
    },
    /// The recording the card was transcribed from.
    Recording { url: String },
}

impl CardAudio {
    pub fn reference(&self) -> &str {
        match self {
            CardAudio::Synthesized { file_name, .. } => file_name,
            CardAudio::Recording { url } => url,
        }
    }
}

/// A generated card that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct CardDraft {
    pub front: String,
    pub back_html: String,
    /// The text that was actually spoken, when it differs from `front` or
    /// was extracted from the model's answer.
    pub spoken_text: Option<String>,
    pub audio: Option<CardAudio>,
    /// Timing keyed to the characters of `front`. Empty when no timing is
    /// available.
    pub timestamps: Vec<Timestamp>,
}

impl CardDraft {
    pub fn into_new_card(
        self,
        deck: &str,
        card_type: &str,
        include_audio: bool,
    ) -> Result<NewCard, CardError> {
        let timestamps_json = timing::to_json(&self.timestamps)
            .map_err(|e| CardError::json("serializing timestamps", e))?;
        let (audio_reference, audio) = match self.audio {
            Some(audio) if include_audio => {
                let reference = audio.reference().to_string();
                let bytes = match audio {
                    CardAudio::Synthesized { audio, .. } => Some(audio.bytes),
                    CardAudio::Recording { .. } => None,
                };
                (Some(reference), bytes)
            }
            _ => (None, None),
        };

        Ok(NewCard {
            deck: deck.to_string(),
            card_type: card_type.to_string(),
            front: self.front,
            back_html: self.back_html,
            audio_reference,
            audio,
            timestamps_json,
        })
    }
}

/// Parameters for adding a batch of sentences to a deck.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub deck: String,
    pub card_type: String,
    pub include_audio: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub total: usize,
    pub created: Vec<RecordId>,
    pub failed: Vec<String>,
    pub deck: String,
}

impl BatchReport {
    pub fn success_count(&self) -> usize {
        self.created.len()
    }

    pub fn fail_count(&self) -> usize {
        self.failed.len()
    }
}

pub struct CardGenerator<L: LanguageModel, S: SpeechSynthesizer> {
    language_model: L,
    synthesizer: Option<S>,
    options: GeneratorOptions,
    default_deck: String,
    reading_extractor: FieldExtractor,
    transcript_extractor: FieldExtractor,
    splitter: SentenceSplitter,
}

impl<L: LanguageModel, S: SpeechSynthesizer> CardGenerator<L, S> {
    pub fn new(language_model: L, synthesizer: Option<S>, options: GeneratorOptions) -> Self {
        Self {
            language_model,
            synthesizer,
            options,
            default_deck: "Default".to_string(),
            reading_extractor: FieldExtractor::reading(),
            transcript_extractor: FieldExtractor::optimized_transcript(),
            splitter: SentenceSplitter::default(),
        }
    }

    pub fn from_config(language_model: L, synthesizer: Option<S>, config: &Config) -> Self {
        let mut generator = Self::new(language_model, synthesizer, GeneratorOptions::from(config));
        generator.default_deck = config.default_deck_name.clone();
        generator
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Draft a card for a typed sentence: explanation, spoken reading and
    /// highlight timing keyed to the sentence.
    pub fn draft(&mut self, sentence: &str) -> Result<CardDraft, CardError> {
        log::info!("Starting card generation for: '{}'", sentence);

        let markdown = self
            .language_model
            .generate(sentence, AnalysisMode::Sentence)
            .map_err(|e| CardError::service("language model", e))?;
        if markdown.trim().is_empty() {
            return Err(CardError::EmptyExplanation);
        }
        let back_html = markdown_to_html(&markdown);

        let spoken_text = self.reading_extractor.extract(&markdown);
        let reading = match &spoken_text {
            Some(reading) => reading.clone(),
            None => {
                log::warn!("No reading in model output; synthesizing the sentence itself");
                sentence.to_string()
            }
        };

        let (audio, timestamps) = match self.synthesize(&reading) {
            Some((audio, timestamps)) => (Some(audio), timestamps),
            None => (None, Vec::new()),
        };

        let timestamps = if !timestamps.is_empty() && reading != sentence {
            log::info!(
                "Reading differs from sentence, aligning timestamps: '{}' -> '{}'",
                reading,
                sentence
            );
            let aligned = timing::align(sentence, &reading, &timestamps);
            log::info!(
                "Aligned {} timestamps into {}",
                timestamps.len(),
                aligned.len()
            );
            aligned
        } else {
            timestamps
        };

        Ok(CardDraft {
            front: sentence.to_string(),
            back_html,
            spoken_text,
            audio,
            timestamps,
        })
    }

    /// Synthesize `reading`, returning the clip and its timing (native,
    /// estimated, or empty). `None` when there is no synthesizer or it failed.
    fn synthesize(&mut self, reading: &str) -> Option<(CardAudio, Vec<Timestamp>)> {
        let synthesizer = self.synthesizer.as_mut()?;

        log::info!("Generating audio for reading: '{}'", reading);
        let synthesis = match synthesizer.synthesize(reading) {
            Ok(synthesis) => synthesis,
            Err(err) => {
                log::error!("Speech synthesis failed: {}", err);
                return None;
            }
        };
        if synthesis.audio.bytes.is_empty() {
            log::warn!("Speech synthesis returned no audio data");
            return None;
        }

        let timestamps = if !self.options.timestamps_enabled {
            Vec::new()
        } else {
            match synthesis.timestamps {
                Some(native) if !native.is_empty() => native,
                _ => {
                    log::info!("Synthesizer did not return timestamps. Attempting to estimate them.");
                    synthesis
                        .audio
                        .duration_ms()
                        .and_then(|duration| {
                            timing::estimate(reading, duration, &self.options.pause_rules)
                        })
                        .unwrap_or_default()
                }
            }
        };

        let file_name = audio_file_name(reading, synthesis.audio.format);
        Some((
            CardAudio::Synthesized {
                file_name,
                audio: synthesis.audio,
            },
            timestamps,
        ))
    }

    /// Draft a card from recorded audio: transcribe, let the model restore
    /// punctuation, and key the recognizer's timing to the restored text.
    pub fn draft_from_recording<R: SpeechRecognizer>(
        &mut self,
        recognizer: &mut R,
        audio_url: &str,
    ) -> Result<CardDraft, CardError> {
        log::info!("Transcribing recording: {}", audio_url);

        let recognition = recognizer
            .transcribe(audio_url, DEFAULT_LANGUAGE_HINTS)
            .map_err(|e| CardError::service("speech recognition", e))?;
        let transcript = recognition.text.trim().to_string();
        if transcript.is_empty() {
            return Err(CardError::EmptyTranscript);
        }
        let timestamps = recognition.timestamps.unwrap_or_default();
        log::info!(
            "Transcript has {} characters and {} timestamps",
            transcript.chars().count(),
            timestamps.len()
        );

        let markdown = self
            .language_model
            .generate(&transcript, AnalysisMode::Transcript)
            .map_err(|e| CardError::service("language model", e))?;
        if markdown.trim().is_empty() {
            return Err(CardError::EmptyExplanation);
        }
        let back_html = markdown_to_html(&markdown);

        let min_chars = transcript.chars().count() as f64 * MIN_OPTIMIZED_LENGTH_RATIO;
        let front = self
            .transcript_extractor
            .extract_accepting(&markdown, |candidate| {
                candidate.chars().count() as f64 >= min_chars
            })
            .unwrap_or_else(|| transcript.clone());

        let timestamps = if front != transcript && !timestamps.is_empty() {
            log::info!("Aligning transcript timestamps to the optimised text");
            timing::align(&front, &transcript, &timestamps)
        } else {
            timestamps
        };

        Ok(CardDraft {
            front,
            back_html,
            spoken_text: Some(transcript),
            audio: Some(CardAudio::Recording {
                url: audio_url.to_string(),
            }),
            timestamps,
        })
    }

    /// Split `text` into sentences and store one card per sentence. A failed
    /// sentence is recorded in the report and does not stop the batch.
    pub fn generate_batch<C: CardStore>(
        &mut self,
        text: &str,
        store: &mut C,
        request: &BatchRequest,
    ) -> Result<BatchReport, CardError> {
        let sentences = self.splitter.split(text);
        if sentences.is_empty() {
            return Err(CardError::NoSentences);
        }

        let deck = match request.deck.trim() {
            "" => self.default_deck.clone(),
            deck => deck.to_string(),
        };
        log::info!(
            "Split {} sentences, generating cards into '{}'",
            sentences.len(),
            deck
        );

        let mut report = BatchReport {
            total: sentences.len(),
            deck: deck.clone(),
            ..BatchReport::default()
        };

        for (index, sentence) in sentences.into_iter().enumerate() {
            log::info!("Processing sentence {}/{}", index + 1, report.total);
            match self.store_sentence(&sentence, store, &deck, request) {
                Ok(id) => report.created.push(id),
                Err(err) => {
                    log::warn!("Sentence {} failed: {}", index + 1, err);
                    report.failed.push(sentence);
                }
            }
        }

        Ok(report)
    }

    fn store_sentence<C: CardStore>(
        &mut self,
        sentence: &str,
        store: &mut C,
        deck: &str,
        request: &BatchRequest,
    ) -> Result<RecordId, CardError> {
        let card = self
            .draft(sentence)?
            .into_new_card(deck, &request.card_type, request.include_audio)?;
        store
            .create(&card)
            .map_err(|e| CardError::service("card store", e))
    }
}
