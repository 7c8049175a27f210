use std::error::Error;
use std::path::{Path, PathBuf};

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::{Recognition, SpeechRecognizer, Timestamp};

#[derive(Debug, Clone)]
pub struct WhisperParams {
    pub beam_size: i32,
    pub suppress_blank: bool,
    pub suppress_non_speech_tokens: bool,
    pub no_speech_thold: f32,
}

impl Default for WhisperParams {
    fn default() -> Self {
        Self {
            beam_size: 3,
            suppress_blank: true,
            suppress_non_speech_tokens: true,
            no_speech_thold: 0.2,
        }
    }
}

/// Speech recognizer backed by a local Whisper model.
pub struct WhisperRecognizer {
    model_path: PathBuf,
    state: whisper_rs::WhisperState,
    params: WhisperParams,
}

impl WhisperRecognizer {
    pub fn load(model_path: &Path) -> Result<Self, Box<dyn Error>> {
        Self::load_with_params(model_path, WhisperParams::default())
    }

    pub fn load_with_params(model_path: &Path, params: WhisperParams) -> Result<Self, Box<dyn Error>> {
        let path = model_path
            .to_str()
            .ok_or("Whisper model path is not valid UTF-8")?;
        let context = WhisperContext::new_with_params(path, WhisperContextParameters::default())?;
        let state = context.create_state()?;
        log::info!("Loaded Whisper model from {}", model_path.display());

        Ok(Self {
            model_path: model_path.to_path_buf(),
            state,
            params,
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    /// `audio_url` is a local WAV path; only the first language hint is used.
    fn transcribe(
        &mut self,
        audio_url: &str,
        language_hints: &[&str],
    ) -> Result<Recognition, Box<dyn Error>> {
        let samples = read_wav_samples(Path::new(audio_url))?;

        let mut full_params = FullParams::new(SamplingStrategy::BeamSearch {
            beam_size: self.params.beam_size,
            patience: -1.0,
        });
        full_params.set_language(language_hints.first().copied());
        full_params.set_print_special(false);
        full_params.set_print_progress(false);
        full_params.set_print_realtime(false);
        full_params.set_print_timestamps(false);
        full_params.set_token_timestamps(true);
        full_params.set_suppress_blank(self.params.suppress_blank);
        full_params.set_suppress_non_speech_tokens(self.params.suppress_non_speech_tokens);
        full_params.set_no_speech_thold(self.params.no_speech_thold);

        self.state.full(full_params, &samples)?;

        let mut text = String::new();
        let mut timestamps = Vec::new();

        for segment in 0..self.state.full_n_segments()? {
            text.push_str(&self.state.full_get_segment_text(segment)?);

            for token in 0..self.state.full_n_tokens(segment)? {
                let token_text = self.state.full_get_token_text(segment, token)?;
                if token_text.starts_with("[_") || token_text.starts_with("<|") {
                    continue;
                }
                let data = self.state.full_get_token_data(segment, token)?;
                // Token times are in centiseconds.
                timestamps.push(Timestamp::new(
                    token_text,
                    (data.t0.max(0) * 10) as u64,
                    (data.t1.max(0) * 10) as u64,
                ));
            }
        }

        log::info!("Whisper produced {} token timestamps", timestamps.len());
        Ok(Recognition {
            text: text.trim().to_string(),
            timestamps: if timestamps.is_empty() {
                None
            } else {
                Some(timestamps)
            },
        })
    }
}

/// Read a 16 kHz, 16-bit, mono PCM WAV file as samples in [-1.0, 1.0].
fn read_wav_samples(wav_path: &Path) -> Result<Vec<f32>, Box<dyn Error>> {
    let mut reader = hound::WavReader::open(wav_path)?;
    let spec = reader.spec();

    if spec.channels != 1 || spec.sample_rate != 16_000 || spec.bits_per_sample != 16 {
        return Err(format!(
            "Expected 16kHz 16-bit mono audio, found {} Hz, {} bits, {} channels",
            spec.sample_rate, spec.bits_per_sample, spec.channels
        )
        .into());
    }
    if spec.sample_format != hound::SampleFormat::Int {
        return Err(format!("Expected Int sample format, found {:?}", spec.sample_format).into());
    }

    let samples: Result<Vec<f32>, _> = reader
        .samples::<i16>()
        .map(|sample| sample.map(|s| s as f32 / i16::MAX as f32))
        .collect();

    Ok(samples?)
}
