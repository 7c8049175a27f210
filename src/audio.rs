//! Audio clip helpers.
//!
//! Synthesized clips come back as raw bytes in whatever container the service
//! produces. Duration estimation needs the clip length, which is either
//! reported by the service or read from the WAV header.

use std::io::Cursor;

use crate::error::CardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
    Flac,
}

impl AudioFormat {
    pub fn extension(self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Flac => "flac",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Flac => "audio/flac",
        }
    }
}

/// A clip returned by a speech-synthesis service.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedAudio {
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
    /// Length of the clip as reported by the service, when it reports one.
    pub reported_duration_ms: Option<f64>,
}

impl SynthesizedAudio {
    pub fn new(bytes: Vec<u8>, format: AudioFormat) -> Self {
        Self {
            bytes,
            format,
            reported_duration_ms: None,
        }
    }

    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.reported_duration_ms = Some(duration_ms);
        self
    }

    /// Clip length in milliseconds.
    ///
    /// Prefers the service-reported length; otherwise WAV clips are measured
    /// from their header. Other containers without a reported length yield
    /// `None`.
    pub fn duration_ms(&self) -> Option<f64> {
        if let Some(duration) = self.reported_duration_ms {
            return Some(duration);
        }

        match self.format {
            AudioFormat::Wav => match wav_duration_ms(&self.bytes) {
                Ok(duration) => Some(duration),
                Err(err) => {
                    log::error!("Failed to read WAV duration: {}", err);
                    None
                }
            },
            other => {
                log::warn!(
                    "Cannot measure {} audio without a reported duration",
                    other.extension()
                );
                None
            }
        }
    }
}

/// Length of an in-memory WAV clip in milliseconds.
///
/// # Examples
///
/// ```rust
/// use sentence_cards::audio::wav_duration_ms;
///
/// let spec = hound::WavSpec {
///     channels: 1,
///     sample_rate: 8_000,
///     bits_per_sample: 16,
///     sample_format: hound::SampleFormat::Int,
/// };
/// let mut cursor = std::io::Cursor::new(Vec::new());
/// {
///     let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
///     for _ in 0..4_000 {
///         writer.write_sample(0i16)?;
///     }
///     writer.finalize()?;
/// }
///
/// assert_eq!(wav_duration_ms(cursor.get_ref())?, 500.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn wav_duration_ms(bytes: &[u8]) -> Result<f64, CardError> {
    let reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Ok(0.0);
    }
    Ok(reader.duration() as f64 * 1000.0 / spec.sample_rate as f64)
}

/// Content-addressed file name for the clip of `reading`, so regenerating a
/// card for the same reading reuses the same media file.
pub fn audio_file_name(reading: &str, format: AudioFormat) -> String {
    format!(
        "{:x}.{}",
        md5::compute(reading.as_bytes()),
        format.extension()
    )
}
