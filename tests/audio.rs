use std::error::Error;
use std::io::Cursor;

use sentence_cards::audio::{audio_file_name, wav_duration_ms, AudioFormat, SynthesizedAudio};

fn silent_wav(sample_rate: u32, channels: u16, frames: usize) -> Result<Vec<u8>, Box<dyn Error>> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for _ in 0..frames * channels as usize {
            writer.write_sample(0i16)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

#[test]
fn wav_duration_counts_frames_not_samples() -> Result<(), Box<dyn Error>> {
    let mono = silent_wav(16_000, 1, 16_000)?;
    assert_eq!(wav_duration_ms(&mono)?, 1000.0);

    let stereo = silent_wav(16_000, 2, 8_000)?;
    assert_eq!(wav_duration_ms(&stereo)?, 500.0);
    Ok(())
}

#[test]
fn wav_duration_rejects_non_wav_bytes() {
    assert!(wav_duration_ms(b"ID3 not a wav file").is_err());
}

#[test]
fn reported_duration_wins_over_header() -> Result<(), Box<dyn Error>> {
    let audio = SynthesizedAudio::new(silent_wav(8_000, 1, 8_000)?, AudioFormat::Wav);
    assert_eq!(audio.duration_ms(), Some(1000.0));

    let audio = audio.with_duration_ms(750.0);
    assert_eq!(audio.duration_ms(), Some(750.0));
    Ok(())
}

#[test]
fn compressed_audio_needs_a_reported_duration() {
    let audio = SynthesizedAudio::new(vec![0xFF, 0xFB, 0x90], AudioFormat::Mp3);
    assert_eq!(audio.duration_ms(), None);
    assert_eq!(audio.with_duration_ms(1234.0).duration_ms(), Some(1234.0));
}

#[test]
fn corrupt_wav_has_no_duration() {
    let audio = SynthesizedAudio::new(vec![1, 2, 3, 4], AudioFormat::Wav);
    assert_eq!(audio.duration_ms(), None);
}

#[test]
fn file_names_are_stable_per_reading() {
    let first = audio_file_name("きょうははれ", AudioFormat::Mp3);
    let second = audio_file_name("きょうははれ", AudioFormat::Mp3);
    let other = audio_file_name("あしたはあめ", AudioFormat::Mp3);

    assert_eq!(first, second);
    assert_ne!(first, other);
    assert!(first.ends_with(".mp3"));
    assert_eq!(first.len(), 32 + ".mp3".len());
    assert_eq!(
        audio_file_name("", AudioFormat::Wav),
        "d41d8cd98f00b204e9800998ecf8427e.wav"
    );
}
