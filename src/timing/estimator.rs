use super::chars::char_weight;
use super::pause::{PauseRules, Token};
use crate::Timestamp;

/// Estimate per-character timing for a clip that came back without any.
///
/// Configured pauses are carved out of `total_audio_duration_ms` first; the
/// remaining time is shared between the characters in proportion to their
/// [`char_weight`](super::char_weight). Pause literals themselves produce no
/// timestamp.
///
/// Returns `None` when there is nothing to distribute: the pauses use up the
/// whole clip, or the text has no speakable characters. Callers should treat
/// that as "no highlight timing" rather than an error.
///
/// The running position is kept unrounded and only the emitted boundaries
/// are rounded (half to even), so error does not accumulate over long
/// sentences.
pub fn estimate(
    text: &str,
    total_audio_duration_ms: f64,
    pause_rules: &PauseRules,
) -> Option<Vec<Timestamp>> {
    let tokens = pause_rules.tokenize(text);

    let mut total_pause_ms = 0u64;
    let mut total_speech_weight = 0.0;
    for token in &tokens {
        match token {
            Token::Pause { duration_ms, .. } => {
                total_pause_ms = total_pause_ms.saturating_add(*duration_ms)
            }
            Token::Char(ch) => total_speech_weight += char_weight(*ch),
        }
    }

    let net_speech_duration_ms = total_audio_duration_ms - total_pause_ms as f64;
    if net_speech_duration_ms.is_nan()
        || net_speech_duration_ms <= 0.0
        || total_speech_weight == 0.0
    {
        log::warn!(
            "Cannot estimate timestamps: net speech duration {:.2}ms, total speech weight {:.2}",
            net_speech_duration_ms,
            total_speech_weight
        );
        return None;
    }

    let time_per_weight_unit = net_speech_duration_ms / total_speech_weight;
    let mut timestamps = Vec::with_capacity(tokens.len());
    let mut current_time_ms = 0.0;

    for token in tokens {
        match token {
            Token::Pause { duration_ms, .. } => current_time_ms += duration_ms as f64,
            Token::Char(ch) => {
                let char_duration = char_weight(ch) * time_per_weight_unit;
                timestamps.push(Timestamp::new(
                    ch.to_string(),
                    current_time_ms.round_ties_even() as u64,
                    (current_time_ms + char_duration).round_ties_even() as u64,
                ));
                current_time_ms += char_duration;
            }
        }
    }

    log::debug!(
        "Estimated {} timestamps for {:.2}ms of audio",
        timestamps.len(),
        total_audio_duration_ms
    );
    Some(timestamps)
}
