use super::chars::{is_punctuation, strip_punctuation};
use crate::Timestamp;

/// Re-key `source_timestamps` (timed against `source_text`) onto the
/// characters of `canonical_text`.
///
/// When both texts carry the same characters once punctuation and spacing
/// are ignored, every canonical character inherits the timing of its
/// counterpart. Otherwise there is no character correspondence to follow and
/// the clip is divided evenly over the canonical characters, which is only an
/// approximation of the real timing.
///
/// Punctuation inherits the end of the previous emitted timestamp as a
/// zero-width marker. With no source timestamps at all, every canonical
/// character gets a zero-width timestamp at 0.
pub fn align(
    canonical_text: &str,
    source_text: &str,
    source_timestamps: &[Timestamp],
) -> Vec<Timestamp> {
    if source_timestamps.is_empty() {
        log::info!("No source timestamps to align; emitting zero-width placeholders");
        return canonical_text
            .chars()
            .map(|ch| Timestamp::point(ch.to_string(), 0))
            .collect();
    }

    let canonical_clean = strip_punctuation(canonical_text);
    let backed_text: String = source_timestamps
        .iter()
        .map(|ts| ts.text.as_str())
        .collect();

    if canonical_clean == strip_punctuation(source_text)
        || canonical_clean == strip_punctuation(&backed_text)
    {
        log::info!("Aligning by character: texts differ only in punctuation");
        align_by_character(canonical_text, source_timestamps)
    } else {
        log::info!("Aligning proportionally: texts differ beyond punctuation");
        align_proportionally(canonical_text, source_timestamps)
    }
}

fn align_by_character(canonical_text: &str, source_timestamps: &[Timestamp]) -> Vec<Timestamp> {
    // Indexed by ordinal of each spoken character in the timestamp-backed string.
    let by_ordinal: Vec<&Timestamp> = source_timestamps
        .iter()
        .flat_map(|ts| {
            ts.text
                .chars()
                .filter(|ch| !is_punctuation(*ch))
                .map(move |_| ts)
        })
        .collect();

    let first_begin = source_timestamps[0].begin_time;
    let mut aligned: Vec<Timestamp> = Vec::with_capacity(canonical_text.chars().count());
    let mut ordinal = 0;

    for ch in canonical_text.chars() {
        let previous_end = aligned.last().map(|ts| ts.end_time);

        if is_punctuation(ch) {
            aligned.push(Timestamp::point(ch.to_string(), previous_end.unwrap_or(first_begin)));
            continue;
        }

        match by_ordinal.get(ordinal) {
            Some(ts) => aligned.push(Timestamp::new(
                ch.to_string(),
                ts.begin_time,
                ts.end_time.max(ts.begin_time),
            )),
            None => {
                if let Some(end) = previous_end {
                    aligned.push(Timestamp::point(ch.to_string(), end));
                }
            }
        }
        ordinal += 1;
    }

    aligned
}

fn align_proportionally(canonical_text: &str, source_timestamps: &[Timestamp]) -> Vec<Timestamp> {
    let spoken_chars = canonical_text
        .chars()
        .filter(|ch| !is_punctuation(*ch))
        .count();

    if spoken_chars == 0 {
        let first = &source_timestamps[0];
        return canonical_text
            .chars()
            .map(|ch| {
                Timestamp::new(
                    ch.to_string(),
                    first.begin_time,
                    first.end_time.max(first.begin_time),
                )
            })
            .collect();
    }

    let total_duration_ms = source_timestamps
        .last()
        .map(|ts| ts.end_time)
        .unwrap_or_default() as f64;
    let time_per_char = total_duration_ms / spoken_chars as f64;

    let mut aligned: Vec<Timestamp> = Vec::with_capacity(canonical_text.chars().count());
    let mut index = 0;

    for ch in canonical_text.chars() {
        if is_punctuation(ch) {
            // Leading punctuation is kept at 0 so the output has one entry
            // per canonical character.
            let previous_end = aligned.last().map(|ts| ts.end_time).unwrap_or(0);
            aligned.push(Timestamp::point(ch.to_string(), previous_end));
            continue;
        }

        let begin = (index as f64 * time_per_char).round_ties_even() as u64;
        let end = ((index + 1) as f64 * time_per_char).round_ties_even() as u64;
        aligned.push(Timestamp::new(ch.to_string(), begin, end));
        index += 1;
    }

    aligned
}
