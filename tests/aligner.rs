use sentence_cards::timing::{self, align, estimate, PauseRules};
use sentence_cards::Timestamp;

fn per_char(text: &str, step_ms: u64) -> Vec<Timestamp> {
    text.chars()
        .enumerate()
        .map(|(i, ch)| Timestamp::new(ch.to_string(), i as u64 * step_ms, (i as u64 + 1) * step_ms))
        .collect()
}

fn triples(timestamps: &[Timestamp]) -> Vec<(String, u64, u64)> {
    timestamps
        .iter()
        .map(|ts| (ts.text.clone(), ts.begin_time, ts.end_time))
        .collect()
}

fn expected(rows: &[(&str, u64, u64)]) -> Vec<(String, u64, u64)> {
    rows.iter()
        .map(|(text, begin, end)| (text.to_string(), *begin, *end))
        .collect()
}

#[test]
fn realigning_a_text_against_itself_keeps_timing() {
    let source = estimate("きょうは", 800.0, &PauseRules::new()).expect("timestamps");
    let aligned = align("きょうは", "きょうは", &source);

    assert_eq!(aligned, source);
}

#[test]
fn punctuation_only_differences_keep_acoustic_timing() {
    let source = per_char("きょうははれ", 100);
    let aligned = align("きょうは、はれ。", "きょうははれ", &source);

    assert_eq!(
        triples(&aligned),
        expected(&[
            ("き", 0, 100),
            ("ょ", 100, 200),
            ("う", 200, 300),
            ("は", 300, 400),
            ("、", 400, 400),
            ("は", 400, 500),
            ("れ", 500, 600),
            ("。", 600, 600),
        ])
    );
}

#[test]
fn leading_punctuation_starts_at_first_source_timestamp() {
    let source = vec![Timestamp::new("は", 50, 150), Timestamp::new("い", 150, 300)];
    let aligned = align("「はい」", "はい", &source);

    assert_eq!(
        triples(&aligned),
        expected(&[("「", 50, 50), ("は", 50, 150), ("い", 150, 300), ("」", 300, 300)])
    );
}

#[test]
fn multi_character_tokens_are_shared_by_their_characters() {
    let source = vec![Timestamp::new("きょう", 0, 300), Timestamp::new("は", 300, 400)];
    let aligned = align("きょうは", "きょうは", &source);

    assert_eq!(
        triples(&aligned),
        expected(&[("き", 0, 300), ("ょ", 0, 300), ("う", 0, 300), ("は", 300, 400)])
    );
}

#[test]
fn timestamp_backed_text_can_decide_character_alignment() {
    // The nominal source text is a different spelling, but the timestamps
    // themselves spell the canonical text.
    let source = per_char("きょうは", 100);
    let aligned = align("きょう、は", "今日は", &source);

    assert_eq!(aligned[3], Timestamp::point("、", 300));
    assert_eq!(aligned[4], Timestamp::new("は", 300, 400));
}

#[test]
fn running_out_of_source_characters_extends_previous_end() {
    let source = vec![Timestamp::new("あ", 0, 100), Timestamp::new("い", 100, 200)];
    let aligned = align("あいう", "あいう", &source);

    assert_eq!(
        triples(&aligned),
        expected(&[("あ", 0, 100), ("い", 100, 200), ("う", 200, 200)])
    );
}

#[test]
fn different_spelling_spreads_time_evenly() {
    let source = per_char("きょうははれ", 200);
    let aligned = align("今日は、晴れ。", "きょうははれ", &source);

    assert_eq!(
        triples(&aligned),
        expected(&[
            ("今", 0, 240),
            ("日", 240, 480),
            ("は", 480, 720),
            ("、", 720, 720),
            ("晴", 720, 960),
            ("れ", 960, 1200),
            ("。", 1200, 1200),
        ])
    );
}

#[test]
fn proportional_windows_round_to_nearest_millisecond() {
    let source = vec![Timestamp::new("きょう", 0, 1000)];
    let aligned = align("今日は", "きょうは", &source);

    assert_eq!(
        triples(&aligned),
        expected(&[("今", 0, 333), ("日", 333, 667), ("は", 667, 1000)])
    );
}

#[test]
fn proportional_leading_punctuation_starts_at_zero() {
    let source = vec![Timestamp::new("きょう", 100, 900)];
    let aligned = align("「今日」", "きょう", &source);

    assert_eq!(
        triples(&aligned),
        expected(&[("「", 0, 0), ("今", 0, 450), ("日", 450, 900), ("」", 900, 900)])
    );
}

#[test]
fn punctuation_only_canonical_text_copies_first_timestamp() {
    let source = vec![Timestamp::new("あ", 120, 480), Timestamp::new("い", 480, 900)];
    let aligned = align("……", "あい", &source);

    assert_eq!(triples(&aligned), expected(&[("…", 120, 480), ("…", 120, 480)]));
}

#[test]
fn missing_source_timing_gives_zero_width_placeholders() {
    let aligned = align("今日は、晴れ。", "きょうは、はれ。", &[]);

    assert_eq!(aligned.len(), "今日は、晴れ。".chars().count());
    assert!(aligned
        .iter()
        .all(|ts| ts.begin_time == 0 && ts.end_time == 0));
    assert_eq!(aligned[0].text, "今");
}

#[test]
fn malformed_time_fields_are_read_as_zero() {
    let source = timing::from_json(
        r#"[
            {"text": "あ", "begin_time": "abc", "end_time": null},
            {"text": "い", "begin_time": "120", "end_time": 250.6},
            {"text": "う", "begin_time": -5, "end_time": true},
            {"begin_time": 300}
        ]"#,
    )
    .expect("lenient parse");

    assert_eq!(
        triples(&source),
        expected(&[("あ", 0, 0), ("い", 120, 251), ("う", 0, 0), ("", 300, 0)])
    );

    let aligned = align("あい", "あい", &source);
    assert_eq!(triples(&aligned), expected(&[("あ", 0, 0), ("い", 120, 251)]));
}

#[test]
fn wire_format_round_trips() {
    let timestamps = vec![Timestamp::new("今", 0, 240), Timestamp::point("。", 240)];
    let json = timing::to_json(&timestamps).expect("serialize");

    assert_eq!(
        json,
        r#"[{"text":"今","begin_time":0,"end_time":240},{"text":"。","begin_time":240,"end_time":240}]"#
    );
    assert_eq!(timing::from_json(&json).expect("parse"), timestamps);
}

#[test]
fn inverted_source_windows_are_clamped() {
    let source = vec![Timestamp::new("あ", 300, 100), Timestamp::new("い", 300, 400)];

    let by_character = align("あい", "あい", &source);
    assert_eq!(
        triples(&by_character),
        expected(&[("あ", 300, 300), ("い", 300, 400)])
    );

    let punctuation_only = align("。", "あ", &source[..1]);
    assert_eq!(triples(&punctuation_only), expected(&[("。", 300, 300)]));
}

#[test]
fn proportional_half_millisecond_windows_round_to_even() {
    let source = vec![Timestamp::new("きょう", 0, 1001)];
    let aligned = align("今日", "きょう", &source);

    assert_eq!(triples(&aligned), expected(&[("今", 0, 500), ("日", 500, 1001)]));
}
