use sentence_cards::{
    session::{InboundMessage, OutboundMessage, TimingSession},
    timing::PauseRules,
    Timestamp,
};

fn parse(line: &str) -> InboundMessage {
    serde_json::from_str(line).expect("valid inbound message")
}

#[test]
fn ready_message_reports_crate_version() {
    let ready = serde_json::to_value(TimingSession::ready_message()).expect("serialize");
    assert_eq!(ready["type"], "ready");
    assert_eq!(ready["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn estimate_uses_session_pause_rules() {
    let session = TimingSession::new(PauseRules::new().with("、", "200ms"));
    let responses = session.handle_inbound(parse(
        r#"{"type": "estimate", "text": "あ、い", "duration_ms": 1000}"#,
    ));

    assert_eq!(
        responses,
        vec![OutboundMessage::Timestamps {
            timestamps: vec![Timestamp::new("あ", 0, 400), Timestamp::new("い", 600, 1000)],
        }]
    );
}

#[test]
fn estimate_request_can_override_pause_rules() {
    let session = TimingSession::new(PauseRules::new().with("、", "200ms"));
    let responses = session.handle_inbound(parse(
        r#"{"type": "estimate", "text": "あ、い", "duration_ms": 900, "pause_rules": {}}"#,
    ));

    assert_eq!(
        responses,
        vec![OutboundMessage::Timestamps {
            timestamps: vec![
                Timestamp::new("あ", 0, 300),
                Timestamp::new("、", 300, 600),
                Timestamp::new("い", 600, 900),
            ],
        }]
    );
}

#[test]
fn estimate_without_speakable_time_is_unavailable() {
    let session = TimingSession::new(PauseRules::new().with("\n", "1000ms"));
    let responses = session.handle_inbound(parse(
        r#"{"type": "estimate", "text": "あ\nい", "duration_ms": 800}"#,
    ));

    assert!(matches!(
        responses.as_slice(),
        [OutboundMessage::Unavailable { .. }]
    ));
}

#[test]
fn align_request_round_trips_wire_timestamps() {
    let session = TimingSession::new(PauseRules::new());
    let responses = session.handle_inbound(parse(
        r#"{
            "type": "align",
            "canonical_text": "はい。",
            "source_text": "はい",
            "timestamps": [
                {"text": "は", "begin_time": 0, "end_time": "150"},
                {"text": "い", "begin_time": 150, "end_time": 300}
            ]
        }"#,
    ));

    let json = serde_json::to_value(&responses[0]).expect("serialize");
    assert_eq!(json["type"], "timestamps");
    assert_eq!(
        json["timestamps"],
        serde_json::json!([
            {"text": "は", "begin_time": 0, "end_time": 150},
            {"text": "い", "begin_time": 150, "end_time": 300},
            {"text": "。", "begin_time": 300, "end_time": 300}
        ])
    );
}

#[test]
fn align_without_timestamps_gives_placeholders() {
    let session = TimingSession::new(PauseRules::new());
    let responses = session.handle_inbound(parse(
        r#"{"type": "align", "canonical_text": "猫。", "source_text": "ねこ"}"#,
    ));

    assert_eq!(
        responses,
        vec![OutboundMessage::Timestamps {
            timestamps: vec![Timestamp::point("猫", 0), Timestamp::point("。", 0)],
        }]
    );
}

#[test]
fn split_request_returns_sentences() {
    let session = TimingSession::new(PauseRules::new());
    let responses = session.handle_inbound(parse(
        r#"{"type": "split", "text": "「おはよう。」今日は晴れです。"}"#,
    ));

    assert_eq!(
        responses,
        vec![OutboundMessage::Sentences {
            sentences: vec!["おはよう。".to_string(), "今日は晴れです。".to_string()],
        }]
    );
}

#[test]
fn extract_reading_request() {
    let session = TimingSession::new(PauseRules::new());
    let found = session.handle_inbound(parse(
        r#"{"type": "extract_reading", "markdown": "**句子读法：**\n- ねこ\n- neko"}"#,
    ));
    let missing = session.handle_inbound(parse(
        r#"{"type": "extract_reading", "markdown": "nothing here"}"#,
    ));

    assert_eq!(
        found,
        vec![OutboundMessage::Reading {
            text: Some("ねこ".to_string())
        }]
    );
    let json = serde_json::to_value(&missing[0]).expect("serialize");
    assert_eq!(json, serde_json::json!({"type": "reading", "text": null}));
}

#[test]
fn unknown_request_type_fails_to_parse() {
    let result: Result<InboundMessage, _> = serde_json::from_str(r#"{"type": "transcribe"}"#);
    assert!(result.is_err());
}
