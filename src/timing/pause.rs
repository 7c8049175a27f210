use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Literal substrings that the synthesizer renders as a fixed pause.
///
/// Rules keep the order they were configured in; when two keys could match at
/// the same position, the earlier rule wins. Durations stay in their literal
/// configured form (`"1000ms"`) and are parsed on use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PauseRules {
    rules: Vec<(String, String)>,
}

/// One piece of text after splitting on pause rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token<'a> {
    /// A matched rule key and its parsed duration.
    Pause { literal: &'a str, duration_ms: u64 },
    Char(char),
}

impl PauseRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule. Empty keys are ignored; a repeated key replaces the
    /// earlier duration but keeps its position.
    pub fn insert(&mut self, literal: impl Into<String>, duration: impl Into<String>) {
        let literal = literal.into();
        if literal.is_empty() {
            log::warn!("Ignoring pause rule with an empty key");
            return;
        }
        let duration = duration.into();
        match self.rules.iter_mut().find(|(key, _)| *key == literal) {
            Some(existing) => existing.1 = duration,
            None => self.rules.push((literal, duration)),
        }
    }

    pub fn with(mut self, literal: impl Into<String>, duration: impl Into<String>) -> Self {
        self.insert(literal, duration);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rules
            .iter()
            .map(|(key, duration)| (key.as_str(), duration.as_str()))
    }

    /// Split `text` into pause tokens and single characters in one
    /// left-to-right pass. Matches never overlap.
    pub fn tokenize<'a>(&'a self, text: &'a str) -> Vec<Token<'a>> {
        let mut tokens = Vec::new();
        let mut rest = text;

        while let Some(ch) = rest.chars().next() {
            let matched = self
                .rules
                .iter()
                .find(|(key, _)| rest.starts_with(key.as_str()));

            match matched {
                Some((key, duration)) => {
                    tokens.push(Token::Pause {
                        literal: key.as_str(),
                        duration_ms: parse_duration_ms(key, duration),
                    });
                    rest = &rest[key.len()..];
                }
                None => {
                    tokens.push(Token::Char(ch));
                    rest = &rest[ch.len_utf8()..];
                }
            }
        }

        tokens
    }

    /// Render `text` as SSML, replacing every rule key with a `<break>`.
    pub fn to_ssml(&self, text: &str) -> String {
        let mut ssml = String::from("<speak>");
        let mut plain = String::new();

        for token in self.tokenize(text) {
            match token {
                Token::Char(ch) => plain.push(ch),
                Token::Pause { literal, .. } => {
                    ssml.push_str(&html_escape::encode_text(&plain));
                    plain.clear();
                    let duration = self.duration_literal(literal).unwrap_or_default();
                    ssml.push_str(&format!(
                        "<break time=\"{}\"/>",
                        html_escape::encode_double_quoted_attribute(duration)
                    ));
                }
            }
        }

        ssml.push_str(&html_escape::encode_text(&plain));
        ssml.push_str("</speak>");
        log::debug!("Converted to SSML: {}", ssml);
        ssml
    }

    fn duration_literal(&self, literal: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|(key, _)| key == literal)
            .map(|(_, duration)| duration.as_str())
    }
}

/// Leading digits of a duration literal, in milliseconds.
fn parse_duration_ms(key: &str, literal: &str) -> u64 {
    let trimmed = literal.trim();
    let digits_end = trimmed
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(trimmed.len());

    let digits = &trimmed[..digits_end];
    match digits.parse::<u64>() {
        Ok(ms) => ms,
        Err(_) if !digits.is_empty() => {
            log::warn!(
                "Pause rule {:?} has out-of-range duration {:?}; capping it",
                key,
                literal
            );
            u64::MAX
        }
        Err(_) => {
            log::warn!(
                "Pause rule {:?} has unparseable duration {:?}; treating it as 0ms",
                key,
                literal
            );
            0
        }
    }
}

impl Serialize for PauseRules {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rules.len()))?;
        for (key, duration) in &self.rules {
            map.serialize_entry(key, duration)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PauseRules {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(PauseRulesVisitor)
    }
}

struct PauseRulesVisitor;

impl<'de> Visitor<'de> for PauseRulesVisitor {
    type Value = PauseRules;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map from literal text to a pause duration such as \"500ms\"")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut rules = PauseRules::new();
        while let Some((key, value)) = access.next_entry::<String, serde_json::Value>()? {
            let duration = match value {
                serde_json::Value::String(text) => text,
                serde_json::Value::Number(number) => number.to_string(),
                other => {
                    log::warn!("Pause rule {:?} has non-text duration {}; ignoring", key, other);
                    continue;
                }
            };
            rules.insert(key, duration);
        }
        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_uses_leading_digits() {
        assert_eq!(parse_duration_ms("\n", "1000ms"), 1000);
        assert_eq!(parse_duration_ms("\n", " 250 "), 250);
        assert_eq!(parse_duration_ms("\n", "1.5s"), 1);
        assert_eq!(parse_duration_ms("\n", "ms"), 0);
        assert_eq!(parse_duration_ms("\n", "99999999999999999999ms"), u64::MAX);
    }

    #[test]
    fn earlier_rule_wins_at_same_position() {
        let rules = PauseRules::new().with("、", "200ms").with("、、", "900ms");
        let tokens = rules.tokenize("あ、、い");
        assert_eq!(
            tokens,
            vec![
                Token::Char('あ'),
                Token::Pause {
                    literal: "、",
                    duration_ms: 200
                },
                Token::Pause {
                    literal: "、",
                    duration_ms: 200
                },
                Token::Char('い'),
            ]
        );
    }

    #[test]
    fn multi_character_keys_are_consumed_whole() {
        let rules = PauseRules::new().with("<br>", "300ms");
        let tokens = rules.tokenize("a<br>b");
        assert_eq!(tokens.len(), 3);
        assert!(matches!(tokens[1], Token::Pause { duration_ms: 300, .. }));
    }

    #[test]
    fn deserialization_keeps_document_order() {
        let rules: PauseRules =
            serde_json::from_str(r#"{"。": "800ms", "、": 300, "\n": "1000ms"}"#).unwrap();
        let keys: Vec<&str> = rules.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["。", "、", "\n"]);
        assert_eq!(rules.iter().nth(1).map(|(_, d)| d), Some("300"));
    }

    #[test]
    fn ssml_replaces_rules_with_breaks_and_escapes_text() {
        let rules = PauseRules::new().with("\n", "1000ms");
        assert_eq!(
            rules.to_ssml("A&B\n<C>"),
            "<speak>A&amp;B<break time=\"1000ms\"/>&lt;C&gt;</speak>"
        );
        assert_eq!(PauseRules::new().to_ssml("はい"), "<speak>はい</speak>");
    }
}
