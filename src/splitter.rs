//! Sentence segmentation for batch card generation.
//!
//! Text is split on line breaks, then on sentence-final marks, keeping each
//! mark (and any closing quote right after it) with its sentence. Quotes that
//! open in one sentence and close in a later one are merged back together,
//! and a quote pair wrapping a whole sentence is removed.

/// Split `text` into sentences with the default Japanese rules.
///
/// ```rust
/// use sentence_cards::splitter::split_sentences;
///
/// assert_eq!(
///     split_sentences("「おはよう。」今日は晴れです。"),
///     vec!["おはよう。", "今日は晴れです。"]
/// );
/// ```
pub fn split_sentences(text: &str) -> Vec<String> {
    SentenceSplitter::default().split(text)
}

#[derive(Debug, Clone)]
pub struct SentenceSplitter {
    terminals: Vec<char>,
    brackets: Vec<(char, char)>,
}

impl Default for SentenceSplitter {
    fn default() -> Self {
        Self {
            terminals: vec!['。', '！', '？'],
            brackets: vec![('「', '」'), ('『', '』')],
        }
    }
}

impl SentenceSplitter {
    pub fn new(terminals: Vec<char>, brackets: Vec<(char, char)>) -> Self {
        Self {
            terminals,
            brackets,
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        let raw: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .flat_map(|line| self.split_line(line))
            .collect();

        self.merge_open_quotes(raw)
            .into_iter()
            .map(|sentence| self.strip_quotes(&sentence))
            .filter(|sentence| !sentence.is_empty())
            .collect()
    }

    fn split_line(&self, line: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut current = String::new();
        let mut chars = line.chars().peekable();

        while let Some(ch) = chars.next() {
            current.push(ch);
            if !self.terminals.contains(&ch) {
                continue;
            }
            while let Some(&next) = chars.peek() {
                if !self.is_close(next) {
                    break;
                }
                current.push(next);
                chars.next();
            }
            push_trimmed(&mut sentences, &current);
            current.clear();
        }

        push_trimmed(&mut sentences, &current);
        sentences
    }

    fn merge_open_quotes(&self, sentences: Vec<String>) -> Vec<String> {
        let mut merged = Vec::with_capacity(sentences.len());
        let mut iter = sentences.into_iter();

        while let Some(mut sentence) = iter.next() {
            while self.has_unclosed_quote(&sentence) {
                match iter.next() {
                    Some(next) => sentence.push_str(&next),
                    None => break,
                }
            }
            merged.push(sentence);
        }

        merged
    }

    fn strip_quotes(&self, sentence: &str) -> String {
        let mut cleaned = sentence.trim();
        let first = cleaned.chars().next();
        let last = cleaned.chars().next_back();

        let wraps = self
            .brackets
            .iter()
            .any(|(open, close)| first == Some(*open) && last == Some(*close));

        if wraps && cleaned.chars().count() >= 2 {
            cleaned = strip_first(cleaned);
            cleaned = strip_last(cleaned);
        } else if first.is_some_and(|ch| self.is_open(ch)) {
            cleaned = strip_first(cleaned);
        } else if last.is_some_and(|ch| self.is_close(ch)) {
            cleaned = strip_last(cleaned);
        }

        cleaned.trim().to_string()
    }

    fn has_unclosed_quote(&self, sentence: &str) -> bool {
        self.brackets.iter().any(|(open, close)| {
            let opens = sentence.chars().filter(|ch| ch == open).count();
            let closes = sentence.chars().filter(|ch| ch == close).count();
            opens > closes
        })
    }

    fn is_open(&self, ch: char) -> bool {
        self.brackets.iter().any(|(open, _)| *open == ch)
    }

    fn is_close(&self, ch: char) -> bool {
        self.brackets.iter().any(|(_, close)| *close == ch)
    }
}

fn push_trimmed(sentences: &mut Vec<String>, sentence: &str) {
    let trimmed = sentence.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

fn strip_first(text: &str) -> &str {
    let mut chars = text.chars();
    chars.next();
    chars.as_str()
}

fn strip_last(text: &str) -> &str {
    let mut chars = text.chars();
    chars.next_back();
    chars.as_str()
}
