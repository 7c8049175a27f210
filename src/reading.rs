//! Prompts for the language model and extraction of fields from its
//! markdown answer.
//!
//! The model is asked for a fixed set of bold-labelled sections. Models do not
//! always follow the layout exactly, so each field is looked up with an
//! ordered list of [`Extraction`] strategies and the first usable match wins.

use once_cell::sync::Lazy;
use regex::Regex;

const READING_LABEL: &str = "句子读法";
const OPTIMIZED_LABEL: &str = "优化后的日文";

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static CODE_FENCE_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\A```[^\n]*\n").unwrap());
static CODE_FENCE_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n```[^\n]*\z").unwrap());
static LIST_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[-*]\s+").unwrap());
static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n(\s*\n)+").unwrap());

/// How the text handed to the model was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    /// A sentence typed by the user.
    Sentence,
    /// A speech-recognition transcript, possibly missing punctuation.
    Transcript,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn for_text(text: &str, mode: AnalysisMode) -> Self {
        match mode {
            AnalysisMode::Sentence => Self {
                system: "你是一个有帮助的助手，擅长将日文翻译成中文，并能对日文句子进行详细的语言分析，包括单词的假名读音、罗马文读音、中文解释和语法点解释。".to_string(),
                user: format!(
                    "请将以下日文句子翻译成中文。在翻译之后，请对句子中的主要单词和语法点进行详细解释。请按照以下格式输出：\n\
                     **中文翻译：**\n[翻译结果]\n\
                     **句子读法：**\n- [句子假名读音]\n- [句子罗马文读音]\n\
                     **单词解释：**\n- [日文单词]（[假名读音]）（[罗马文读音]）：[中文意思]\n\
                     **语法点解释：**\n- [日文语法点]（[假名读音]）（[罗马文读音]）：[解释]\n\
                     日文句子：\n{text}\n"
                ),
            },
            AnalysisMode::Transcript => Self {
                system: "你是一个有帮助的助手，擅长处理日文音频转写文本。音频转写文本可能缺少标点符号或标点混乱，你需要先优化标点符号，然后进行翻译和语言分析。".to_string(),
                user: format!(
                    "以下是从日文音频转写得到的文本，可能缺少标点符号或标点混乱。请先优化标点符号，然后进行翻译和语言分析。\n\n\
                     请按照以下格式输出：\n\
                     **优化后的日文：**\n[优化标点符号后的完整日文句子]\n\n\
                     **中文翻译：**\n[翻译结果]\n\n\
                     **句子读法：**\n- [句子假名读音]\n- [句子罗马文读音]\n\n\
                     **单词解释：**\n- [日文单词]（[假名读音]）（[罗马文读音]）：[中文意思]\n\n\
                     **语法点解释：**\n- [日文语法点]（[假名读音]）（[罗马文读音]）：[解释]\n\n\
                     转写文本：\n{text}\n"
                ),
            },
        }
    }
}

/// One way of locating a field in the model's answer.
#[derive(Debug, Clone)]
pub enum Extraction {
    /// The first capture group of a regex match.
    Pattern(Regex),
    /// The first `- ` list item after a line containing the label, stopping
    /// at the next bold heading.
    ListAfterLabel(&'static str),
}

impl Extraction {
    fn apply(&self, markdown: &str) -> Option<String> {
        match self {
            Extraction::Pattern(pattern) => pattern
                .captures(markdown)
                .and_then(|captures| captures.get(1))
                .map(|capture| capture.as_str().to_string()),
            Extraction::ListAfterLabel(label) => list_item_after_label(markdown, label),
        }
    }
}

/// Ordered extraction strategies for one labelled field.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    name: &'static str,
    strategies: Vec<Extraction>,
    cleanup: Cleanup,
}

#[derive(Debug, Clone, Copy)]
enum Cleanup {
    SingleLine,
    Block,
}

impl Cleanup {
    fn apply(self, raw: &str) -> String {
        match self {
            Cleanup::SingleLine => clean_single_line(raw),
            Cleanup::Block => clean_block(raw),
        }
    }
}

impl FieldExtractor {
    pub fn new(name: &'static str, strategies: Vec<Extraction>) -> Self {
        Self {
            name,
            strategies,
            cleanup: Cleanup::SingleLine,
        }
    }

    /// The kana reading of the sentence (`**句子读法：**` followed by a list).
    pub fn reading() -> Self {
        Self::new(
            READING_LABEL,
            vec![
                Extraction::Pattern(
                    Regex::new(r"\*\*句子读法[：:]\*\*\s*\n\s*-\s*([^\n]+)").unwrap(),
                ),
                Extraction::Pattern(Regex::new(r"句子读法[：:]\s*\n\s*-\s*([^\n]+)").unwrap()),
                Extraction::ListAfterLabel(READING_LABEL),
            ],
        )
    }

    /// The transcript with punctuation restored by the model
    /// (`**优化后的日文：**` up to the next section).
    pub fn optimized_transcript() -> Self {
        let mut extractor = Self::new(
            OPTIMIZED_LABEL,
            vec![
                Extraction::Pattern(
                    Regex::new(r"(?s)\*\*优化后的日文[：:]\*\*\s*\n\s*(.+?)(?:\n\s*\*\*中文翻译|\z)")
                        .unwrap(),
                ),
                Extraction::Pattern(
                    Regex::new(r"(?s)\*\*优化后的日文\*\*[：:]\s*\n\s*(.+?)(?:\n\s*\*\*[^*]|\z)")
                        .unwrap(),
                ),
                Extraction::Pattern(
                    Regex::new(r"(?s)优化后的日文[：:]\s*\n\s*(.+?)(?:\n\s*\*\*|\z)").unwrap(),
                ),
            ],
        );
        extractor.cleanup = Cleanup::Block;
        extractor
    }

    pub fn extract(&self, markdown: &str) -> Option<String> {
        self.extract_accepting(markdown, |_| true)
    }

    /// Like [`extract`](Self::extract), but a strategy's result only wins if
    /// `accept` approves it; otherwise the next strategy is tried.
    pub fn extract_accepting(
        &self,
        markdown: &str,
        accept: impl Fn(&str) -> bool,
    ) -> Option<String> {
        for (index, strategy) in self.strategies.iter().enumerate() {
            let Some(raw) = strategy.apply(markdown) else {
                continue;
            };
            let value = self.cleanup.apply(&raw);
            if value.is_empty() {
                continue;
            }
            if accept(&value) {
                log::info!(
                    "Extracted {} with strategy {}: {:?}",
                    self.name,
                    index + 1,
                    value
                );
                return Some(value);
            }
            log::warn!(
                "Strategy {} found {} but it was rejected: {:?}",
                index + 1,
                self.name,
                value
            );
        }

        log::warn!("Could not extract {} from model output", self.name);
        None
    }
}

fn list_item_after_label(markdown: &str, label: &str) -> Option<String> {
    let mut lines = markdown.lines().skip_while(|line| !line.contains(label));
    lines.next()?;

    for line in lines {
        let stripped = line.trim();
        if let Some(item) = stripped.strip_prefix('-') {
            let item = item.trim();
            if !item.is_empty() {
                return Some(item.to_string());
            }
        }
        if stripped.starts_with("**") && stripped[2..].contains("**") {
            break;
        }
    }
    None
}

fn clean_single_line(raw: &str) -> String {
    let value = raw.trim();
    value
        .strip_prefix('-')
        .map(str::trim)
        .unwrap_or(value)
        .to_string()
}

fn clean_block(raw: &str) -> String {
    let value = raw.trim();
    let value = CODE_FENCE_OPEN.replace(value, "");
    let value = CODE_FENCE_CLOSE.replace(&value, "");
    let value = LIST_MARKER.replace_all(&value, "");
    let value = BLANK_RUNS.replace_all(&value, "\n\n");
    value.trim().to_string()
}

/// Render the model's markdown for the back of a card: bold spans become
/// `<b>` and newlines become `<br>`.
pub fn markdown_to_html(markdown: &str) -> String {
    BOLD.replace_all(markdown, "<b>$1</b>").replace('\n', "<br>")
}
