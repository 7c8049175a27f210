/// Speech-duration class of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Geminate mark (っ/ッ), held briefly before the next consonant.
    Sokuon,
    /// Long vowel mark (ー).
    LongVowel,
    /// Small glide kana (ゃゅょ/ャュョ) that merges into the preceding mora.
    Yoon,
    Ordinary,
}

impl CharClass {
    pub fn of(ch: char) -> Self {
        match ch {
            'っ' | 'ッ' => CharClass::Sokuon,
            'ー' => CharClass::LongVowel,
            'ゃ' | 'ゅ' | 'ょ' | 'ャ' | 'ュ' | 'ョ' => CharClass::Yoon,
            _ => CharClass::Ordinary,
        }
    }

    /// Relative duration, in (0, 1].
    pub fn weight(self) -> f64 {
        match self {
            CharClass::Sokuon => 0.7,
            CharClass::LongVowel => 0.8,
            CharClass::Yoon => 0.3,
            CharClass::Ordinary => 1.0,
        }
    }
}

pub fn char_weight(ch: char) -> f64 {
    CharClass::of(ch).weight()
}

const EAST_ASIAN_PUNCTUATION: &[char] = &[
    '。', '、', '，', '．', '？', '！', '：', '；', '「', '」', '『', '』', '（', '）', '【', '】',
    '〈', '〉', '《', '》', '・', '…', '‥', '“', '”', '‘', '’',
];

/// Whether `ch` is skipped when pairing characters between two renderings
/// of a sentence. Covers ASCII punctuation, common CJK punctuation and all
/// whitespace.
pub fn is_punctuation(ch: char) -> bool {
    ch.is_ascii_punctuation() || ch.is_whitespace() || EAST_ASIAN_PUNCTUATION.contains(&ch)
}

pub fn strip_punctuation(text: &str) -> String {
    text.chars().filter(|ch| !is_punctuation(*ch)).collect()
}
