use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CardError;
use crate::timing::PauseRules;

pub const DEFAULT_CARD_TYPE: &str = "问答题（附翻转卡片）";
pub const BASIC_CARD_TYPE: &str = "Basic-b860c";
pub const SUPPORTED_CARD_TYPES: &[&str] = &[DEFAULT_CARD_TYPE, BASIC_CARD_TYPE];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TtsProvider {
    #[serde(rename = "qwen-tts")]
    QwenTts,
    #[serde(rename = "cosyvoice-v2", alias = "cosyvoice")]
    CosyVoiceV2,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QwenTtsOptions {
    pub model: String,
    pub voice: String,
    pub language_type: String,
}

impl Default for QwenTtsOptions {
    fn default() -> Self {
        Self {
            model: "qwen3-tts-flash".to_string(),
            voice: "Cherry".to_string(),
            language_type: "Japanese".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CosyVoiceOptions {
    pub model: String,
    pub voice: String,
}

impl Default for CosyVoiceOptions {
    fn default() -> Self {
        Self {
            model: "cosyvoice-v2".to_string(),
            voice: "loongyuuna_v2".to_string(),
        }
    }
}

/// Pause insertion for synthesis, and the matching pause budget for
/// duration estimation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsmlOptions {
    pub enabled: bool,
    pub rules: PauseRules,
}

impl Default for SsmlOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            rules: PauseRules::new().with("\n", "1000ms"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub dashscope_api_key: String,
    pub default_card_type: String,
    pub default_deck_name: String,
    pub last_used_deck: String,
    pub interactive_player_enabled: bool,
    pub tts_provider: TtsProvider,
    pub qwen_tts_options: QwenTtsOptions,
    pub cosyvoice_tts_options: CosyVoiceOptions,
    pub ssml_options: SsmlOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dashscope_api_key: String::new(),
            default_card_type: DEFAULT_CARD_TYPE.to_string(),
            default_deck_name: "Default".to_string(),
            last_used_deck: "Default".to_string(),
            interactive_player_enabled: true,
            tts_provider: TtsProvider::CosyVoiceV2,
            qwen_tts_options: QwenTtsOptions::default(),
            cosyvoice_tts_options: CosyVoiceOptions::default(),
            ssml_options: SsmlOptions::default(),
        }
    }
}

impl Config {
    /// Read a JSON config file. Unreadable files and malformed JSON are
    /// errors; individual bad values are replaced by defaults.
    pub fn load(path: &Path) -> Result<Self, CardError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CardError::io("reading config", e))?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, CardError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| CardError::json("parsing config", e))?;
        Ok(Self::from_value(&value))
    }

    /// Build a config from loosely-typed JSON, logging and defaulting every
    /// field that is missing or has the wrong shape.
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();
        let Some(map) = value.as_object() else {
            log::warn!("Config is not a JSON object, using defaults");
            return defaults;
        };

        let default_card_type = match field::<String>(map, "default_card_type") {
            Some(card_type) if SUPPORTED_CARD_TYPES.contains(&card_type.as_str()) => card_type,
            Some(card_type) => {
                log::warn!("Unsupported card type '{}', using default.", card_type);
                defaults.default_card_type.clone()
            }
            None => defaults.default_card_type.clone(),
        };

        let tts_provider = match map.get("tts_provider") {
            Some(Value::String(name)) if name == "cosyvoice" => {
                log::info!("Converting legacy 'cosyvoice' provider to 'cosyvoice-v2'");
                TtsProvider::CosyVoiceV2
            }
            Some(raw) => TtsProvider::deserialize(raw).unwrap_or_else(|_| {
                log::warn!("Invalid TTS provider {}, using default.", raw);
                defaults.tts_provider
            }),
            None => defaults.tts_provider,
        };

        let default_deck_name =
            field(map, "default_deck_name").unwrap_or(defaults.default_deck_name);
        let last_used_deck =
            field(map, "last_used_deck").unwrap_or_else(|| default_deck_name.clone());

        Self {
            dashscope_api_key: field(map, "dashscope_api_key").unwrap_or_default(),
            default_card_type,
            default_deck_name,
            last_used_deck,
            interactive_player_enabled: field(map, "interactive_player_enabled")
                .unwrap_or(defaults.interactive_player_enabled),
            tts_provider,
            qwen_tts_options: field(map, "qwen_tts_options").unwrap_or(defaults.qwen_tts_options),
            cosyvoice_tts_options: field(map, "cosyvoice_tts_options")
                .unwrap_or(defaults.cosyvoice_tts_options),
            ssml_options: field(map, "ssml_options").unwrap_or(defaults.ssml_options),
        }
    }

    /// Pause rules that estimation should budget for. Empty unless SSML
    /// pause insertion is enabled, since only then does the clip contain
    /// the pauses.
    pub fn effective_pause_rules(&self) -> PauseRules {
        if self.ssml_options.enabled {
            self.ssml_options.rules.clone()
        } else {
            PauseRules::new()
        }
    }

    pub fn to_json(&self) -> Result<String, CardError> {
        serde_json::to_string_pretty(self).map_err(|e| CardError::json("serializing config", e))
    }
}

fn field<T: serde::de::DeserializeOwned>(
    map: &serde_json::Map<String, Value>,
    key: &str,
) -> Option<T> {
    let raw = map.get(key)?;
    match T::deserialize(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("Invalid value for '{}' ({}), using default.", key, err);
            None
        }
    }
}
