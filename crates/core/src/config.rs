//! Typed settings, credentials and service endpoints.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const GROQ_API_KEY: &str = "GROQ_API_KEY";
pub const DEEPSEEK_API_KEY: &str = "DEEPSEEK_API_KEY";

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1/";
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1/";

pub const DEFAULT_TOP_K: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatModel {
    #[default]
    Llama33Versatile,
    DeepseekR1DistillLlama,
}

impl ChatModel {
    pub const ALL: [ChatModel; 2] = [ChatModel::Llama33Versatile, ChatModel::DeepseekR1DistillLlama];

    pub fn id(self) -> &'static str {
        match self {
            ChatModel::Llama33Versatile => "llama-3.3-70b-versatile",
            ChatModel::DeepseekR1DistillLlama => "deepseek-r1-distill-llama-70b",
        }
    }
}

impl fmt::Display for ChatModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ChatModel {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ChatModel::ALL
            .into_iter()
            .find(|model| model.id().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| ConfigError::UnknownVariant {
                kind: "model",
                value: value.to_string(),
            })
    }
}

/// Accepted for parity with the settings panel. Retrieval is always vector
/// similarity whatever the mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetrievalMode {
    #[default]
    Hybrid,
    VectorOnly,
    TextOnly,
}

impl RetrievalMode {
    pub fn label(self) -> &'static str {
        match self {
            RetrievalMode::Hybrid => "Text (Hybrid)",
            RetrievalMode::VectorOnly => "Vector Only",
            RetrievalMode::TextOnly => "Text Only",
        }
    }

    pub fn is_supported(self) -> bool {
        self == RetrievalMode::VectorOnly
    }

    /// Message shown when the mode is accepted but vector search runs instead.
    pub fn fallback_notice(self) -> Option<String> {
        (!self.is_supported()).then(|| {
            format!(
                "retrieval mode \"{}\" is not supported; using vector similarity search",
                self.label()
            )
        })
    }
}

impl fmt::Display for RetrievalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RetrievalMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hybrid" | "text (hybrid)" => Ok(RetrievalMode::Hybrid),
            "vector" | "vector only" | "vector-only" => Ok(RetrievalMode::VectorOnly),
            "text" | "text only" | "text-only" => Ok(RetrievalMode::TextOnly),
            _ => Err(ConfigError::UnknownVariant {
                kind: "retrieval mode",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperature(f32);

impl Temperature {
    pub const MIN: f32 = 0.0;
    pub const MAX: f32 = 1.0;

    pub fn new(value: f32) -> Result<Self, ConfigError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ConfigError::OutOfRange {
                field: "temperature",
                min: Self::MIN.to_string(),
                max: Self::MAX.to_string(),
                value: value.to_string(),
            });
        }
        Ok(Self(value))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for Temperature {
    fn default() -> Self {
        Self(0.3)
    }
}

/// Upper bound, in characters, on the context placed in a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextLength(usize);

impl ContextLength {
    pub const MIN: usize = 1_000;
    pub const MAX: usize = 8_000;

    pub fn new(value: usize) -> Result<Self, ConfigError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ConfigError::OutOfRange {
                field: "max context length",
                min: Self::MIN.to_string(),
                max: Self::MAX.to_string(),
                value: value.to_string(),
            });
        }
        Ok(Self(value))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for ContextLength {
    fn default() -> Self {
        Self(3_000)
    }
}

/// Number of chunks retrieved per question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopK(usize);

impl TopK {
    pub const MIN: usize = 1;
    pub const MAX: usize = 50;

    pub fn new(value: usize) -> Result<Self, ConfigError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ConfigError::OutOfRange {
                field: "top k",
                min: Self::MIN.to_string(),
                max: Self::MAX.to_string(),
                value: value.to_string(),
            });
        }
        Ok(Self(value))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for TopK {
    fn default() -> Self {
        Self(DEFAULT_TOP_K)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub model: ChatModel,
    pub temperature: Temperature,
    pub max_context_length: ContextLength,
    pub retrieval_mode: RetrievalMode,
    pub top_k: TopK,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: ChatModel::default(),
            temperature: Temperature::default(),
            max_context_length: ContextLength::default(),
            retrieval_mode: RetrievalMode::default(),
            top_k: TopK::default(),
        }
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub openai_api_key: String,
    pub groq_api_key: String,
    /// Required at startup but not used by any service call.
    pub deepseek_api_key: String,
}

impl Credentials {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fetch = |name: &'static str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::MissingCredential(name))
        };

        Ok(Self {
            openai_api_key: fetch(OPENAI_API_KEY)?,
            groq_api_key: fetch(GROQ_API_KEY)?,
            deepseek_api_key: fetch(DEEPSEEK_API_KEY)?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &"<redacted>")
            .field("groq_api_key", &"<redacted>")
            .field("deepseek_api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Endpoints {
    pub embeddings: Url,
    pub completions: Url,
}

impl Endpoints {
    /// Parses both base URLs, adding the trailing slash that relative joins need.
    pub fn parse(embeddings: &str, completions: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            embeddings: parse_base(embeddings)?,
            completions: parse_base(completions)?,
        })
    }
}

fn parse_base(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.ends_with('/') {
        Ok(Url::parse(trimmed)?)
    } else {
        Ok(Url::parse(&format!("{trimmed}/"))?)
    }
}
