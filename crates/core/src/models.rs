use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// One uploaded file, held in memory until it is chunked.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFingerprint {
    pub document_name: String,
    pub checksum: String,
    pub page_count: usize,
    pub ingested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextChunk {
    pub chunk_id: String,
    pub document_name: String,
    pub chunk_index: u64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub question: String,
    pub answer: String,
    pub model: String,
    pub asked_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct IngestionOptions {
    pub chunk_max_chars: usize,
    pub chunk_overlap_chars: usize,
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            chunk_max_chars: 2_000,
            chunk_overlap_chars: 200,
        }
    }
}

/// Hypothesis tiles offered to the user; each one carries a fixed question set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum QuestionCategory {
    Revenue,
    Expenses,
    ProfitMetrics,
    Assets,
    Gaps,
}

impl QuestionCategory {
    pub const ALL: [QuestionCategory; 5] = [
        QuestionCategory::Revenue,
        QuestionCategory::Expenses,
        QuestionCategory::ProfitMetrics,
        QuestionCategory::Assets,
        QuestionCategory::Gaps,
    ];

    pub fn label(self) -> &'static str {
        match self {
            QuestionCategory::Revenue => "Revenue",
            QuestionCategory::Expenses => "Expenses",
            QuestionCategory::ProfitMetrics => "Profit Metrics",
            QuestionCategory::Assets => "Assets",
            QuestionCategory::Gaps => "Gaps",
        }
    }

    pub fn questions(self) -> &'static [&'static str] {
        match self {
            QuestionCategory::Revenue => &[
                "Is there a declining trend in revenue?",
                "Is there an overall increase in revenue?",
                "What are the different sources of income?",
            ],
            QuestionCategory::Expenses => &[
                "Is there an increasing trend in expenses?",
                "What are the major contributors to total expenses?",
                "How do expenses compare to revenue over time?",
            ],
            QuestionCategory::ProfitMetrics => &[
                "What is the net profit margin over time?",
                "How does the company's profitability compare to competitors?",
                "Are there any significant fluctuations in profit margins?",
                "What factors contribute to profit growth or decline?",
            ],
            QuestionCategory::Assets => &[
                "What are the company's most valuable assets?",
                "How have the assets grown or depreciated over time?",
                "What proportion of assets are liquid?",
                "Are there any high-risk or underperforming assets?",
            ],
            QuestionCategory::Gaps => &[
                "What are the key limitations of this company?",
                "Are there any significant financial risks?",
                "Where does the company lag behind competitors?",
                "Are there gaps in the company's product or service offerings?",
            ],
        }
    }
}

impl fmt::Display for QuestionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for QuestionCategory {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "revenue" => Ok(QuestionCategory::Revenue),
            "expenses" => Ok(QuestionCategory::Expenses),
            "profitmetrics" | "profit" => Ok(QuestionCategory::ProfitMetrics),
            "assets" => Ok(QuestionCategory::Assets),
            "gaps" => Ok(QuestionCategory::Gaps),
            _ => Err(ConfigError::UnknownVariant {
                kind: "question category",
                value: value.to_string(),
            }),
        }
    }
}
