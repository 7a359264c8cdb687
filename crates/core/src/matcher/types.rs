//! Types shared by the matcher and the generation feed.

use serde::{Deserialize, Serialize};

/// One entry of the generation service's completion feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub id: String,
    pub kind: String,
    /// Free text shown to the user. Usually echoes the prompt.
    pub display_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl CompletionRecord {
    /// The download URL, if present and non-empty.
    pub fn download_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }
}

/// What a caller is looking for in the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchTarget {
    /// Task id returned at submission. May be empty.
    #[serde(default)]
    pub task_id: String,
    /// The request text as submitted.
    #[serde(default)]
    pub prompt: String,
}

impl MatchTarget {
    pub fn new(task_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            prompt: prompt.into(),
        }
    }
}

/// Confidence tier of a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// Structured task id matched.
    Exact,
    /// Identifier or normalized prompt matched.
    Fuzzy,
    /// Newest completed record, nothing actually matched.
    Fallback,
}

impl MatchTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchTier::Exact => "exact",
            MatchTier::Fuzzy => "fuzzy",
            MatchTier::Fallback => "fallback",
        }
    }
}

/// URLs resolved for a target, tagged with how they were found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub tier: MatchTier,
    pub urls: Vec<String>,
}

impl Resolution {
    pub fn is_low_confidence(&self) -> bool {
        self.tier == MatchTier::Fallback
    }
}
