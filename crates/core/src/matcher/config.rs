//! Matcher configuration.

use serde::{Deserialize, Serialize};

/// Configuration for correlating generation tasks with completed artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Pattern for the short identifier embedded in prompts.
    #[serde(default = "default_id_pattern")]
    pub id_pattern: String,

    /// Normalized prompt keys are truncated to this many characters.
    #[serde(default = "default_key_length")]
    pub key_length: usize,

    /// Feed record kind that marks a finished generation.
    #[serde(default = "default_complete_kind")]
    pub complete_kind: String,
}

fn default_id_pattern() -> String {
    r"S2_\d+_\d+_\d+".to_string()
}

fn default_key_length() -> usize {
    30
}

fn default_complete_kind() -> String {
    "sora_gen_complete".to_string()
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            id_pattern: default_id_pattern(),
            key_length: default_key_length(),
            complete_kind: default_complete_kind(),
        }
    }
}
