//! Correlation of generation tasks with completed artifacts.
//!
//! The generation service gives no reliable link between a submitted task and
//! the finished record in its feed, so matching degrades through three tiers:
//! exact task id, fuzzy prompt/identifier, then newest-completed fallback.

mod config;
mod task_matcher;
mod types;

pub use config::MatcherConfig;
pub use task_matcher::{artifact_key, TaskMatcher};
pub use types::{CompletionRecord, MatchTarget, MatchTier, Resolution};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("no completed artifact in feed")]
    NotFound,

    #[error("invalid identifier pattern: {0}")]
    InvalidPattern(String),
}
