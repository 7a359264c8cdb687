//! Remote video generation service.

mod http;

pub use http::HttpGenerationClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::matcher::CompletionRecord;

/// Errors that can occur when talking to the generation service.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Generation API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A generation request accepted by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedTask {
    pub task_id: String,
    /// Remaining generation quota, when the service reports it.
    pub remaining: Option<i64>,
}

/// Asynchronous video generation.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Submit a prompt for generation.
    async fn submit(&self, prompt: &str) -> Result<SubmittedTask, GenerationError>;

    /// Ids of tasks that are still running.
    async fn pending_task_ids(&self) -> Result<Vec<String>, GenerationError>;

    /// Whether `task_id` is still running. An empty id is never pending.
    async fn is_pending(&self, task_id: &str) -> Result<bool, GenerationError> {
        if task_id.is_empty() {
            return Ok(false);
        }
        Ok(self.pending_task_ids().await?.iter().any(|id| id == task_id))
    }

    /// Recent entries of the completion feed, newest first.
    async fn feed(&self) -> Result<Vec<CompletionRecord>, GenerationError>;
}
