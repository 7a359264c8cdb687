//! Mock generation service for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::generation::{GenerationError, GenerationService, SubmittedTask};
use crate::matcher::CompletionRecord;

/// Mock implementation of the GenerationService trait.
///
/// Submitted prompts are recorded and assigned sequential task ids
/// (`task_1`, `task_2`, ...). The pending list and completion feed are set
/// directly by the test.
#[derive(Debug)]
pub struct MockGenerationService {
    submissions: Arc<RwLock<Vec<String>>>,
    pending: Arc<RwLock<Vec<String>>>,
    feed: Arc<RwLock<Vec<CompletionRecord>>>,
    remaining: Arc<RwLock<Option<i64>>>,
    feed_calls: Arc<RwLock<usize>>,
    /// If set, the next call will fail with this error.
    next_error: Arc<RwLock<Option<GenerationError>>>,
}

impl Default for MockGenerationService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGenerationService {
    pub fn new() -> Self {
        Self {
            submissions: Arc::new(RwLock::new(Vec::new())),
            pending: Arc::new(RwLock::new(Vec::new())),
            feed: Arc::new(RwLock::new(Vec::new())),
            remaining: Arc::new(RwLock::new(None)),
            feed_calls: Arc::new(RwLock::new(0)),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn recorded_submissions(&self) -> Vec<String> {
        self.submissions.read().await.clone()
    }

    pub async fn set_pending(&self, task_ids: Vec<String>) {
        *self.pending.write().await = task_ids;
    }

    pub async fn set_feed(&self, feed: Vec<CompletionRecord>) {
        *self.feed.write().await = feed;
    }

    pub async fn set_remaining(&self, remaining: Option<i64>) {
        *self.remaining.write().await = remaining;
    }

    /// Number of times the feed was fetched.
    pub async fn feed_calls(&self) -> usize {
        *self.feed_calls.read().await
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: GenerationError) {
        *self.next_error.write().await = Some(error);
    }

    async fn take_error(&self) -> Result<(), GenerationError> {
        match self.next_error.write().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl GenerationService for MockGenerationService {
    async fn submit(&self, prompt: &str) -> Result<SubmittedTask, GenerationError> {
        self.take_error().await?;
        let mut submissions = self.submissions.write().await;
        submissions.push(prompt.to_string());
        Ok(SubmittedTask {
            task_id: format!("task_{}", submissions.len()),
            remaining: *self.remaining.read().await,
        })
    }

    async fn pending_task_ids(&self) -> Result<Vec<String>, GenerationError> {
        self.take_error().await?;
        Ok(self.pending.read().await.clone())
    }

    async fn feed(&self) -> Result<Vec<CompletionRecord>, GenerationError> {
        self.take_error().await?;
        *self.feed_calls.write().await += 1;
        Ok(self.feed.read().await.clone())
    }
}
