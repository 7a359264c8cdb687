//! Generation reconciliation.
//!
//! Connects the generation service to the item store: submitting prompts,
//! polling tasks, downloading finished artifacts and discovering completed
//! generations that no local item knows about yet.

mod reconciler;
mod types;

pub use reconciler::Reconciler;
pub use types::{DownloadReport, DownloadRequest, DownloadStatus, PollStatus, SubmitReport};

use thiserror::Error;

use crate::generation::GenerationError;
use crate::matcher::MatchError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("generation service error: {0}")]
    Generation(#[from] GenerationError),

    #[error("match error: {0}")]
    Match(#[from] MatchError),

    #[error("item store error: {0}")]
    Store(#[from] StoreError),
}
