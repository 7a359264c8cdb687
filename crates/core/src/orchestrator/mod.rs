//! Scheduling orchestrator.
//!
//! Drives pending work items onto the publish slot grid and through upload:
//! - **Batch run**: one pass over the store with a single advancing clock
//! - **Manual schedule**: pin one item to an operator-chosen time and upload it now
//! - **Status**: backlog snapshot and the next free slot

mod config;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use runner::SchedulingOrchestrator;
pub use types::{
    ErrorCategory, FileStatus, ItemOutcome, ItemReport, ItemSummary, ManualScheduleReport,
    ManualScheduleRequest, OrchestratorError, RunOptions, RunReport, ScheduleStatus,
};
