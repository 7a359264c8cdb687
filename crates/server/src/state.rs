use std::sync::Arc;

use skyforge_core::{Config, Reconciler, SanitizedConfig, SchedulingOrchestrator};
use tokio::sync::{Mutex, MutexGuard};

/// Shared application state
pub struct AppState {
    config: Config,
    orchestrator: Arc<SchedulingOrchestrator>,
    reconciler: Option<Arc<Reconciler>>,
    // Every store writer loads and saves the whole collection, so one writer
    // at a time or a long run's next save drops the other's changes.
    store_write: Mutex<()>,
}

impl AppState {
    pub fn new(
        config: Config,
        orchestrator: SchedulingOrchestrator,
        reconciler: Option<Reconciler>,
    ) -> Self {
        Self {
            config,
            orchestrator: Arc::new(orchestrator),
            reconciler: reconciler.map(Arc::new),
            store_write: Mutex::new(()),
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn orchestrator(&self) -> &SchedulingOrchestrator {
        &self.orchestrator
    }

    /// Present only when a generation service is configured.
    pub fn reconciler(&self) -> Option<&Reconciler> {
        self.reconciler.as_deref()
    }

    /// Claim the single store-writer slot, or `None` while a run, manual
    /// schedule, delete or reconcile write is in progress.
    pub fn try_store_write(&self) -> Option<MutexGuard<'_, ()>> {
        self.store_write.try_lock().ok()
    }
}
