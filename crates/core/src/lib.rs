pub mod archive;
pub mod config;
pub mod fetcher;
pub mod generation;
pub mod hosting;
pub mod matcher;
pub mod metrics;
pub mod orchestrator;
pub mod reconcile;
pub mod schedule;
pub mod store;
pub mod testing;

pub use archive::{ArchiveError, Archiver, FsArchiver};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use fetcher::{ArtifactFetcher, FetchError, FetchOutcome, FetchOutcomeKind, HttpArtifactFetcher};
pub use generation::{GenerationError, GenerationService, HttpGenerationClient, SubmittedTask};
pub use hosting::{
    HostingError, HostingService, HttpHostingClient, UploadReceipt, UploadRequest,
};
pub use matcher::{
    CompletionRecord, MatchError, MatchTarget, MatchTier, MatcherConfig, Resolution, TaskMatcher,
};
pub use orchestrator::{
    ErrorCategory, ItemOutcome, ManualScheduleReport, ManualScheduleRequest, OrchestratorConfig, OrchestratorError,
    RunOptions, RunReport, ScheduleStatus, SchedulingOrchestrator,
};
pub use reconcile::{
    DownloadReport, DownloadRequest, DownloadStatus, PollStatus, ReconcileError, Reconciler,
    SubmitReport,
};
pub use schedule::{ScheduleConfig, ScheduleError, SlotAllocator};
pub use store::{
    InMemoryRepository, ItemRepository, ItemStage, JsonFileRepository, StoreError, WorkItem,
};
