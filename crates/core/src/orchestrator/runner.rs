//! Scheduling orchestrator implementation.
//!
//! A run walks the store in order with one moving clock. Each uploaded item
//! is persisted before the next one starts, so an interrupted run keeps the
//! progress it made.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::archive::Archiver;
use crate::hosting::{HostingError, HostingService, UploadReceipt, UploadRequest};
use crate::metrics;
use crate::schedule::SlotAllocator;
use crate::store::{find_item, remove_item, validate_file_name, ItemRepository, WorkItem};

use super::config::OrchestratorConfig;
use super::types::{
    FileStatus, ItemOutcome, ItemReport, ItemSummary, ManualScheduleReport, ManualScheduleRequest,
    OrchestratorError, RunOptions, RunReport, ScheduleStatus,
};

/// Assigns publish slots to pending items and uploads them.
pub struct SchedulingOrchestrator {
    config: OrchestratorConfig,
    allocator: SlotAllocator,
    repository: Arc<dyn ItemRepository>,
    hosting: Option<Arc<dyn HostingService>>,
    archiver: Arc<dyn Archiver>,
}

impl SchedulingOrchestrator {
    pub fn new(
        config: OrchestratorConfig,
        allocator: SlotAllocator,
        repository: Arc<dyn ItemRepository>,
        hosting: Option<Arc<dyn HostingService>>,
        archiver: Arc<dyn Archiver>,
    ) -> Self {
        Self {
            config,
            allocator,
            repository,
            hosting,
            archiver,
        }
    }

    pub fn allocator(&self) -> &SlotAllocator {
        &self.allocator
    }

    pub fn media_path(&self, file_name: &str) -> PathBuf {
        self.config.media_dir.join(file_name)
    }

    fn hosting(&self) -> Result<&Arc<dyn HostingService>, OrchestratorError> {
        self.hosting
            .as_ref()
            .ok_or(OrchestratorError::HostingNotConfigured)
    }

    /// Run one batch: assign slots and upload up to `limit` items.
    pub async fn run(&self, options: RunOptions) -> Result<RunReport, OrchestratorError> {
        let result = self.run_inner(options).await;
        let label = if result.is_ok() { "ok" } else { "error" };
        metrics::SCHEDULE_RUNS
            .with_label_values(&["batch", label])
            .inc();
        result
    }

    async fn run_inner(&self, options: RunOptions) -> Result<RunReport, OrchestratorError> {
        let hosting = self.hosting()?;
        let limit = options.limit.unwrap_or(self.config.default_limit);
        let run_id = Uuid::new_v4().to_string();

        let mut items = self.repository.load()?;

        let remote = match hosting.latest_scheduled_publish().await {
            Ok(latest) => latest,
            Err(e) => {
                warn!(run_id = %run_id, error = %e, "Could not read hosted schedule, using local baseline only");
                None
            }
        };
        let local = items.iter().filter_map(WorkItem::baseline_instant).max();
        let baseline = remote.max(local);

        let mut clock = self.start_clock(baseline, options.start_date);
        let start_slot = clock;
        info!(
            run_id = %run_id,
            limit,
            baseline = ?baseline,
            start_slot = %self.allocator.format_local(start_slot),
            "Starting scheduling run"
        );

        let mut report = RunReport {
            run_id: run_id.clone(),
            baseline,
            start_slot,
            limit,
            processed: 0,
            items: Vec::new(),
        };

        for index in 0..items.len() {
            if report.processed >= limit {
                break;
            }
            if items[index].uploaded {
                continue;
            }

            let file_name = items[index].file_name.clone();
            if validate_file_name(&file_name).is_err() {
                warn!(run_id = %run_id, file_name = %file_name, "Unsafe file name in store, skipping");
                report.items.push(ItemReport {
                    file_name,
                    outcome: ItemOutcome::SkippedUnsafeName,
                });
                continue;
            }
            let path = self.media_path(&file_name);
            if !is_available(&path).await {
                warn!(run_id = %run_id, file_name = %file_name, "Media file missing, skipping");
                report.items.push(ItemReport {
                    file_name,
                    outcome: ItemOutcome::SkippedMissingFile,
                });
                continue;
            }

            let previous_publish_at = items[index].publish_at;
            let previous_clock = clock;

            clock = self.place(&mut items[index], clock);

            let request = UploadRequest::for_item(&items[index], &path);
            info!(
                run_id = %run_id,
                file_name = %file_name,
                publish_at = ?request.publish_at,
                "Uploading"
            );

            match self.upload(hosting.as_ref(), &request).await {
                Ok(receipt) => {
                    items[index].uploaded = true;
                    let archived = self.archive(&path).await;
                    self.repository.save(&items)?;
                    report.processed += 1;
                    report.items.push(ItemReport {
                        file_name,
                        outcome: ItemOutcome::Uploaded {
                            publish_at: items[index].publish_at,
                            video_id: receipt.video_id,
                            archived,
                        },
                    });
                }
                Err(e) => {
                    warn!(run_id = %run_id, file_name = %file_name, error = %e, "Upload failed, item stays pending");
                    items[index].publish_at = previous_publish_at;
                    clock = previous_clock;
                    report.items.push(ItemReport {
                        file_name,
                        outcome: ItemOutcome::UploadFailed {
                            error: e.to_string(),
                        },
                    });
                }
            }
        }

        info!(
            run_id = %run_id,
            processed = report.processed,
            failed = report.failed(),
            skipped = report.skipped(),
            "Scheduling run finished"
        );
        Ok(report)
    }

    /// Give `item` its publish time and return the advanced clock.
    ///
    /// Pinned manual items keep their time. A counted pin later than the
    /// clock pushes every following automatic item past it.
    fn place(&self, item: &mut WorkItem, clock: DateTime<Utc>) -> DateTime<Utc> {
        match (item.is_manual, item.publish_at) {
            (true, Some(pinned)) => {
                if !item.ignore_calc && pinned > clock {
                    self.allocator.next_slot(Some(pinned))
                } else {
                    clock
                }
            }
            _ => {
                item.publish_at = Some(clock);
                self.allocator.next_slot(Some(clock))
            }
        }
    }

    /// First clock position of a run.
    ///
    /// With a start date the run begins at that date's first slot, unless
    /// already-committed slots reach past it.
    fn start_clock(&self, baseline: Option<DateTime<Utc>>, start_date: Option<NaiveDate>) -> DateTime<Utc> {
        match start_date {
            None => self.allocator.next_slot(baseline),
            Some(date) => {
                let first = self.allocator.first_slot_on(date);
                match baseline {
                    Some(b) if b >= first => self.allocator.next_slot(Some(b)),
                    _ => first,
                }
            }
        }
    }

    /// Pin one pending item to an operator-chosen time and upload it
    /// immediately.
    ///
    /// The new schedule is persisted before the upload, so it survives an
    /// upload failure. Uploaded items are refused without any write.
    pub async fn manual_schedule(
        &self,
        request: ManualScheduleRequest,
    ) -> Result<ManualScheduleReport, OrchestratorError> {
        let result = self.manual_schedule_inner(request).await;
        let label = if result.is_ok() { "ok" } else { "error" };
        metrics::SCHEDULE_RUNS
            .with_label_values(&["manual", label])
            .inc();
        result
    }

    async fn manual_schedule_inner(
        &self,
        request: ManualScheduleRequest,
    ) -> Result<ManualScheduleReport, OrchestratorError> {
        let hosting = self.hosting()?;
        let publish_at = self.allocator.local_to_instant(request.publish_at_local);

        let mut items = self.repository.load()?;
        let index = items
            .iter()
            .position(|v| v.file_name == request.file_name)
            .ok_or_else(|| OrchestratorError::ItemNotFound(request.file_name.clone()))?;
        if items[index].uploaded {
            return Err(OrchestratorError::AlreadyUploaded(request.file_name));
        }
        if validate_file_name(&request.file_name).is_err() {
            return Err(OrchestratorError::UnsafeFileName(request.file_name));
        }

        {
            let item = &mut items[index];
            item.publish_at = Some(publish_at);
            item.is_manual = true;
            item.ignore_calc = !request.count_in_baseline;
        }
        self.repository.save(&items)?;
        info!(
            file_name = %request.file_name,
            publish_at = %self.allocator.format_local(publish_at),
            count_in_baseline = request.count_in_baseline,
            "Manual schedule set"
        );

        let path = self.media_path(&request.file_name);
        if !is_available(&path).await {
            return Err(OrchestratorError::MissingFile(request.file_name));
        }

        let upload = UploadRequest::for_item(&items[index], &path);
        let receipt = self.upload(hosting.as_ref(), &upload).await?;

        items[index].uploaded = true;
        let archived = self.archive(&path).await;
        self.repository.save(&items)?;

        Ok(ManualScheduleReport {
            file_name: request.file_name,
            publish_at,
            video_id: receipt.video_id,
            archived,
        })
    }

    /// Backlog snapshot and the slot the next run would start at.
    pub async fn status(&self) -> Result<ScheduleStatus, OrchestratorError> {
        let items = self.repository.load()?;

        let mut automatic = Vec::new();
        let mut manual = Vec::new();
        for item in items.iter().filter(|v| !v.uploaded) {
            let file_status = if is_available(&self.media_path(&item.file_name)).await {
                FileStatus::Available
            } else {
                FileStatus::Missing
            };
            let summary = ItemSummary::new(item, file_status);
            if item.is_manual {
                manual.push(summary);
            } else {
                automatic.push(summary);
            }
        }

        let baseline = items.iter().filter_map(WorkItem::baseline_instant).max();
        let next_slot = self.allocator.next_slot(baseline);

        Ok(ScheduleStatus {
            pending_count: automatic.len() + manual.len(),
            automatic,
            manual,
            next_slot,
            next_slot_local: self.allocator.format_local(next_slot),
        })
    }

    pub fn list_items(&self) -> Result<Vec<WorkItem>, OrchestratorError> {
        Ok(self.repository.load()?)
    }

    pub fn get_item(&self, file_name: &str) -> Result<WorkItem, OrchestratorError> {
        let items = self.repository.load()?;
        find_item(&items, file_name)
            .cloned()
            .ok_or_else(|| OrchestratorError::ItemNotFound(file_name.to_string()))
    }

    /// Remove one record. The media file is left alone.
    pub fn delete(&self, file_name: &str) -> Result<WorkItem, OrchestratorError> {
        let mut items = self.repository.load()?;
        let removed = remove_item(&mut items, file_name)
            .ok_or_else(|| OrchestratorError::ItemNotFound(file_name.to_string()))?;
        self.repository.save(&items)?;
        info!(file_name = %file_name, "Item deleted");
        Ok(removed)
    }

    async fn upload(
        &self,
        hosting: &dyn HostingService,
        request: &UploadRequest,
    ) -> Result<UploadReceipt, HostingError> {
        let started = Instant::now();
        let result = hosting.upload(request).await;
        let label = if result.is_ok() { "ok" } else { "failed" };
        metrics::UPLOADS.with_label_values(&[label]).inc();
        metrics::UPLOAD_DURATION
            .with_label_values(&[label])
            .observe(started.elapsed().as_secs_f64());
        result
    }

    /// Archive after upload. Failure leaves the file in place; the item is
    /// uploaded either way.
    async fn archive(&self, path: &Path) -> bool {
        match self.archiver.archive(path).await {
            Ok(destination) => {
                debug!(destination = %destination.display(), "Archived");
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Archive failed");
                false
            }
        }
    }
}

async fn is_available(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ArchiveError;
    use crate::store::InMemoryRepository;
    use crate::testing::fixtures::{manual_item, media_file, uploaded_item, work_item};
    use crate::testing::{MockArchiver, MockHostingService};
    use chrono::{NaiveDateTime, TimeDelta};
    use tempfile::TempDir;

    struct Harness {
        dir: TempDir,
        repo: Arc<InMemoryRepository>,
        hosting: Arc<MockHostingService>,
        archiver: Arc<MockArchiver>,
        orchestrator: SchedulingOrchestrator,
    }

    fn allocator() -> SlotAllocator {
        SlotAllocator::new(&["00:00", "08:00", "12:00", "16:00"], 480).unwrap()
    }

    fn local(s: &str) -> DateTime<Utc> {
        let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
        allocator().local_to_instant(naive)
    }

    fn harness(items: Vec<WorkItem>) -> Harness {
        let dir = TempDir::new().unwrap();
        for item in &items {
            media_file(dir.path(), &item.file_name);
        }
        let repo = Arc::new(InMemoryRepository::with_items(items));
        let hosting = Arc::new(MockHostingService::new());
        let archiver = Arc::new(MockArchiver::new());
        let config = OrchestratorConfig {
            media_dir: dir.path().to_path_buf(),
            default_limit: 10,
        };
        let orchestrator = SchedulingOrchestrator::new(
            config,
            allocator(),
            repo.clone(),
            Some(hosting.clone()),
            archiver.clone(),
        );
        Harness {
            dir,
            repo,
            hosting,
            archiver,
            orchestrator,
        }
    }

    fn run_options(limit: usize) -> RunOptions {
        RunOptions {
            start_date: None,
            limit: Some(limit),
        }
    }

    fn publish_times(repo: &InMemoryRepository) -> Vec<Option<String>> {
        let alloc = allocator();
        repo.snapshot()
            .iter()
            .map(|v| v.publish_at.map(|t| alloc.format_local(t)))
            .collect()
    }

    #[tokio::test]
    async fn test_run_assigns_consecutive_slots_after_baseline() {
        let mut items = vec![uploaded_item("old.mp4", local("2025-11-27 09:30"))];
        items.extend(["a.mp4", "b.mp4", "c.mp4"].map(work_item));
        let h = harness(items);

        let report = h.orchestrator.run(run_options(10)).await.unwrap();

        assert_eq!(report.processed, 3);
        assert_eq!(report.baseline, Some(local("2025-11-27 09:30")));
        assert_eq!(report.start_slot, local("2025-11-27 12:00"));
        assert_eq!(
            publish_times(&h.repo),
            vec![
                Some("2025-11-27 09:30".to_string()),
                Some("2025-11-27 12:00".to_string()),
                Some("2025-11-27 16:00".to_string()),
                Some("2025-11-28 00:00".to_string()),
            ]
        );
        assert!(h.repo.snapshot().iter().all(|v| v.uploaded));
        assert_eq!(h.archiver.recorded_archives().await.len(), 3);
    }

    #[tokio::test]
    async fn test_remote_baseline_wins_when_later() {
        let items = vec![
            uploaded_item("old.mp4", local("2025-11-27 09:30")),
            work_item("a.mp4"),
        ];
        let h = harness(items);
        h.hosting
            .set_latest_scheduled(Some(local("2025-11-28 08:00")))
            .await;

        let report = h.orchestrator.run(run_options(1)).await.unwrap();
        assert_eq!(report.start_slot, local("2025-11-28 12:00"));
    }

    #[tokio::test]
    async fn test_remote_baseline_failure_falls_back_to_local() {
        let items = vec![
            uploaded_item("old.mp4", local("2025-11-27 23:00")),
            work_item("a.mp4"),
        ];
        let h = harness(items);
        h.hosting.set_latest_fails(true).await;

        let report = h.orchestrator.run(run_options(1)).await.unwrap();
        assert_eq!(report.start_slot, local("2025-11-28 00:00"));
        assert_eq!(report.processed, 1);
    }

    #[tokio::test]
    async fn test_limit_stops_after_successful_uploads() {
        let mut items = vec![uploaded_item("old.mp4", local("2025-11-27 09:30"))];
        items.extend(["a.mp4", "b.mp4", "c.mp4", "d.mp4", "e.mp4"].map(work_item));
        let h = harness(items);

        let report = h.orchestrator.run(run_options(2)).await.unwrap();
        assert_eq!(report.processed, 2);

        let stored = h.repo.snapshot();
        let uploaded: Vec<&str> = stored
            .iter()
            .skip(1)
            .filter(|v| v.uploaded)
            .map(|v| v.file_name.as_str())
            .collect();
        assert_eq!(uploaded, vec!["a.mp4", "b.mp4"]);
        for untouched in &stored[3..] {
            assert!(!untouched.uploaded);
            assert_eq!(untouched.publish_at, None);
        }
    }

    #[tokio::test]
    async fn test_zero_limit_processes_nothing() {
        let h = harness(vec![work_item("a.mp4")]);
        let report = h.orchestrator.run(run_options(0)).await.unwrap();
        assert_eq!(report.processed, 0);
        assert!(report.items.is_empty());
        assert_eq!(h.hosting.upload_count().await, 0);
    }

    #[tokio::test]
    async fn test_missing_file_skipped_and_batch_continues() {
        let items = vec![
            uploaded_item("old.mp4", local("2025-11-27 09:30")),
            work_item("gone.mp4"),
            work_item("a.mp4"),
        ];
        let h = harness(items);
        std::fs::remove_file(h.dir.path().join("gone.mp4")).unwrap();

        let report = h.orchestrator.run(run_options(5)).await.unwrap();
        assert_eq!(report.processed, 1);
        assert_eq!(report.skipped(), 1);

        let stored = h.repo.snapshot();
        assert!(!stored[1].uploaded);
        assert_eq!(stored[1].publish_at, None);
        // The skipped item does not consume a slot.
        assert_eq!(stored[2].publish_at, Some(local("2025-11-27 12:00")));
    }

    #[tokio::test]
    async fn test_upload_failure_restores_item_and_clock() {
        let items = vec![
            uploaded_item("old.mp4", local("2025-11-27 09:30")),
            work_item("bad.mp4"),
            work_item("good.mp4"),
        ];
        let h = harness(items);
        h.hosting.fail_uploads_for("bad.mp4").await;

        let report = h.orchestrator.run(run_options(5)).await.unwrap();
        assert_eq!(report.processed, 1);
        assert_eq!(report.failed(), 1);

        let stored = h.repo.snapshot();
        assert!(!stored[1].uploaded);
        assert_eq!(stored[1].publish_at, None);
        assert!(stored[2].uploaded);
        assert_eq!(stored[2].publish_at, Some(local("2025-11-27 12:00")));
    }

    #[tokio::test]
    async fn test_failed_upload_does_not_count_toward_limit() {
        let items = vec![
            uploaded_item("old.mp4", local("2025-11-27 09:30")),
            work_item("bad.mp4"),
            work_item("a.mp4"),
            work_item("b.mp4"),
        ];
        let h = harness(items);
        h.hosting.fail_uploads_for("bad.mp4").await;

        let report = h.orchestrator.run(run_options(2)).await.unwrap();
        assert_eq!(report.processed, 2);
        assert_eq!(h.hosting.uploaded_file_names().await, vec!["a.mp4", "b.mp4"]);
    }

    #[tokio::test]
    async fn test_counted_manual_item_sets_baseline() {
        let items = vec![
            uploaded_item("old.mp4", local("2025-11-27 09:30")),
            work_item("a.mp4"),
            manual_item("pinned.mp4", local("2025-11-29 08:00"), false),
            work_item("b.mp4"),
        ];
        let h = harness(items);

        let report = h.orchestrator.run(run_options(10)).await.unwrap();
        assert_eq!(report.processed, 3);
        assert_eq!(report.start_slot, local("2025-11-29 12:00"));
        assert_eq!(
            publish_times(&h.repo)[1..],
            [
                Some("2025-11-29 12:00".to_string()),
                Some("2025-11-29 08:00".to_string()),
                Some("2025-11-29 16:00".to_string()),
            ]
        );
    }

    #[test]
    fn test_place_pinned_item_ahead_of_clock() {
        let h = harness(vec![]);
        let mut pinned = manual_item("pinned.mp4", local("2025-11-29 08:00"), false);

        let clock = h.orchestrator.place(&mut pinned, local("2025-11-27 12:00"));
        assert_eq!(clock, local("2025-11-29 12:00"));
        assert_eq!(pinned.publish_at, Some(local("2025-11-29 08:00")));

        let mut auto = work_item("a.mp4");
        let clock = h.orchestrator.place(&mut auto, clock);
        assert_eq!(auto.publish_at, Some(local("2025-11-29 12:00")));
        assert_eq!(clock, local("2025-11-29 16:00"));
    }

    #[test]
    fn test_place_pinned_item_behind_clock() {
        let h = harness(vec![]);
        let mut pinned = manual_item("pinned.mp4", local("2025-11-20 08:00"), false);
        let clock = h.orchestrator.place(&mut pinned, local("2025-11-27 12:00"));
        assert_eq!(clock, local("2025-11-27 12:00"));

        let mut unpinned = work_item("m.mp4");
        unpinned.is_manual = true;
        let clock = h.orchestrator.place(&mut unpinned, clock);
        assert_eq!(unpinned.publish_at, Some(local("2025-11-27 12:00")));
        assert_eq!(clock, local("2025-11-27 16:00"));
    }

    #[tokio::test]
    async fn test_ignored_manual_item_does_not_move_clock() {
        let items = vec![
            uploaded_item("old.mp4", local("2025-11-27 09:30")),
            work_item("a.mp4"),
            manual_item("pinned.mp4", local("2025-12-05 08:00"), true),
            work_item("b.mp4"),
        ];
        let h = harness(items);

        h.orchestrator.run(run_options(10)).await.unwrap();

        let stored = h.repo.snapshot();
        assert_eq!(stored[1].publish_at, Some(local("2025-11-27 12:00")));
        assert_eq!(stored[2].publish_at, Some(local("2025-12-05 08:00")));
        assert_eq!(stored[3].publish_at, Some(local("2025-11-27 16:00")));
    }

    #[tokio::test]
    async fn test_start_date_uses_first_slot_of_day() {
        let items = vec![
            uploaded_item("old.mp4", local("2025-11-27 09:30")),
            work_item("a.mp4"),
        ];
        let h = harness(items);

        let report = h
            .orchestrator
            .run(RunOptions {
                start_date: NaiveDate::from_ymd_opt(2025, 12, 3),
                limit: None,
            })
            .await
            .unwrap();
        assert_eq!(report.start_slot, local("2025-12-03 00:00"));
    }

    #[tokio::test]
    async fn test_start_date_before_baseline_uses_baseline() {
        let items = vec![
            uploaded_item("old.mp4", local("2025-12-03 12:00")),
            work_item("a.mp4"),
        ];
        let h = harness(items);

        let report = h
            .orchestrator
            .run(RunOptions {
                start_date: NaiveDate::from_ymd_opt(2025, 12, 1),
                limit: None,
            })
            .await
            .unwrap();
        assert_eq!(report.start_slot, local("2025-12-03 16:00"));
    }

    #[tokio::test]
    async fn test_run_without_baseline_starts_after_now() {
        let h = harness(vec![work_item("a.mp4")]);
        let before = Utc::now();
        let report = h.orchestrator.run(run_options(1)).await.unwrap();
        assert!(report.start_slot > before);
        assert!(report.start_slot <= before + TimeDelta::hours(9));
    }

    #[tokio::test]
    async fn test_archive_failure_still_marks_uploaded() {
        let h = harness(vec![work_item("a.mp4")]);
        h.archiver
            .set_next_error(ArchiveError::SourceNotFound {
                path: PathBuf::from("a.mp4"),
            })
            .await;

        let report = h.orchestrator.run(run_options(1)).await.unwrap();
        assert!(matches!(
            report.items[0].outcome,
            ItemOutcome::Uploaded { archived: false, .. }
        ));
        assert!(h.repo.snapshot()[0].uploaded);
    }

    #[tokio::test]
    async fn test_run_without_hosting_is_configuration_error() {
        let repo = Arc::new(InMemoryRepository::new());
        let orchestrator = SchedulingOrchestrator::new(
            OrchestratorConfig::default(),
            allocator(),
            repo,
            None,
            Arc::new(MockArchiver::new()),
        );
        let err = orchestrator.run(RunOptions::default()).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::HostingNotConfigured));
    }

    #[tokio::test]
    async fn test_manual_schedule_uploads_immediately() {
        let h = harness(vec![work_item("a.mp4"), work_item("b.mp4")]);
        let request = ManualScheduleRequest {
            file_name: "b.mp4".to_string(),
            publish_at_local: NaiveDateTime::parse_from_str("2025-12-01 20:30", "%Y-%m-%d %H:%M")
                .unwrap(),
            count_in_baseline: false,
        };

        let report = h.orchestrator.manual_schedule(request).await.unwrap();
        assert_eq!(report.publish_at, local("2025-12-01 20:30"));
        assert!(report.archived);

        let stored = h.repo.snapshot();
        assert!(!stored[0].uploaded);
        let b = &stored[1];
        assert!(b.uploaded);
        assert!(b.is_manual);
        assert!(b.ignore_calc);
        assert_eq!(b.publish_at, Some(local("2025-12-01 20:30")));

        let uploads = h.hosting.recorded_uploads().await;
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].publish_at, Some(local("2025-12-01 20:30")));
    }

    #[tokio::test]
    async fn test_manual_schedule_failure_keeps_schedule() {
        let h = harness(vec![work_item("a.mp4")]);
        h.hosting.fail_uploads_for("a.mp4").await;
        let request = ManualScheduleRequest {
            file_name: "a.mp4".to_string(),
            publish_at_local: NaiveDateTime::parse_from_str("2025-12-01 08:00", "%Y-%m-%d %H:%M")
                .unwrap(),
            count_in_baseline: true,
        };

        let err = h.orchestrator.manual_schedule(request).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::Upload(_)));

        let stored = &h.repo.snapshot()[0];
        assert!(!stored.uploaded);
        assert!(stored.is_manual);
        assert!(!stored.ignore_calc);
        assert_eq!(stored.publish_at, Some(local("2025-12-01 08:00")));
    }

    #[tokio::test]
    async fn test_manual_schedule_refuses_uploaded_item() {
        let h = harness(vec![uploaded_item("done.mp4", local("2025-11-27 09:30"))]);
        std::fs::remove_file(h.dir.path().join("done.mp4")).unwrap();
        let before = h.repo.snapshot();
        let request = ManualScheduleRequest {
            file_name: "done.mp4".to_string(),
            publish_at_local: NaiveDateTime::parse_from_str("2025-12-01 20:30", "%Y-%m-%d %H:%M")
                .unwrap(),
            count_in_baseline: true,
        };

        let err = h.orchestrator.manual_schedule(request).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::AlreadyUploaded(name) if name == "done.mp4"));
        assert_eq!(h.repo.snapshot(), before);
        assert_eq!(h.hosting.upload_count().await, 0);
    }

    #[tokio::test]
    async fn test_run_skips_unsafe_stored_name() {
        let h = harness(vec![work_item("a.mp4")]);
        let mut stored = h.repo.snapshot();
        stored.insert(0, work_item("../outside.mp4"));
        h.repo.save(&stored).unwrap();

        let report = h.orchestrator.run(run_options(5)).await.unwrap();
        assert_eq!(report.items[0].outcome, ItemOutcome::SkippedUnsafeName);
        assert_eq!(report.processed, 1);
        assert_eq!(h.hosting.uploaded_file_names().await, vec!["a.mp4"]);
        assert!(!h.repo.snapshot()[0].uploaded);
    }

    #[tokio::test]
    async fn test_manual_schedule_unknown_item() {
        let h = harness(vec![]);
        let request = ManualScheduleRequest {
            file_name: "nope.mp4".to_string(),
            publish_at_local: NaiveDateTime::parse_from_str("2025-12-01 08:00", "%Y-%m-%d %H:%M")
                .unwrap(),
            count_in_baseline: false,
        };
        let err = h.orchestrator.manual_schedule(request).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::ItemNotFound(_)));
    }

    #[tokio::test]
    async fn test_manual_schedule_missing_file() {
        let h = harness(vec![work_item("a.mp4")]);
        std::fs::remove_file(h.dir.path().join("a.mp4")).unwrap();
        let request = ManualScheduleRequest {
            file_name: "a.mp4".to_string(),
            publish_at_local: NaiveDateTime::parse_from_str("2025-12-01 08:00", "%Y-%m-%d %H:%M")
                .unwrap(),
            count_in_baseline: false,
        };
        let err = h.orchestrator.manual_schedule(request).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::MissingFile(_)));
        assert_eq!(h.hosting.upload_count().await, 0);
    }

    #[tokio::test]
    async fn test_status_splits_pending_items() {
        let items = vec![
            uploaded_item("old.mp4", local("2025-11-27 09:30")),
            work_item("a.mp4"),
            manual_item("pinned.mp4", local("2025-11-29 08:00"), true),
            work_item("gone.mp4"),
        ];
        let h = harness(items);
        std::fs::remove_file(h.dir.path().join("gone.mp4")).unwrap();

        let status = h.orchestrator.status().await.unwrap();
        assert_eq!(status.pending_count, 3);
        assert_eq!(status.automatic.len(), 2);
        assert_eq!(status.manual.len(), 1);
        assert_eq!(status.automatic[0].file_status, FileStatus::Available);
        assert_eq!(status.automatic[1].file_status, FileStatus::Missing);
        assert_eq!(status.next_slot_local, "2025-11-27 12:00");
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let h = harness(vec![work_item("a.mp4"), work_item("b.mp4")]);
        let removed = h.orchestrator.delete("a.mp4").unwrap();
        assert_eq!(removed.file_name, "a.mp4");
        assert_eq!(h.repo.snapshot().len(), 1);
        assert!(matches!(
            h.orchestrator.delete("a.mp4"),
            Err(OrchestratorError::ItemNotFound(_))
        ));
    }
}
