use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::fetcher::{ArtifactFetcher, FetchOutcome};
use crate::generation::GenerationService;
use crate::matcher::{artifact_key, CompletionRecord, MatchTarget, TaskMatcher};
use crate::store::{
    find_by_unique_id, find_item, upsert_item, validate_file_name, ItemRepository, WorkItem,
};

use super::types::{DownloadReport, DownloadRequest, DownloadStatus, PollStatus, SubmitReport};
use super::ReconcileError;

const SYNC_DESCRIPTION: &str = "Synced from generation feed.";
const SYNC_TITLE_EXCERPT: usize = 30;

/// Keeps the item store in step with the generation service.
pub struct Reconciler {
    generation: Arc<dyn GenerationService>,
    matcher: TaskMatcher,
    fetcher: Arc<dyn ArtifactFetcher>,
    repository: Arc<dyn ItemRepository>,
    media_dir: PathBuf,
}

impl Reconciler {
    pub fn new(
        generation: Arc<dyn GenerationService>,
        matcher: TaskMatcher,
        fetcher: Arc<dyn ArtifactFetcher>,
        repository: Arc<dyn ItemRepository>,
        media_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            generation,
            matcher,
            fetcher,
            repository,
            media_dir: media_dir.into(),
        }
    }

    pub fn matcher(&self) -> &TaskMatcher {
        &self.matcher
    }

    /// Submit a prompt. With metadata, the item is recorded as pending; an
    /// already uploaded entry with the same name or id refuses the write.
    pub async fn submit(
        &self,
        prompt: &str,
        metadata: Option<WorkItem>,
    ) -> Result<SubmitReport, ReconcileError> {
        let task = self.generation.submit(prompt).await?;
        info!(task_id = %task.task_id, remaining = ?task.remaining, "Generation submitted");

        let file_name = match metadata {
            Some(mut item) => {
                item.uploaded = false;
                item.is_manual = false;
                let file_name = item.file_name.clone();
                let mut items = self.repository.load()?;
                upsert_item(&mut items, item)?;
                self.repository.save(&items)?;
                debug!(task_id = %task.task_id, file_name = %file_name, "Recorded item for task");
                Some(file_name)
            }
            None => None,
        };

        Ok(SubmitReport {
            task_id: task.task_id,
            remaining: task.remaining,
            file_name,
        })
    }

    /// Running while the service still lists the task, else the matched URLs.
    pub async fn poll(&self, task_id: &str, prompt: &str) -> Result<PollStatus, ReconcileError> {
        if self.generation.is_pending(task_id).await? {
            debug!(task_id = %task_id, "Task still running");
            return Ok(PollStatus::Running);
        }

        let feed = self.generation.feed().await?;
        let resolution = self
            .matcher
            .resolve(&MatchTarget::new(task_id, prompt), &feed)?;
        info!(
            task_id = %task_id,
            tier = resolution.tier.as_str(),
            candidates = resolution.urls.len(),
            "Task resolved"
        );
        Ok(PollStatus::Done(resolution))
    }

    /// Record metadata, find a URL if none was given, then fetch.
    ///
    /// A failed fetch is reported in the returned status; only store and
    /// bookkeeping failures are errors. The file name must be a bare name so
    /// the artifact lands inside the media directory.
    pub async fn download(&self, request: DownloadRequest) -> Result<DownloadReport, ReconcileError> {
        let mut file_name = request.file_name.filter(|s| !s.is_empty());
        let mut url = request.url.filter(|s| !s.is_empty());

        if let Some(mut item) = request.metadata {
            if !item.file_name.is_empty() {
                file_name = Some(item.file_name.clone());
            } else {
                let name = file_name
                    .clone()
                    .unwrap_or_else(|| derive_file_name(url.as_deref()));
                item.file_name = name.clone();
                file_name = Some(name);
            }
            if url.is_some() {
                item.download_url = url.clone();
            }
            item.uploaded = false;
            item.is_manual = false;

            let mut items = self.repository.load()?;
            let index = upsert_item(&mut items, item)?.index();
            if url.is_none() {
                url = items[index].download_url.clone();
            }
            self.repository.save(&items)?;
            debug!(file_name = ?file_name, "Metadata recorded");
        }

        if url.is_none() && (request.unique_id_lookup.is_some() || file_name.is_some()) {
            url = self
                .repair_url(request.unique_id_lookup, file_name.as_deref())
                .await?;
        }

        let file_name = file_name.unwrap_or_else(|| derive_file_name(url.as_deref()));
        validate_file_name(&file_name)?;

        let Some(source) = url else {
            warn!(file_name = %file_name, "No download URL, recorded metadata only");
            return Ok(DownloadReport {
                file_name,
                url: None,
                status: DownloadStatus::MetadataOnly,
            });
        };

        let destination = self.media_dir.join(&file_name);
        info!(file_name = %file_name, "Fetching artifact");
        let status = match self.fetcher.fetch(&source, &destination).await {
            FetchOutcome::Downloaded { bytes, sha256 } => DownloadStatus::Downloaded { bytes, sha256 },
            FetchOutcome::SkippedExisting { bytes } => DownloadStatus::SkippedExisting { bytes },
            FetchOutcome::Failed(e) => {
                warn!(file_name = %file_name, error = %e, "Fetch failed");
                DownloadStatus::Failed {
                    error: e.to_string(),
                }
            }
        };

        Ok(DownloadReport {
            file_name,
            url: Some(source),
            status,
        })
    }

    /// Find a URL for an item that has lost it: the stored record first, then
    /// the feed. A URL found in the feed is written back to the store.
    async fn repair_url(
        &self,
        lookup: Option<String>,
        file_name: Option<&str>,
    ) -> Result<Option<String>, ReconcileError> {
        let mut lookup_id = lookup.filter(|s| !s.is_empty());

        if lookup_id.is_none() {
            if let Some(name) = file_name {
                let items = self.repository.load()?;
                if let Some(item) = find_item(&items, name) {
                    if item.download_url.is_some() {
                        return Ok(item.download_url.clone());
                    }
                    lookup_id = item.unique_id.clone();
                }
            }
        }

        let Some(id) = lookup_id else {
            return Ok(None);
        };

        let feed = match self.generation.feed().await {
            Ok(feed) => feed,
            Err(e) => {
                warn!(unique_id = %id, error = %e, "Feed lookup failed");
                return Ok(None);
            }
        };
        let Some(found) = self
            .matcher
            .find_by_unique_id(&id, &feed)
            .and_then(CompletionRecord::download_url)
            .map(String::from)
        else {
            debug!(unique_id = %id, "Identifier not in feed");
            return Ok(None);
        };

        let mut items = self.repository.load()?;
        if let Some(item) = find_by_unique_id(&mut items, &id) {
            item.download_url = Some(found.clone());
            self.repository.save(&items)?;
            info!(unique_id = %id, "Download URL refreshed from feed");
        }
        Ok(Some(found))
    }

    /// Record completed generations the store does not know about yet.
    ///
    /// Returns the number of items added. Known identifiers only get their
    /// URL refreshed.
    pub async fn sync_feed(&self) -> Result<usize, ReconcileError> {
        let feed = self.generation.feed().await?;
        let mut items = self.repository.load()?;
        let mut file_names: HashSet<String> = items.iter().map(|v| v.file_name.clone()).collect();
        let mut added = 0;
        let mut refreshed = 0;

        for record in feed.iter().filter(|r| self.matcher.is_complete(r)) {
            let Some(url) = record.download_url() else {
                continue;
            };
            let Some(key) = artifact_key(url) else {
                continue;
            };

            match self.matcher.extract_identifier(&record.display_text) {
                Some(id) => {
                    if let Some(item) = find_by_unique_id(&mut items, id) {
                        item.download_url = Some(url.to_string());
                        refreshed += 1;
                        continue;
                    }
                    let file_name = format!("{}.mp4", id);
                    if !file_names.insert(file_name.clone()) {
                        continue;
                    }
                    let mut title = format!("SYNC: {}", id);
                    if record.display_text.chars().count() > SYNC_TITLE_EXCERPT {
                        title.push(' ');
                        title.extend(record.display_text.chars().take(SYNC_TITLE_EXCERPT));
                    }
                    items.push(synced_item(file_name, title, url).with_unique_id(id));
                    added += 1;
                }
                None => {
                    let file_name = format!("gen_{}.mp4", key);
                    if !file_names.insert(file_name.clone()) {
                        continue;
                    }
                    items.push(synced_item(file_name, format!("SYNC: {}", key), url));
                    added += 1;
                }
            }
        }

        self.repository.save(&items)?;
        info!(added, refreshed, "Feed sync finished");
        Ok(added)
    }
}

fn synced_item(file_name: String, title: String, url: &str) -> WorkItem {
    let mut item = WorkItem::new(file_name)
        .with_title(title)
        .with_download_url(url);
    item.description = SYNC_DESCRIPTION.to_string();
    item.is_manual = true;
    item
}

/// Local file name for an artifact with no name supplied.
fn derive_file_name(url: Option<&str>) -> String {
    match url {
        Some(url) => match artifact_key(url) {
            Some(key) => format!("gen_{}.mp4", key),
            None => format!("gen_{}.mp4", Utc::now().format("%Y%m%d_%H%M%S")),
        },
        None => format!("pending_{}.mp4", Utc::now().format("%H%M%S")),
    }
}
