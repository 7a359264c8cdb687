//! Tiered task-to-artifact matching.
//!
//! Works entirely on an in-memory feed snapshot; fetching the feed is the
//! caller's job.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use tracing::{debug, warn};

use super::config::MatcherConfig;
use super::types::{CompletionRecord, MatchTarget, MatchTier, Resolution};
use super::MatchError;
use crate::metrics;

static ARTIFACT_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"files/([a-zA-Z0-9_-]+)/").unwrap());

/// Key of the artifact inside a download URL (the `files/<key>/` segment).
pub fn artifact_key(url: &str) -> Option<&str> {
    ARTIFACT_KEY
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Correlates a submitted task with a completed artifact.
#[derive(Debug, Clone)]
pub struct TaskMatcher {
    config: MatcherConfig,
    id_pattern: Regex,
}

impl TaskMatcher {
    pub fn new(config: MatcherConfig) -> Result<Self, MatchError> {
        let id_pattern = Regex::new(&config.id_pattern)
            .map_err(|e| MatchError::InvalidPattern(e.to_string()))?;
        Ok(Self { config, id_pattern })
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Resolve download URLs for `target`.
    ///
    /// Only completed records with a URL are considered. An exact task id hit
    /// short-circuits; otherwise every fuzzy hit is returned in feed order;
    /// otherwise the first completed record is returned as a low-confidence
    /// fallback.
    pub fn resolve(
        &self,
        target: &MatchTarget,
        feed: &[CompletionRecord],
    ) -> Result<Resolution, MatchError> {
        let candidates: Vec<(&CompletionRecord, &str)> = feed
            .iter()
            .filter(|r| r.kind == self.config.complete_kind)
            .filter_map(|r| r.download_url().map(|url| (r, url)))
            .collect();

        if !target.task_id.is_empty() {
            let exact = candidates
                .iter()
                .find(|(r, _)| r.task_id.as_deref() == Some(target.task_id.as_str()));
            if let Some((record, url)) = exact {
                debug!(task_id = %target.task_id, record_id = %record.id, "Exact task match");
                return Ok(self.resolved(MatchTier::Exact, vec![url.to_string()]));
            }
        }

        let identifier = self.extract_identifier(&target.prompt);
        let target_key = self.normalize(&target.prompt);

        let fuzzy: Vec<String> = candidates
            .iter()
            .filter(|(record, _)| {
                if let Some(id) = identifier {
                    if record.display_text.contains(id) {
                        return true;
                    }
                }
                let record_key = self.normalize(&record.display_text);
                keys_overlap(&target_key, &record_key)
            })
            .map(|(_, url)| url.to_string())
            .collect();

        if !fuzzy.is_empty() {
            debug!(
                task_id = %target.task_id,
                identifier = identifier.unwrap_or(""),
                count = fuzzy.len(),
                "Fuzzy prompt match"
            );
            return Ok(self.resolved(MatchTier::Fuzzy, fuzzy));
        }

        match candidates.first() {
            Some((record, url)) => {
                warn!(
                    task_id = %target.task_id,
                    record_id = %record.id,
                    "No task or prompt match, falling back to newest completed artifact (low confidence)"
                );
                Ok(self.resolved(MatchTier::Fallback, vec![url.to_string()]))
            }
            None => Err(MatchError::NotFound),
        }
    }

    /// First completed record with a URL whose display text carries `unique_id`.
    pub fn find_by_unique_id<'a>(
        &self,
        unique_id: &str,
        feed: &'a [CompletionRecord],
    ) -> Option<&'a CompletionRecord> {
        if unique_id.is_empty() {
            return None;
        }
        feed.iter().find(|r| {
            r.kind == self.config.complete_kind
                && r.download_url().is_some()
                && r.display_text.contains(unique_id)
        })
    }

    /// Whether a feed record marks a finished generation with a download URL.
    pub fn is_complete(&self, record: &CompletionRecord) -> bool {
        record.kind == self.config.complete_kind && record.download_url().is_some()
    }

    /// Short identifier embedded in `text`, if any.
    pub fn extract_identifier<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.id_pattern.find(text).map(|m| m.as_str())
    }

    /// Lower-case, keep only `[a-z0-9]`, truncate to the configured length.
    pub fn normalize(&self, text: &str) -> String {
        text.to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            .take(self.config.key_length)
            .collect()
    }

    fn resolved(&self, tier: MatchTier, urls: Vec<String>) -> Resolution {
        metrics::MATCH_RESOLUTIONS
            .with_label_values(&[tier.as_str()])
            .inc();
        Resolution { tier, urls }
    }
}

// An empty key would be a substring of everything.
fn keys_overlap(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (a.contains(b) || b.contains(a))
}
