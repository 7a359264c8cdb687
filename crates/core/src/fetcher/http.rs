//! HTTP artifact fetcher.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, REFERER};
use reqwest::{Client, Response};
use sha2::{Digest, Sha256};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};

use super::traits::{ArtifactFetcher, FetchOutcome};
use super::FetchError;
use crate::config::FetcherConfig;
use crate::metrics;

const EXCERPT_CHARS: usize = 200;

/// Streams artifacts over HTTP into `<destination>.part`, then renames.
pub struct HttpArtifactFetcher {
    client: Client,
    config: FetcherConfig,
}

impl HttpArtifactFetcher {
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Size of an existing regular file at `path`.
    async fn existing_size(path: &Path) -> Result<Option<u64>, FetchError> {
        match fs::metadata(path).await {
            Ok(meta) if meta.is_file() => Ok(Some(meta.len())),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FetchError::io(path, e)),
        }
    }

    async fn try_fetch(&self, url: &str, destination: &Path) -> Result<FetchOutcome, FetchError> {
        if let Some(bytes) = Self::existing_size(destination).await? {
            if bytes > self.config.min_existing_bytes {
                debug!(path = %destination.display(), bytes, "Artifact already present");
                return Ok(FetchOutcome::SkippedExisting { bytes });
            }
            warn!(path = %destination.display(), bytes, "Existing artifact too small, replacing");
            fs::remove_file(destination)
                .await
                .map_err(|e| FetchError::io(destination, e))?;
        }

        let mut request = self.client.get(url);
        if let Some(referer) = self.config.referer.as_deref().filter(|r| !r.is_empty()) {
            request = request.header(REFERER, referer);
        }

        let mut response = request.send().await.map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                body: excerpt(response).await,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if content_type.contains("xml") || content_type.contains("text") {
            return Err(FetchError::UnexpectedContentType {
                content_type,
                excerpt: excerpt(response).await,
            });
        }

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| FetchError::io(parent, e))?;
        }

        let expected = response.content_length();
        let partial = partial_path(destination);

        let written = stream_to_file(&mut response, &partial).await;
        let (bytes, sha256) = match written {
            Ok(done) => done,
            Err(e) => {
                let _ = fs::remove_file(&partial).await;
                return Err(e);
            }
        };

        if let Some(expected) = expected {
            if expected != bytes {
                let _ = fs::remove_file(&partial).await;
                return Err(FetchError::SizeMismatch {
                    expected,
                    actual: bytes,
                });
            }
        }

        if let Err(e) = fs::rename(&partial, destination).await {
            let _ = fs::remove_file(&partial).await;
            return Err(FetchError::io(destination, e));
        }

        Ok(FetchOutcome::Downloaded { bytes, sha256 })
    }
}

#[async_trait]
impl ArtifactFetcher for HttpArtifactFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> FetchOutcome {
        let outcome = match self.try_fetch(url, destination).await {
            Ok(outcome) => outcome,
            Err(e) => FetchOutcome::Failed(e),
        };

        match &outcome {
            FetchOutcome::Downloaded { bytes, sha256 } => {
                metrics::DOWNLOADED_BYTES.inc_by(*bytes);
                info!(path = %destination.display(), bytes, sha256 = %sha256, "Artifact downloaded");
            }
            FetchOutcome::SkippedExisting { .. } => {}
            FetchOutcome::Failed(e) => {
                warn!(path = %destination.display(), url, error = %e, "Artifact download failed");
            }
        }
        metrics::DOWNLOADS
            .with_label_values(&[outcome.kind().as_str()])
            .inc();

        outcome
    }
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}

async fn excerpt(response: Response) -> String {
    let body = response.text().await.unwrap_or_default();
    body.chars().take(EXCERPT_CHARS).collect()
}

async fn stream_to_file(response: &mut Response, path: &Path) -> Result<(u64, String), FetchError> {
    let file = File::create(path)
        .await
        .map_err(|e| FetchError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    let mut hasher = Sha256::new();
    let mut total = 0u64;

    while let Some(chunk) = response.chunk().await.map_err(FetchError::from_reqwest)? {
        hasher.update(&chunk);
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| FetchError::io(path, e))?;
        total += chunk.len() as u64;
    }

    writer.flush().await.map_err(|e| FetchError::io(path, e))?;
    writer
        .get_ref()
        .sync_all()
        .await
        .map_err(|e| FetchError::io(path, e))?;

    Ok((total, format!("{:x}", hasher.finalize())))
}
