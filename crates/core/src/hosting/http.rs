//! HTTP hosting client using the resumable upload protocol.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::LOCATION;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::{HostingError, HostingService, UploadReceipt, UploadRequest};
use crate::config::HostingConfig;

const UPLOAD_PATH: &str = "/upload/youtube/v3/videos?uploadType=resumable&part=snippet,status";
const LIST_PATH: &str = "/youtube/v3/videos?part=status&myRating=like&maxResults=10";

#[derive(Debug, Deserialize)]
struct VideoResource {
    id: String,
    #[serde(default)]
    status: Option<VideoStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatus {
    #[serde(default)]
    privacy_status: String,
    #[serde(default)]
    publish_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoResource>,
}

/// Hosting client authenticated with a pre-acquired bearer token.
pub struct HttpHostingClient {
    client: Client,
    // No overall timeout: upload bodies can take arbitrarily long.
    upload_client: Client,
    config: HostingConfig,
}

impl HttpHostingClient {
    pub fn new(config: HostingConfig) -> Result<Self, HostingError> {
        let timeout = Duration::from_secs(u64::from(config.timeout_secs));
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HostingError::Client(e.to_string()))?;
        let upload_client = Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| HostingError::Client(e.to_string()))?;

        Ok(Self {
            client,
            upload_client,
            config,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }

    fn upload_url(&self) -> String {
        format!("{}{}", self.config.upload_base().trim_end_matches('/'), UPLOAD_PATH)
    }

    fn map_request_error(e: reqwest::Error) -> HostingError {
        if e.is_timeout() {
            HostingError::Timeout
        } else if e.is_connect() {
            HostingError::ConnectionFailed(e.to_string())
        } else {
            HostingError::InvalidResponse(e.to_string())
        }
    }

    async fn check_status(response: Response) -> Result<Response, HostingError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(HostingError::Api {
            status: status.as_u16(),
            message: body.chars().take(200).collect(),
        })
    }

    /// Scheduled publication requires a private video.
    fn privacy_for(request: &UploadRequest) -> &str {
        if request.publish_at.is_some() || request.privacy.is_empty() {
            "private"
        } else {
            &request.privacy
        }
    }

    async fn open_session(&self, request: &UploadRequest, size: u64) -> Result<String, HostingError> {
        let mut status = json!({ "privacyStatus": Self::privacy_for(request) });
        if let Some(at) = request.publish_at {
            status["publishAt"] = json!(at.to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        let body = json!({
            "snippet": {
                "title": request.title,
                "description": request.description,
                "tags": request.tags,
                "categoryId": request.category_id,
            },
            "status": status,
        });

        let response = self
            .client
            .post(self.upload_url())
            .bearer_auth(&self.config.access_token)
            .header("X-Upload-Content-Type", "video/*")
            .header("X-Upload-Content-Length", size.to_string())
            .json(&body)
            .send()
            .await
            .map_err(Self::map_request_error)?;
        let response = Self::check_status(response).await?;

        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| HostingError::NoUploadSession("missing Location header".to_string()))
    }
}

#[async_trait]
impl HostingService for HttpHostingClient {
    async fn upload(&self, request: &UploadRequest) -> Result<UploadReceipt, HostingError> {
        let io_error = |source| HostingError::Io {
            path: request.path.clone(),
            source,
        };
        // Generated clips are small enough to send from memory.
        let media = tokio::fs::read(&request.path).await.map_err(io_error)?;

        let session = self.open_session(request, media.len() as u64).await?;
        debug!(path = %request.path.display(), bytes = media.len(), "Upload session opened");

        let response = self
            .upload_client
            .put(&session)
            .bearer_auth(&self.config.access_token)
            .header("Content-Type", "video/*")
            .body(media)
            .send()
            .await
            .map_err(Self::map_request_error)?;
        let response = Self::check_status(response).await?;

        let video: VideoResource = response
            .json()
            .await
            .map_err(|e| HostingError::InvalidResponse(e.to_string()))?;

        let publish_at = video
            .status
            .and_then(|s| s.publish_at)
            .and_then(|s| parse_instant(&s))
            .or(request.publish_at);

        info!(
            path = %request.path.display(),
            video_id = %video.id,
            publish_at = ?publish_at,
            "Video uploaded"
        );
        Ok(UploadReceipt {
            video_id: video.id,
            publish_at,
        })
    }

    async fn latest_scheduled_publish(&self) -> Result<Option<DateTime<Utc>>, HostingError> {
        let response = self
            .client
            .get(self.api_url(LIST_PATH))
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(Self::map_request_error)?;
        let response = Self::check_status(response).await?;

        let list: VideoListResponse = response
            .json()
            .await
            .map_err(|e| HostingError::InvalidResponse(e.to_string()))?;

        let latest = list
            .items
            .into_iter()
            .filter_map(|v| v.status)
            .filter(|s| s.privacy_status == "private")
            .filter_map(|s| s.publish_at.as_deref().and_then(parse_instant))
            .max();

        debug!(latest = ?latest, "Fetched latest scheduled publish time");
        Ok(latest)
    }
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
