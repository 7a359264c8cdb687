//! HTTP generation client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, COOKIE, USER_AGENT};
use reqwest::{Client, Method, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::{GenerationError, GenerationService, SubmittedTask};
use crate::config::GenerationConfig;
use crate::matcher::CompletionRecord;

const CREATE_PATH: &str = "/backend/nf/create";
const PENDING_PATH: &str = "/backend/nf/pending";
const MAILBOX_PATH: &str = "/backend/project_y/mailbox";

#[derive(Debug, Serialize)]
struct CreatePayload<'a> {
    kind: &'static str,
    prompt: &'a str,
    orientation: &'a str,
    size: &'a str,
    n_frames: u32,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    #[serde(alias = "task_id")]
    id: String,
    #[serde(default)]
    remaining: Option<i64>,
    #[serde(default)]
    rate_limit_and_credit_balance: Option<CreditBalance>,
}

#[derive(Debug, Deserialize)]
struct CreditBalance {
    #[serde(default)]
    estimated_num_videos_remaining: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct Mailbox {
    #[serde(default)]
    items: Vec<MailboxItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MailboxItem {
    id: String,
    kind: String,
    display_str: String,
    object: Option<MailboxObject>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MailboxObject {
    draft: Option<Draft>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Draft {
    task_id: Option<String>,
    downloadable_url: Option<String>,
}

impl From<MailboxItem> for CompletionRecord {
    fn from(item: MailboxItem) -> Self {
        let draft = item.object.and_then(|o| o.draft).unwrap_or_default();
        CompletionRecord {
            id: item.id,
            kind: item.kind,
            display_text: item.display_str,
            task_id: draft.task_id.filter(|t| !t.is_empty()),
            url: draft.downloadable_url.filter(|u| !u.is_empty()),
        }
    }
}

/// Generation client authenticated with session credentials from config.
pub struct HttpGenerationClient {
    client: Client,
    config: GenerationConfig,
}

impl HttpGenerationClient {
    pub fn new(config: GenerationConfig) -> Result<Self, GenerationError> {
        let headers = Self::default_headers(&config)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_secs)))
            .default_headers(headers)
            .build()
            .map_err(|e| GenerationError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn default_headers(config: &GenerationConfig) -> Result<HeaderMap, GenerationError> {
        let value = |raw: &str, name: &str| {
            HeaderValue::from_str(raw)
                .map_err(|_| GenerationError::Client(format!("invalid {} header value", name)))
        };

        let token = config.bearer_token.trim();
        let authorization = if token.to_ascii_lowercase().starts_with("bearer ") {
            token.to_string()
        } else {
            format!("Bearer {}", token)
        };

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value(&authorization, "authorization")?);
        headers.insert(USER_AGENT, value(&config.user_agent, "user-agent")?);
        if !config.cookie.is_empty() {
            headers.insert(COOKIE, value(&config.cookie, "cookie")?);
        }
        if !config.device_id.is_empty() {
            headers.insert("oai-device-id", value(&config.device_id, "device id")?);
        }
        Ok(headers)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn send(&self, method: Method, url: String, body: Option<Value>) -> Result<Response, GenerationError> {
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout
            } else if e.is_connect() {
                GenerationError::ConnectionFailed(e.to_string())
            } else {
                GenerationError::InvalidResponse(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }
        Ok(response)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<T, GenerationError> {
        self.send(Method::GET, url, None)
            .await?
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl GenerationService for HttpGenerationClient {
    async fn submit(&self, prompt: &str) -> Result<SubmittedTask, GenerationError> {
        let payload = CreatePayload {
            kind: "video",
            prompt,
            orientation: &self.config.orientation,
            size: &self.config.size,
            n_frames: self.config.n_frames,
            model: &self.config.model,
        };
        let body =
            serde_json::to_value(&payload).map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        let created: CreateResponse = self
            .send(Method::POST, self.url(CREATE_PATH), Some(body))
            .await?
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        let remaining = created.remaining.or_else(|| {
            created
                .rate_limit_and_credit_balance
                .and_then(|b| b.estimated_num_videos_remaining)
        });

        info!(task_id = %created.id, remaining = ?remaining, "Generation submitted");
        Ok(SubmittedTask {
            task_id: created.id,
            remaining,
        })
    }

    async fn pending_task_ids(&self) -> Result<Vec<String>, GenerationError> {
        let pending: Value = self.get_json(self.url(PENDING_PATH)).await?;
        let mut ids = Vec::new();
        collect_ids(&pending, &mut ids);
        debug!(count = ids.len(), "Fetched pending tasks");
        Ok(ids)
    }

    async fn feed(&self) -> Result<Vec<CompletionRecord>, GenerationError> {
        let url = format!("{}?limit={}", self.url(MAILBOX_PATH), self.config.feed_limit);
        let mailbox: Mailbox = self.get_json(url).await?;
        debug!(count = mailbox.items.len(), "Fetched completion feed");
        Ok(mailbox.items.into_iter().map(CompletionRecord::from).collect())
    }
}

/// Collect every string under an `id` or `task_id` key, at any depth.
fn collect_ids(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Array(items) => items.iter().for_each(|v| collect_ids(v, out)),
        Value::Object(map) => {
            for (key, v) in map {
                match v {
                    Value::String(s) if key == "id" || key == "task_id" => out.push(s.clone()),
                    _ => collect_ids(v, out),
                }
            }
        }
        _ => {}
    }
}
