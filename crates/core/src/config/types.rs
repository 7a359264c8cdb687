use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::matcher::MatcherConfig;
use crate::schedule::ScheduleConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub matcher: MatcherConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub generation: Option<GenerationConfig>,
    #[serde(default)]
    pub hosting: Option<HostingConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([127, 0, 0, 1])
}

fn default_port() -> u16 {
    9999
}

/// Item store and media locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// JSON file holding every work item.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Directory holding the backlog of finished videos.
    #[serde(default = "default_media_dir")]
    pub media_dir: PathBuf,
    /// Directory uploaded videos are moved into.
    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            media_dir: default_media_dir(),
            archive_dir: default_archive_dir(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("videos.json")
}

fn default_media_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from("_uploaded_videos")
}

/// Artifact download settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetcherConfig {
    /// Files larger than this are considered complete and never re-downloaded.
    #[serde(default = "default_min_existing_bytes")]
    pub min_existing_bytes: u64,
    /// Referer header sent with artifact requests.
    #[serde(default)]
    pub referer: Option<String>,
    /// User-Agent header sent with artifact requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Whole-transfer timeout in seconds (0 = no timeout).
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            min_existing_bytes: default_min_existing_bytes(),
            referer: None,
            user_agent: default_user_agent(),
            timeout_secs: default_fetch_timeout(),
        }
    }
}

fn default_min_existing_bytes() -> u64 {
    1024
}

fn default_fetch_timeout() -> u64 {
    600
}

pub(crate) fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36".to_string()
}

/// Generation service credentials and request shape
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    /// Service base URL (e.g., "https://gen.example.com")
    pub base_url: String,
    /// Bearer token, with or without the "Bearer " prefix
    pub bearer_token: String,
    #[serde(default)]
    pub cookie: String,
    #[serde(default)]
    pub device_id: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_orientation")]
    pub orientation: String,
    #[serde(default = "default_size")]
    pub size: String,
    #[serde(default = "default_n_frames")]
    pub n_frames: u32,
    /// Number of feed entries requested per reconciliation.
    #[serde(default = "default_feed_limit")]
    pub feed_limit: u32,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_model() -> String {
    "sy_8".to_string()
}

fn default_orientation() -> String {
    "portrait".to_string()
}

fn default_size() -> String {
    "small".to_string()
}

fn default_n_frames() -> u32 {
    300
}

fn default_feed_limit() -> u32 {
    50
}

fn default_timeout() -> u32 {
    30
}

/// Hosting service settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HostingConfig {
    /// Data API base (e.g., "https://www.googleapis.com")
    #[serde(default = "default_hosting_api_base")]
    pub api_base: String,
    /// Upload API base; defaults to `api_base` when empty.
    #[serde(default)]
    pub upload_base: String,
    /// OAuth access token obtained out of band.
    pub access_token: String,
    /// Request timeout in seconds for metadata calls (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_hosting_api_base() -> String {
    "https://www.googleapis.com".to_string()
}

impl HostingConfig {
    pub fn upload_base(&self) -> &str {
        if self.upload_base.is_empty() {
            &self.api_base
        } else {
            &self.upload_base
        }
    }
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub schedule: ScheduleConfig,
    pub matcher: MatcherConfig,
    pub fetcher: FetcherConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<SanitizedGenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosting: Option<SanitizedHostingConfig>,
}

/// Sanitized generation config (credentials hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedGenerationConfig {
    pub base_url: String,
    pub bearer_token_configured: bool,
    pub cookie_configured: bool,
    pub model: String,
    pub timeout_secs: u32,
}

/// Sanitized hosting config (token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedHostingConfig {
    pub api_base: String,
    pub access_token_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            store: config.store.clone(),
            schedule: config.schedule.clone(),
            matcher: config.matcher.clone(),
            fetcher: config.fetcher.clone(),
            generation: config.generation.as_ref().map(|g| SanitizedGenerationConfig {
                base_url: g.base_url.clone(),
                bearer_token_configured: !g.bearer_token.is_empty(),
                cookie_configured: !g.cookie.is_empty(),
                model: g.model.clone(),
                timeout_secs: g.timeout_secs,
            }),
            hosting: config.hosting.as_ref().map(|h| SanitizedHostingConfig {
                api_base: h.api_base.clone(),
                access_token_configured: !h.access_token.is_empty(),
                timeout_secs: h.timeout_secs,
            }),
        }
    }
}
