//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process router
//! with mock dependencies injected, so every endpoint can be exercised
//! without the hosting or generation services.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use skyforge_core::{
    testing::{MockArchiver, MockArtifactFetcher, MockGenerationService, MockHostingService},
    Config, ItemRepository, JsonFileRepository, MatcherConfig, OrchestratorConfig, Reconciler,
    SchedulingOrchestrator, SlotAllocator, TaskMatcher, WorkItem,
};
use skyforge_server::state::AppState;

/// Re-export fixtures for test convenience
pub use skyforge_core::testing::fixtures;

/// Test fixture with mock dependencies.
///
/// Provides an in-process router with fully controllable mocks for:
/// - Video hosting (MockHostingService)
/// - Video generation (MockGenerationService)
/// - Artifact downloads (MockArtifactFetcher)
/// - Archival (MockArchiver)
pub struct TestFixture {
    pub router: Router,
    pub hosting: Arc<MockHostingService>,
    pub generation: Arc<MockGenerationService>,
    pub fetcher: Arc<MockArtifactFetcher>,
    pub archiver: Arc<MockArchiver>,
    /// Holds the store file and the media directory
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Create a fixture with every service configured.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let hosting = Arc::new(MockHostingService::new());
        let generation = Arc::new(MockGenerationService::new());
        let fetcher = Arc::new(MockArtifactFetcher::new());
        let archiver = Arc::new(MockArchiver::new());

        let mut config = Config::default();
        config.store.path = temp_dir.path().join("videos.json");
        config.store.media_dir = temp_dir.path().to_path_buf();

        let repository = Arc::new(JsonFileRepository::new(config.store.path.clone()));
        let orchestrator = SchedulingOrchestrator::new(
            OrchestratorConfig::from(&config),
            SlotAllocator::from_config(&config.schedule).expect("Invalid default slots"),
            repository.clone(),
            test_config
                .with_hosting
                .then(|| Arc::clone(&hosting) as Arc<dyn skyforge_core::HostingService>),
            archiver.clone(),
        );

        let reconciler = test_config.with_generation.then(|| {
            Reconciler::new(
                generation.clone(),
                TaskMatcher::new(MatcherConfig::default()).expect("Invalid matcher"),
                fetcher.clone(),
                repository.clone(),
                temp_dir.path(),
            )
        });

        let state = Arc::new(AppState::new(config, orchestrator, reconciler));
        let router = skyforge_server::api::create_router(state);

        Self {
            router,
            hosting,
            generation,
            fetcher,
            archiver,
            temp_dir,
        }
    }

    pub fn media_dir(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }

    fn repository(&self) -> JsonFileRepository {
        JsonFileRepository::new(self.temp_dir.path().join("videos.json"))
    }

    /// Write items to the store and create a media file for each.
    pub fn seed(&self, items: &[WorkItem]) {
        for item in items {
            fixtures::media_file(&self.media_dir(), &item.file_name);
        }
        self.repository().save(items).expect("Failed to seed store");
    }

    pub fn stored(&self) -> Vec<WorkItem> {
        self.repository().load().expect("Failed to load store")
    }

    /// Send a GET request to the test router.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// Which optional services the fixture wires in.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub with_hosting: bool,
    pub with_generation: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            with_hosting: true,
            with_generation: true,
        }
    }
}

impl TestConfig {
    /// No hosting or generation service configured.
    pub fn bare() -> Self {
        Self {
            with_hosting: false,
            with_generation: false,
        }
    }
}
