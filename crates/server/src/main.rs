use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skyforge_core::{
    load_config, validate_config, ArtifactFetcher, Config, FsArchiver, GenerationService,
    HostingService, HttpArtifactFetcher, HttpGenerationClient, HttpHostingClient,
    ItemRepository, JsonFileRepository, OrchestratorConfig, Reconciler, SchedulingOrchestrator,
    SlotAllocator, TaskMatcher,
};
use skyforge_server::{api::create_router, state::AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("SKYFORGE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        version = VERSION,
        config_hash = &config_hash[..16],
        store = ?config.store.path,
        media_dir = ?config.store.media_dir,
        "Configuration loaded"
    );

    let state = Arc::new(build_state(config.clone())?);
    let app = create_router(state);

    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

/// Wire every component from configuration.
fn build_state(config: Config) -> Result<AppState> {
    let repository: Arc<dyn ItemRepository> =
        Arc::new(JsonFileRepository::new(config.store.path.clone()));

    let allocator =
        SlotAllocator::from_config(&config.schedule).context("Invalid schedule slots")?;

    let hosting: Option<Arc<dyn HostingService>> = match &config.hosting {
        Some(hosting_config) => {
            info!("Initializing hosting client at {}", hosting_config.api_base);
            Some(Arc::new(
                HttpHostingClient::new(hosting_config.clone())
                    .context("Failed to create hosting client")?,
            ))
        }
        None => {
            warn!("No hosting service configured, scheduling runs are disabled");
            None
        }
    };

    let orchestrator = SchedulingOrchestrator::new(
        OrchestratorConfig::from(&config),
        allocator,
        Arc::clone(&repository),
        hosting,
        Arc::new(FsArchiver::new(config.store.archive_dir.clone())),
    );

    let reconciler = match &config.generation {
        Some(generation_config) => {
            info!("Initializing generation client at {}", generation_config.base_url);
            let generation: Arc<dyn GenerationService> = Arc::new(
                HttpGenerationClient::new(generation_config.clone())
                    .context("Failed to create generation client")?,
            );
            let fetcher: Arc<dyn ArtifactFetcher> = Arc::new(
                HttpArtifactFetcher::new(config.fetcher.clone())
                    .context("Failed to create artifact fetcher")?,
            );
            let matcher =
                TaskMatcher::new(config.matcher.clone()).context("Invalid matcher config")?;
            Some(Reconciler::new(
                generation,
                matcher,
                fetcher,
                Arc::clone(&repository),
                config.store.media_dir.clone(),
            ))
        }
        None => {
            info!("No generation service configured");
            None
        }
    };

    Ok(AppState::new(config, orchestrator, reconciler))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
