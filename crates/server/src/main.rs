use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use animelog_core::{
    create_coordinator, load_config, validate_config, HttpPlanningSource, KvStore,
    PlanningStore, PlanningSync, RetryPolicy, SqliteKvStore, TrackerState,
};
use animelog_server::{api::create_router, state::AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Buffer size for the coordinator command channel
const COMMAND_BUFFER_SIZE: usize = 256;

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
    let config_path = std::env::var("ANIMELOG_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    let config_json = serde_json::to_string(&config).context("Failed to serialize config")?;
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        version = VERSION,
        config_hash = &config_hash[..16],
        "Configuration loaded successfully"
    );
    info!("Database path: {:?}", config.database.path);

    // Open the key-value store
    let store: Arc<dyn KvStore> = Arc::new(
        SqliteKvStore::new(&config.database.path).context("Failed to open key-value store")?,
    );
    info!("Key-value store initialized");

    // Load tracking state and start the single writer
    let state = TrackerState::load(store.as_ref(), config.history)
        .context("Failed to load tracking state")?;
    let retry = RetryPolicy::from(config.persistence);
    let (coordinator, writer) =
        create_coordinator(state, Arc::clone(&store), retry, COMMAND_BUFFER_SIZE);
    let writer_handle = tokio::spawn(writer.run());

    let planning_store = Arc::new(PlanningStore::new(Arc::clone(&store), retry));

    // Start planning refresh if configured
    let planning_sync = match (config.planning.enabled, &config.planning.source_url) {
        (true, Some(url)) => {
            let source = HttpPlanningSource::new(
                url.clone(),
                Duration::from_secs(config.planning.timeout_secs),
            )
            .context("Failed to create planning source")?;
            let sync = PlanningSync::new(
                Arc::new(source),
                Arc::clone(&planning_store),
                &config.planning,
            );
            sync.start();
            info!("Planning refresh enabled from {}", url);
            Some(sync)
        }
        _ => {
            info!("Planning refresh disabled");
            None
        }
    };

    // Build router
    let addr = SocketAddr::new(config.server.host, config.server.port);
    let app_state = Arc::new(AppState::new(config, coordinator, planning_store));
    let app = create_router(Arc::clone(&app_state));

    // Start server
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped, shutting down");

    if let Some(sync) = planning_sync {
        sync.stop();
    }

    // Dropping the last handle lets the writer flush and exit
    drop(app_state);
    if let Err(e) = writer_handle.await {
        warn!("Coordinator task ended abnormally: {}", e);
    }

    info!("Shutdown complete");
    Ok(())
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
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
}
