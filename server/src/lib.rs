//! `pyps` — library crate backing the CLI binary of the same name: opens
//! the index store, runs a scan, and serves the Simple-API router. `main.rs`
//! is a thin CLI shell over this crate.

pub mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info};

use simple_index_http::{router, AppState};
use simple_index_store::Store;

pub use config::Config;

/// Open the store, run the startup scan, bind the listener and serve until
/// shutdown. Returns the process exit code: `0` normal, non-zero on failure
/// to bind or to open the configured directories.
pub async fn serve(config: Config) -> i32 {
    let store = match Store::open(&config.cache_dir) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!(cache_dir = %config.cache_dir.display(), error = %e, "failed to open index store");
            return 1;
        }
    };

    info!(files_dir = %config.files_dir.display(), "running startup scan");
    let summary = store.scan(&config.files_dir, &config.cache_dir);
    info!(
        visited = summary.visited,
        inserted = summary.inserted,
        skipped_existing = summary.skipped_existing,
        skipped_invalid = summary.skipped_invalid,
        "startup scan complete"
    );

    let state = AppState::new(
        store,
        config.files_dir.clone(),
        config.cache_dir.clone(),
        config.files_url.clone(),
    );
    let app = router(state);

    let addr: SocketAddr = match format!("{}:{}", config.bind_host(), config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(error = %e, "invalid bind address");
            return 1;
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "failed to bind listener");
            return 1;
        }
    };

    info!(%addr, "pyps listening");
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "server error");
        return 1;
    }
    0
}

/// One-shot scan without starting the server — the `scan` CLI subcommand:
/// runs a task and prints a summary instead of serving HTTP.
pub fn run_scan(config: &Config) -> i32 {
    let store = match Store::open(&config.cache_dir) {
        Ok(store) => store,
        Err(e) => {
            error!(cache_dir = %config.cache_dir.display(), error = %e, "failed to open index store");
            return 1;
        }
    };

    let summary = store.scan(&config.files_dir, &config.cache_dir);
    let stats = store.stats().unwrap_or_default();

    println!(
        "scanned {} file(s): {} inserted, {} already indexed, {} invalid",
        summary.visited, summary.inserted, summary.skipped_existing, summary.skipped_invalid
    );
    println!(
        "store now holds {} distribution(s) across {} project(s) and {} index(es)",
        stats.distributions, stats.projects, stats.indexes
    );
    0
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to register SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
