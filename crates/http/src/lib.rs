//! HTTP API layer for the read-only PyPI Simple index: content negotiation,
//! conditional requests, the JSON/HTML renderers, and the route handlers
//! that wire them to the index store.

pub mod error;
pub mod etag;
pub mod files;
pub mod negotiation;
pub mod query;
pub mod render;
pub mod routes;

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use simple_index_store::Store;

/// Shared state handed to every handler. Cheaply `Clone`-able — every field
/// is an `Arc` or a small owned value.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub files_dir: PathBuf,
    pub cache_dir: PathBuf,
    /// URL prefix archives are exposed at (e.g. `/files`). Stored without a
    /// trailing slash.
    pub files_url: String,
    /// Guards `/reload` reentrancy: at most one scan runs at a time.
    pub scanning: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(store: Arc<Store>, files_dir: PathBuf, cache_dir: PathBuf, files_url: String) -> Self {
        AppState {
            store,
            files_dir,
            cache_dir,
            files_url: files_url.trim_end_matches('/').to_string(),
            scanning: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Build the full router: the four `/simple/` variants, `/files/...` raw +
/// sidecar serving, `/ping`, and `/reload`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/simple/", get(routes::root_project_list))
        .route("/simple/{project}/", get(routes::root_project_detail))
        .route("/{index}/simple/", get(routes::index_project_list))
        .route(
            "/{index}/simple/{project}/",
            get(routes::index_project_detail),
        )
        .route("/files/{*path}", get(files::serve_file))
        .route("/ping", get(routes::ping))
        .route("/reload", get(routes::reload).post(routes::reload))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
