//! Route handlers: wires content negotiation, the ETag layer and the query
//! engine together — negotiate a representation, evaluate conditional
//! headers, run the query, then render.

use std::sync::atomic::Ordering;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::info;

use simple_index_core::canonicalize_name;

use crate::error::ApiError;
use crate::etag::{self, Precondition};
use crate::negotiation::{negotiate, Representation};
use crate::query;
use crate::render;
use crate::AppState;

/// Evaluate conditional headers against the store's current revision and
/// build the response's `ETag` header value. Returns `Err` with the
/// terminal 304/412 response when the request short-circuits.
fn check_conditional(state: &AppState, headers: &HeaderMap) -> Result<String, Response> {
    let revision = state.store.revision().unwrap_or(0);
    let etag = etag::render(revision);
    match etag::evaluate(headers, &etag) {
        Precondition::Proceed => Ok(etag),
        Precondition::NotModified => {
            let mut resp = StatusCode::NOT_MODIFIED.into_response();
            resp.headers_mut().insert("ETag", etag.parse().unwrap());
            Err(resp)
        }
        Precondition::PreconditionFailed => {
            let mut resp = StatusCode::PRECONDITION_FAILED.into_response();
            resp.headers_mut().insert("ETag", etag.parse().unwrap());
            Err(resp)
        }
    }
}

fn render_response(representation: Representation, etag: String, body: String) -> Response {
    let mut response = Response::builder()
        .header("Content-Type", representation.content_type())
        .body(axum::body::Body::from(body))
        .unwrap();
    response.headers_mut().insert("ETag", etag.parse().unwrap());
    response
}

async fn project_list(state: AppState, headers: HeaderMap, index: &str) -> Response {
    let representation = match negotiate(headers.get("accept").and_then(|v| v.to_str().ok())) {
        Ok(r) => r,
        Err(e) => return e.into_response(),
    };
    let etag = match check_conditional(&state, &headers) {
        Ok(e) => e,
        Err(resp) => return resp,
    };

    let list = match query::get_project_list(&state.store, index) {
        Ok(list) => list,
        Err(e) => return e.into_response(),
    };
    if list.projects.is_empty() {
        return ApiError::NotFound.into_response();
    }

    let body = match representation {
        Representation::Json => render::project_list_json(&list),
        Representation::Html => render::project_list_html(&list),
    };
    render_response(representation, etag, body)
}

async fn project_detail(state: AppState, headers: HeaderMap, index: &str, project: &str) -> Response {
    let canonical = canonicalize_name(project);
    if canonical != project {
        let location = if index.is_empty() {
            format!("/simple/{canonical}/")
        } else {
            format!("/{index}/simple/{canonical}/")
        };
        return (
            StatusCode::MOVED_PERMANENTLY,
            [("Location", location)],
        )
            .into_response();
    }

    let representation = match negotiate(headers.get("accept").and_then(|v| v.to_str().ok())) {
        Ok(r) => r,
        Err(e) => return e.into_response(),
    };
    let etag = match check_conditional(&state, &headers) {
        Ok(e) => e,
        Err(resp) => return resp,
    };

    let detail = match query::get_project_detail(&state.store, index, &canonical, &state.files_url) {
        Ok(d) => d,
        Err(e) => return e.into_response(),
    };
    if detail.files.is_empty() {
        return ApiError::NotFound.into_response();
    }

    let body = match representation {
        Representation::Json => render::project_detail_json(&detail),
        Representation::Html => render::project_detail_html(&detail),
    };
    render_response(representation, etag, body)
}

pub async fn root_project_list(State(state): State<AppState>, headers: HeaderMap) -> Response {
    project_list(state, headers, "").await
}

pub async fn root_project_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(project): Path<String>,
) -> Response {
    project_detail(state, headers, "", &project).await
}

pub async fn index_project_list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(index): Path<String>,
) -> Response {
    project_list(state, headers, &index).await
}

pub async fn index_project_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((index, project)): Path<(String, String)>,
) -> Response {
    project_detail(state, headers, &index, &project).await
}

pub async fn ping() -> impl IntoResponse {
    StatusCode::OK
}

/// Trigger a scan. Spec.md §5's chosen reentrancy policy: a second
/// concurrent `/reload` returns `202 Accepted` with `{"status": "already
/// running"}` instead of waiting or erroring, guarded by a single
/// `AtomicBool` compare-exchange.
pub async fn reload(State(state): State<AppState>) -> Response {
    if state
        .scanning
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return (
            StatusCode::ACCEPTED,
            Json(json!({ "status": "already running" })),
        )
            .into_response();
    }

    let store = state.store.clone();
    let files_dir = state.files_dir.clone();
    let cache_dir = state.cache_dir.clone();
    let scanning = state.scanning.clone();

    let summary = tokio::task::spawn_blocking(move || {
        let summary = store.scan(&files_dir, &cache_dir);
        scanning.store(false, Ordering::SeqCst);
        summary
    })
    .await;

    match summary {
        Ok(summary) => {
            info!(
                visited = summary.visited,
                inserted = summary.inserted,
                skipped_existing = summary.skipped_existing,
                skipped_invalid = summary.skipped_invalid,
                "reload scan complete"
            );
            Json(json!({
                "status": "ok",
                "visited": summary.visited,
                "inserted": summary.inserted,
                "skipped_existing": summary.skipped_existing,
                "skipped_invalid": summary.skipped_invalid,
            }))
            .into_response()
        }
        Err(e) => {
            state.scanning.store(false, Ordering::SeqCst);
            ApiError::Internal(e.to_string()).into_response()
        }
    }
}
