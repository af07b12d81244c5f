//! Raw archive and `.metadata` sidecar serving. The two routes share one
//! path shape (`/files/{path…}` vs. `/files/{path…}.metadata`) so they're
//! dispatched from a single handler by suffix — two `ServeDir`s on
//! overlapping prefixes can't express the suffix distinction declaratively.

use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::extract::{Path as AxumPath, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio_util::io::ReaderStream;

use crate::AppState;

/// Reject absolute paths and `..` components — the request path is attacker
/// controlled, the filesystem root is not.
fn safe_join(root: &Path, rel: &str) -> Option<PathBuf> {
    let mut out = root.to_path_buf();
    for component in rel.split('/') {
        match component {
            "" | "." => continue,
            ".." => return None,
            other => out.push(other),
        }
    }
    Some(out)
}

pub async fn serve_file(
    State(state): State<AppState>,
    AxumPath(rel_path): AxumPath<String>,
) -> Response {
    if let Some(stripped) = rel_path.strip_suffix(".metadata") {
        return serve_sidecar(&state, stripped, &rel_path).await;
    }
    serve_archive(&state, &rel_path).await
}

async fn serve_archive(state: &AppState, rel_path: &str) -> Response {
    let Some(path) = safe_join(&state.files_dir, rel_path) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Ok(file) = tokio::fs::File::open(&path).await else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let len = file.metadata().await.ok().map(|m| m.len());
    let stream = ReaderStream::new(file);
    let mut response = Response::builder()
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .body(Body::from_stream(stream))
        .unwrap();
    if let Some(len) = len {
        response
            .headers_mut()
            .insert(header::CONTENT_LENGTH, len.into());
    }
    response
}

async fn serve_sidecar(state: &AppState, rel_without_suffix: &str, full_name: &str) -> Response {
    let Some(path) = safe_join(&state.cache_dir, &format!("{rel_without_suffix}.metadata")) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Ok(bytes) = tokio::fs::read(&path).await else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let filename = full_name.rsplit('/').next().unwrap_or(full_name);
    Response::builder()
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={filename}"),
        )
        .body(Body::from(bytes))
        .unwrap()
}
