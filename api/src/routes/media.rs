//! Locally stored screen images (/media/*)

use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use std::sync::Arc;

use crate::AppState;
use crate::constants::MEDIA_CACHE_CONTROL;
use crate::services::error::LogErr;
use crate::storage;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/media/{*path}", get(serve_media))
}

/// GET /media/*path - Serve an uploaded image when storage is local
async fn serve_media(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    // Reject traversal attempts and null bytes upfront
    if path.contains("..") || path.contains('\0') {
        return Err(StatusCode::FORBIDDEN);
    }

    let root = state.storage.local_root().ok_or(StatusCode::NOT_FOUND)?;

    // canonicalize() resolves symlinks; the result must stay under the root
    let canonical = root
        .join(&path)
        .canonicalize()
        .map_err(|_| StatusCode::NOT_FOUND)?;
    let root_canonical = root
        .canonicalize()
        .log_500("Failed to canonicalize storage path")?;

    if !canonical.starts_with(&root_canonical) {
        return Err(StatusCode::FORBIDDEN);
    }

    let bytes = tokio::fs::read(&canonical)
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;

    let content_type = storage::content_type_for(canonical.extension().and_then(|e| e.to_str()));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, MEDIA_CACHE_CONTROL),
        ],
        bytes,
    ))
}
