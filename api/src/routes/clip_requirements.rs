//! Clip requirement table endpoints (/clip-requirements, /admin/clip-requirements/*)

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use std::sync::Arc;
use tracing::{error, info};

use crate::AppState;
use crate::domain::clip_requirements::{ClipRequirement, ClipRequirementError};
use crate::services::error::ApiError;
use super::auth::AdminSession;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/clip-requirements", get(list_public))
        .route(
            "/admin/clip-requirements",
            get(list_admin).put(replace_all).post(add_row),
        )
        .route("/admin/clip-requirements/reset", post(reset))
        .route(
            "/admin/clip-requirements/{index}",
            put(update_row).delete(remove_row),
        )
}

type Rows = Json<Vec<ClipRequirement>>;

fn into_api_error(e: ClipRequirementError) -> ApiError {
    match e {
        ClipRequirementError::NotFound(_) => ApiError::from(StatusCode::NOT_FOUND),
        other => {
            error!("Clip requirements write error: {}", other);
            ApiError::from(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /clip-requirements - Creative specifications page
async fn list_public(State(state): State<Arc<AppState>>) -> Rows {
    Json(state.clips.load())
}

/// GET /admin/clip-requirements
async fn list_admin(State(state): State<Arc<AppState>>, _session: AdminSession) -> Rows {
    Json(state.clips.load())
}

/// PUT /admin/clip-requirements - Replace the whole table
async fn replace_all(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Json(rows): Json<Vec<ClipRequirement>>,
) -> Result<Rows, ApiError> {
    let rows = state.clips.replace(rows).map_err(into_api_error)?;
    info!(rows = rows.len(), "Clip requirements replaced");
    Ok(Json(rows))
}

/// POST /admin/clip-requirements - Append a row
async fn add_row(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Json(row): Json<ClipRequirement>,
) -> Result<(StatusCode, Rows), ApiError> {
    let rows = state.clips.add(row).map_err(into_api_error)?;
    Ok((StatusCode::CREATED, Json(rows)))
}

/// PUT /admin/clip-requirements/{index}
async fn update_row(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Path(index): Path<usize>,
    Json(row): Json<ClipRequirement>,
) -> Result<Rows, ApiError> {
    let rows = state.clips.update(index, row).map_err(into_api_error)?;
    Ok(Json(rows))
}

/// DELETE /admin/clip-requirements/{index}
async fn remove_row(
    State(state): State<Arc<AppState>>,
    _session: AdminSession,
    Path(index): Path<usize>,
) -> Result<Rows, ApiError> {
    let rows = state.clips.remove(index).map_err(into_api_error)?;
    Ok(Json(rows))
}

/// POST /admin/clip-requirements/reset - Back to the 14 default rows
async fn reset(State(state): State<Arc<AppState>>, _session: AdminSession) -> Result<Rows, ApiError> {
    let rows = state.clips.reset().map_err(into_api_error)?;
    info!("Clip requirements reset to defaults");
    Ok(Json(rows))
}
