pub mod admin;
pub mod auth;
pub mod clip_requirements;
pub mod inquiries;
pub mod media;
pub mod pages;
pub mod screens;

use axum::Router;
use std::sync::Arc;

use crate::AppState;

/// Build all routes for the API
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(admin::routes())
        .merge(auth::routes())
        .merge(clip_requirements::routes())
        .merge(inquiries::routes())
        .merge(media::routes())
        .merge(pages::routes())
        .merge(screens::routes())
}
