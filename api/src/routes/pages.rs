//! Static page data: pricing, quote calculator, FAQ, health

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::AppState;
use crate::content::{FAQ, FaqEntry};
use crate::pricing::{self, PriceList, Quote, QuoteRequest};
use crate::services::error::ApiError;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/pricing", get(get_pricing))
        .route("/pricing/quote", post(get_quote))
        .route("/faq", get(get_faq))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn get_pricing() -> Json<PriceList> {
    Json(pricing::price_list())
}

/// POST /pricing/quote - rate x screens x weeks
async fn get_quote(Json(req): Json<QuoteRequest>) -> Result<Json<Quote>, ApiError> {
    let quote = pricing::quote(&req).map_err(ApiError::bad_request)?;
    Ok(Json(quote))
}

async fn get_faq() -> Json<&'static [FaqEntry]> {
    Json(FAQ)
}
