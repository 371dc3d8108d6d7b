//! Public map endpoints (/screens/*)

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;

use crate::AppState;
use crate::domain::screens::{
    self as screens_domain, ALL_CITIES_TOKEN, CityFilter, REGIONS_TOKEN, Screen,
};
use crate::map::markers::{Marker, MarkerLayer};
use crate::map::routing::{DeepLink, HashRoute};
use crate::map::selection::Selection;
use crate::services::error::{ApiError, LogErr};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/screens", get(list_screens))
        .route("/screens/cities", get(list_cities))
        .route("/screens/markers", get(list_markers))
        .route("/screens/resolve", get(resolve_hash))
}

#[derive(Debug, Deserialize)]
struct CityQuery {
    city: Option<String>,
}

async fn load_active(state: &AppState) -> Result<Vec<Screen>, ApiError> {
    let screens = screens_domain::list_active_screens(&state.db)
        .await
        .log_500("List active screens error")?;
    Ok(screens)
}

/// GET /screens?city= - Active screens, ordered by city
async fn list_screens(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CityQuery>,
) -> Result<Json<Vec<Screen>>, ApiError> {
    let filter = CityFilter::parse(query.city.as_deref());
    let screens = load_active(&state).await?;
    Ok(Json(screens_domain::filter_screens(screens, &filter)))
}

/// GET /screens/cities - City picker options, special tokens first
async fn list_cities(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, ApiError> {
    let cities = screens_domain::list_active_cities(&state.db)
        .await
        .log_500("List cities error")?;

    let mut options = vec![ALL_CITIES_TOKEN.to_string(), REGIONS_TOKEN.to_string()];
    options.extend(cities);
    Ok(Json(options))
}

#[derive(Debug, Deserialize)]
struct MarkerQuery {
    city: Option<String>,
    /// Comma separated screen names
    selected: Option<String>,
    today: Option<NaiveDate>,
}

fn selected_names(raw: Option<&str>) -> Vec<&str> {
    raw.map(|s| s.split(',').map(str::trim).filter(|n| !n.is_empty()).collect())
        .unwrap_or_default()
}

/// GET /screens/markers?city=&selected=a,b&today= - Marker specs for the map
async fn list_markers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MarkerQuery>,
) -> Result<Json<Vec<Marker>>, ApiError> {
    let filter = CityFilter::parse(query.city.as_deref());
    let screens = screens_domain::filter_screens(load_active(&state).await?, &filter);

    let wanted = selected_names(query.selected.as_deref());
    let selection: Selection = screens
        .iter()
        .filter(|s| wanted.contains(&s.name.as_str()))
        .map(|s| (s.name.as_str(), s.city.as_str()))
        .collect();

    let today = query.today.unwrap_or_else(|| Utc::now().date_naive());
    let layer = MarkerLayer::build(&screens, &selection, today);
    Ok(Json(layer.into_markers()))
}

#[derive(Debug, Deserialize)]
struct ResolveQuery {
    hash: String,
}

/// GET /screens/resolve?hash= - City, screen, popup marker and popup delay
/// for a `#city/screen` deep link
async fn resolve_hash(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<DeepLink>, ApiError> {
    let route = HashRoute::parse(&query.hash).ok_or(StatusCode::NOT_FOUND)?;
    let screens = load_active(&state).await?;
    let resolved = route.resolve(&screens).ok_or(StatusCode::NOT_FOUND)?;

    let visible = screens_domain::filter_screens(screens, &CityFilter::parse(Some(&resolved.city)));
    let layer = MarkerLayer::build(&visible, &Selection::default(), Utc::now().date_naive());
    Ok(Json(DeepLink::new(resolved, &layer)))
}
