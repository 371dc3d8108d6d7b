//! Admin password gate and session endpoints

use axum::{
    Json, Router,
    extract::{FromRequestParts, State},
    http::{StatusCode, header::SET_COOKIE, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};
use tracing::{info, warn};

use crate::AppState;
use crate::constants::{LOGIN_BURST_SIZE, LOGIN_REFILL_SECS};
use crate::services::{cookies, error::LogErr, session};

pub fn routes() -> Router<Arc<AppState>> {
    // Brute force guard, per client IP, on the password check only
    let rate_limit_config = GovernorConfigBuilder::default()
        .per_second(LOGIN_REFILL_SECS)
        .burst_size(LOGIN_BURST_SIZE)
        .key_extractor(SmartIpKeyExtractor)
        .finish()
        .expect("Failed to build rate limit config");

    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config.into(),
    };

    let login = Router::new()
        .route("/admin/login", post(login))
        .layer(rate_limit_layer);

    Router::new()
        .merge(login)
        .route("/admin/logout", post(logout))
        .route("/admin/session", get(get_session))
}

// ============================================================================
// Session extractor
// ============================================================================

/// Extractor that requires a valid `admin_session` cookie.
/// Holds the session expiry.
pub struct AdminSession(pub DateTime<Utc>);

impl FromRequestParts<Arc<AppState>> for AdminSession {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .log_500("Cookie extraction error")?;

        let token = jar
            .get(cookies::config::SESSION_COOKIE_NAME)
            .map(|c| c.value())
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let expires_at = session::validate_admin_token(token, &state.jwt_secret)
            .log_status("Admin session rejected", StatusCode::UNAUTHORIZED)?;

        Ok(AdminSession(expires_at))
    }
}

// ============================================================================
// Endpoints
// ============================================================================

#[derive(Deserialize)]
struct LoginRequest {
    password: String,
}

#[derive(Serialize)]
struct SessionResponse {
    expires_at: DateTime<Utc>,
}

/// POST /admin/login - Check the password and start a session
async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, StatusCode> {
    if !session::verify_password(&req.password, &state.admin_password_digest) {
        warn!("Admin login failed: wrong password");
        return Err(StatusCode::UNAUTHORIZED);
    }

    let (token, expires_at) = session::create_admin_token(&state.jwt_secret, state.session_ttl)
        .log_500("Failed to create admin token")?;
    let cookie = state
        .cookies
        .session_cookie(&token, state.session_ttl.num_seconds())?;

    info!(%expires_at, "Admin session started");

    let mut response = Json(SessionResponse { expires_at }).into_response();
    response.headers_mut().append(SET_COOKIE, cookie);
    Ok(response)
}

/// POST /admin/logout - Clear the session cookie
async fn logout(State(state): State<Arc<AppState>>) -> Result<Response, StatusCode> {
    let cookie = state.cookies.clear_session_cookie()?;
    let mut response = StatusCode::NO_CONTENT.into_response();
    response.headers_mut().append(SET_COOKIE, cookie);
    Ok(response)
}

/// GET /admin/session - Current session expiry (validates the cookie)
async fn get_session(AdminSession(expires_at): AdminSession) -> Json<SessionResponse> {
    Json(SessionResponse { expires_at })
}
