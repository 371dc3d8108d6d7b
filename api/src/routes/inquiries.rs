//! Inquiry and email endpoints (/inquiries, /send-email)

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{error, info};

use crate::AppState;
use crate::domain::inquiries::{self, Inquiry, NewInquiry, SubmitError};
use crate::services::email::EmailMessage;
use crate::services::error::ApiError;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/inquiries", post(create_inquiry))
        .route("/send-email", post(send_email))
}

/// POST /inquiries - Validate, store, then notify sales
async fn create_inquiry(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewInquiry>,
) -> Result<(StatusCode, Json<Inquiry>), ApiError> {
    let stored = inquiries::submit_inquiry(&state.db, &state.email, &state.inquiry_notify_email, body)
        .await
        .map_err(|e| match e {
            SubmitError::Invalid(invalid) => ApiError::bad_request(invalid),
            SubmitError::Store(source) => {
                error!("Insert inquiry error: {}", source);
                ApiError::from(StatusCode::INTERNAL_SERVER_ERROR)
            }
        })?;

    Ok((StatusCode::CREATED, Json(stored)))
}

/// POST /send-email - Accepts a message and only logs it
async fn send_email(Json(message): Json<EmailMessage>) -> Json<Value> {
    info!(to = %message.to, subject = %message.subject, "Email requested");
    Json(json!({ "success": true }))
}
