//! Back office for an LED advertising screen network.
//!
//! The HTTP surface lives in [`routes`]. The map page model (marker layout,
//! selection, deep links and the inquiry draft) is public so a front end or
//! another service can drive it directly:
//!
//! - [`map::markers`] turns screens into marker specs and opens popups through
//!   an injected [`map::markers::MapController`]
//! - [`map::selection`] is the ordered set of picked screens
//! - [`map::routing`] parses `#city/screen` links and schedules the popup
//! - [`domain::inquiries::InquiryDraft`] validates the form before anything is sent

pub mod config;
pub mod constants;
pub mod content;
pub mod domain;
pub mod map;
pub mod pricing;
pub mod routes;
pub mod services;
pub mod storage;

use sqlx::PgPool;

use domain::clip_requirements::ClipRequirementStore;
use services::cookies::CookieSettings;
use services::email::EmailClient;
use storage::ObjectStorage;

pub struct AppState {
    pub db: PgPool,
    pub jwt_secret: Vec<u8>,
    pub admin_password_digest: [u8; 32],
    pub session_ttl: chrono::Duration,
    pub cookies: CookieSettings,
    pub storage: ObjectStorage,
    pub clips: ClipRequirementStore,
    pub email: EmailClient,
    pub inquiry_notify_email: String,
}
