//! Cookie building utilities for the admin session
//!
//! Centralizes cookie formatting so login and logout stay consistent.

use axum::http::{HeaderValue, StatusCode};
use std::{fmt, str::FromStr};
use tracing::error;

/// Cookie configuration constants
pub mod config {
    /// Admin session cookie name
    pub const SESSION_COOKIE_NAME: &str = "admin_session";
    /// Path for the session cookie (all routes)
    pub const SESSION_COOKIE_PATH: &str = "/";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Lax,
    Strict,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SameSite::Lax => "Lax",
            SameSite::Strict => "Strict",
            SameSite::None => "None",
        })
    }
}

impl FromStr for SameSite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            "none" => Ok(SameSite::None),
            _ => Err("expected Lax, Strict or None".to_string()),
        }
    }
}

/// Attributes shared by every session Set-Cookie the server emits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieSettings {
    pub secure: bool,
    pub same_site: SameSite,
}

impl CookieSettings {
    fn header(&self, value: &str, max_age_secs: i64) -> String {
        let secure = if self.secure { " Secure;" } else { "" };
        format!(
            "{}={}; HttpOnly;{} SameSite={}; Path={}; Max-Age={}",
            config::SESSION_COOKIE_NAME,
            value,
            secure,
            self.same_site,
            config::SESSION_COOKIE_PATH,
            max_age_secs.max(0)
        )
    }

    /// Build the session Set-Cookie header value
    pub fn session_cookie(&self, token: &str, max_age_secs: i64) -> Result<HeaderValue, StatusCode> {
        self.header(token, max_age_secs).parse().map_err(|_| {
            error!("Failed to parse session cookie header");
            StatusCode::INTERNAL_SERVER_ERROR
        })
    }

    /// Build a Set-Cookie header to clear the session
    pub fn clear_session_cookie(&self) -> Result<HeaderValue, StatusCode> {
        self.header("", 0).parse().map_err(|_| {
            error!("Failed to parse clear-session cookie header");
            StatusCode::INTERNAL_SERVER_ERROR
        })
    }
}
