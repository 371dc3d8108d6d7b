//! Admin session management: password gate and JWT session tokens

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

/// Subject claim carried by every admin session
const ADMIN_SUBJECT: &str = "admin";

/// JWT claims for admin session tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64, // expiry timestamp
    pub iat: i64, // issued at
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    Expired,
}

pub fn password_digest(password: &str) -> [u8; 32] {
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&Sha256::digest(password.as_bytes()));
    digest
}

/// Compare a candidate password against the stored digest without
/// short-circuiting on the first differing byte
pub fn verify_password(candidate: &str, expected: &[u8; 32]) -> bool {
    let digest = password_digest(candidate);
    digest
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Create a session token valid for `ttl`. Returns the token and its expiry.
pub fn create_admin_token(secret: &[u8], ttl: Duration) -> Result<(String, DateTime<Utc>), SessionError> {
    let now = Utc::now();
    let expires_at = now + ttl;

    let claims = Claims {
        sub: ADMIN_SUBJECT.to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
        .map_err(|_| SessionError::InvalidToken)?;

    Ok((token, expires_at))
}

/// Validate a session token and return its expiry
pub fn validate_admin_token(token: &str, secret: &[u8]) -> Result<DateTime<Utc>, SessionError> {
    // HS256 only; reject tokens signed with anything else
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp", "sub", "iat"]);
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation).map_err(|e| {
        debug!("JWT decode error: {:?}", e);
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
            _ => SessionError::InvalidToken,
        }
    })?;

    if token_data.claims.sub != ADMIN_SUBJECT {
        return Err(SessionError::InvalidToken);
    }

    DateTime::from_timestamp(token_data.claims.exp, 0).ok_or(SessionError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";

    #[test]
    fn password_check() {
        let expected = password_digest("ekranai2026");
        assert!(verify_password("ekranai2026", &expected));
        assert!(!verify_password("ekranai2025", &expected));
        assert!(!verify_password("", &expected));
    }

    #[test]
    fn token_round_trip() {
        let (token, expires_at) = create_admin_token(SECRET, Duration::hours(24)).expect("token");
        let validated = validate_admin_token(&token, SECRET).expect("valid token");
        assert_eq!(validated.timestamp(), expires_at.timestamp());
    }

    #[test]
    fn expired_token_is_rejected() {
        let (token, _) = create_admin_token(SECRET, Duration::hours(-1)).expect("token");
        assert_eq!(validate_admin_token(&token, SECRET), Err(SessionError::Expired));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let (token, _) = create_admin_token(SECRET, Duration::hours(1)).expect("token");
        assert_eq!(
            validate_admin_token(&token, b"other-secret"),
            Err(SessionError::InvalidToken)
        );
        assert_eq!(validate_admin_token("garbage", SECRET), Err(SessionError::InvalidToken));
    }
}
