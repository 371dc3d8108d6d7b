//! Application constants

/// Maximum upload size for screen images (10 MB)
pub const MAX_IMAGE_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Database pool size
pub const DB_MAX_CONNECTIONS: u32 = 5;

/// Login attempts allowed in a burst per client IP
pub const LOGIN_BURST_SIZE: u32 = 10;

/// Seconds between login token refills per client IP
pub const LOGIN_REFILL_SECS: u64 = 6;

/// Uploaded media paths embed a timestamp, so responses never change
pub const MEDIA_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";
