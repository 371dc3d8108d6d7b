pub mod cookies;
pub mod email;
pub mod error;
pub mod local_storage;
pub mod session;
