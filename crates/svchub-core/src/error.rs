//! Error taxonomy shared across the workspace
//!
//! Store-level failures are signaled as typed variants and translated to
//! HTTP responses at the gateway boundary. Messages are safe to echo to
//! callers; I/O detail stays server-side.

use thiserror::Error;

/// Result type for store and domain operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("username already exists")]
    DuplicateUsername,

    #[error("user not found")]
    UserNotFound,

    #[error("current password is incorrect")]
    WrongPassword,

    #[error("a pending registration request already exists for this username")]
    DuplicatePendingRequest,

    #[error("registration request not found")]
    RequestNotFound,

    #[error("registration request already processed")]
    AlreadyProcessed,

    #[error("service not found")]
    ServiceNotFound,

    #[error("document not found")]
    DocNotFound,

    #[error("asset path escapes the service directory")]
    PathTraversal,

    #[error("{0}")]
    Validation(String),

    #[error("password hashing failed")]
    PasswordHash,

    #[error("storage failure")]
    Io(#[from] std::io::Error),

    #[error("storage failure")]
    Persist(#[from] serde_json::Error),
}
