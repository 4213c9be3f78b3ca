//! API error responses
//!
//! One error shape for every handler: a status code plus a JSON
//! `{"message": ...}` body. Store failures arrive as typed
//! `svchub_core::Error` values and are mapped here; I/O detail is logged
//! server-side and never echoed to the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use tracing::error;

use crate::token::TokenError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthenticated() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "missing or invalid credentials")
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

impl From<svchub_core::Error> for ApiError {
    fn from(err: svchub_core::Error) -> Self {
        use svchub_core::Error::*;
        match &err {
            DuplicateUsername
            | WrongPassword
            | DuplicatePendingRequest
            | AlreadyProcessed
            | PathTraversal
            | Validation(_) => Self::bad_request(err.to_string()),
            UserNotFound | ServiceNotFound | RequestNotFound | DocNotFound => {
                Self::not_found(err.to_string())
            }
            PasswordHash | Io(_) | Persist(_) => {
                error!("[gateway] internal failure: {err:?}");
                Self::internal()
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(_: TokenError) -> Self {
        Self::unauthenticated()
    }
}
