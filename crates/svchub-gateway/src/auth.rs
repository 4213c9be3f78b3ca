//! Request authentication extractors
//!
//! Credentials arrive as `Authorization: Bearer <token>` or as a `token`
//! cookie; absence of both, or a failed verification, is 401 before any
//! handler logic runs. Access evaluation (403) is a separate, later step.

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};
use tracing::debug;

use svchub_core::SessionIdentity;

use crate::error::ApiError;
use crate::server::AppState;

/// Cookie the login endpoint sets alongside the JSON token
pub const TOKEN_COOKIE: &str = "token";

/// Verified caller identity.
pub struct AuthIdentity(pub SessionIdentity);

/// Verified caller identity holding the `admin` role.
pub struct AdminIdentity(pub SessionIdentity);

fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie = headers.get(header::COOKIE)?;
    let s = cookie.to_str().ok()?;
    for part in s.split(';') {
        let p = part.trim();
        if let Some(eq) = p.find('=') {
            let (k, v) = p.split_at(eq);
            if k == name {
                return Some(v[1..].to_string());
            }
        }
    }
    None
}

/// Pull the bearer token from the Authorization header, falling back to
/// the session cookie.
fn extract_token(parts: &Parts) -> Option<String> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    match auth_header {
        Some(header) if header.starts_with("Bearer ") => {
            header.strip_prefix("Bearer ").map(str::to_string)
        }
        _ => parse_cookie(&parts.headers, TOKEN_COOKIE),
    }
}

impl FromRequestParts<AppState> for AuthIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts).ok_or_else(ApiError::unauthenticated)?;
        let identity = state.tokens.verify(&token).map_err(|e| {
            debug!("[auth] token rejected: {e}");
            ApiError::unauthenticated()
        })?;
        Ok(Self(identity))
    }
}

impl FromRequestParts<AppState> for AdminIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthIdentity(identity) = AuthIdentity::from_request_parts(parts, state).await?;
        if !identity.is_admin() {
            return Err(ApiError::forbidden("administrator role required"));
        }
        Ok(Self(identity))
    }
}
