//! Reverse-proxy dispatch
//!
//! Forwards `/{service_id}/api/...` to the service's upstream with the
//! gateway prefix rewritten to the service's `proxyRewrite` (default
//! `/api`). Method, headers, query, and body pass through; bodies are
//! streamed in both directions, never buffered. Dropping the client
//! connection drops this handler's future, which cancels the in-flight
//! upstream request.

use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::http::{header, HeaderName};
use axum::response::Response;
use tracing::{debug, warn};

use svchub_core::SessionIdentity;

use crate::access::ensure_access;
use crate::auth::AuthIdentity;
use crate::error::ApiError;
use crate::server::AppState;

/// Hop-by-hop headers, stripped in both directions. Framing headers are
/// included: the client re-frames the forwarded body itself.
const HOP_BY_HOP: &[HeaderName] = &[
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// `ANY /{service_id}/api`
pub async fn proxy_root(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    Path(service_id): Path<String>,
    req: Request,
) -> Result<Response, ApiError> {
    forward(state, identity, service_id, String::new(), req).await
}

/// `ANY /{service_id}/api/{*rest}`
pub async fn proxy_rest(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    Path((service_id, rest)): Path<(String, String)>,
    req: Request,
) -> Result<Response, ApiError> {
    forward(state, identity, service_id, rest, req).await
}

async fn forward(
    state: AppState,
    identity: SessionIdentity,
    service_id: String,
    rest: String,
    req: Request,
) -> Result<Response, ApiError> {
    let service = state
        .registry
        .get(&service_id)
        .await
        .ok_or_else(|| ApiError::not_found("service not found"))?;
    ensure_access(&identity, &service)?;

    // `${VAR}` substitution can leave an empty target; treat it as unset.
    let target = service
        .manifest
        .proxy_target
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or(&state.default_proxy_target);

    let mut path = service.proxy_rewrite().trim_end_matches('/').to_string();
    if !rest.is_empty() {
        path.push('/');
        path.push_str(&rest);
    }
    let mut url = format!("{}{}", target.trim_end_matches('/'), path);
    if let Some(query) = req.uri().query() {
        url.push('?');
        url.push_str(query);
    }

    let (parts, body) = req.into_parts();
    let mut headers = parts.headers;
    // The upstream host replaces the gateway's; reqwest derives framing
    // from the streamed body, so the inbound framing headers go too.
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);
    headers.remove(header::EXPECT);
    for name in HOP_BY_HOP {
        headers.remove(name);
    }

    debug!("[proxy] {} /{}/api/{} -> {}", parts.method, service_id, rest, url);

    let upstream = state
        .http
        .request(parts.method, url.as_str())
        .headers(headers)
        .body(reqwest::Body::wrap_stream(body.into_data_stream()))
        .send()
        .await
        .map_err(|e| {
            warn!("[proxy] upstream request for {service_id} failed: {e}");
            ApiError::bad_gateway("upstream request failed")
        })?;

    let mut builder = Response::builder().status(upstream.status());
    if let Some(response_headers) = builder.headers_mut() {
        for (name, value) in upstream.headers() {
            if !HOP_BY_HOP.contains(name) {
                response_headers.append(name, value.clone());
            }
        }
    }
    builder
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|_| ApiError::internal())
}
