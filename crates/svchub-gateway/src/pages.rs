//! Service pages, assets, and documentation
//!
//! The entry page is served with a session context object injected as a
//! single script fragment; assets are served from the service's
//! distribution directory behind a canonical-path traversal guard.

use std::path::{Component, Path, PathBuf};

use axum::extract::{Path as PathParams, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use serde_json::json;

use svchub_core::ServiceRuntime;

use crate::access::ensure_access;
use crate::auth::AuthIdentity;
use crate::error::ApiError;
use crate::server::AppState;

/// Marker comment replaced by the context fragment when present
pub const CONTEXT_MARKER: &str = "<!-- SERVICE_CONTEXT -->";

/// Insert the context script: at the marker, else before `</body>`, else
/// appended at end of document.
pub fn inject_context(html: &str, payload_script: &str) -> String {
    if html.contains(CONTEXT_MARKER) {
        return html.replacen(CONTEXT_MARKER, payload_script, 1);
    }
    if html.contains("</body>") {
        return html.replacen("</body>", &format!("{payload_script}\n</body>"), 1);
    }
    format!("{html}\n{payload_script}")
}

fn context_script(
    service: &ServiceRuntime,
    identity: &svchub_core::SessionIdentity,
    default_target: &str,
) -> String {
    let context = json!({
        "service": {
            "id": service.id(),
            "name": service.manifest.name,
            "description": service.manifest.description,
            "proxy": {
                "path": service.proxy_path(),
                "target": service
                    .manifest
                    .proxy_target
                    .as_deref()
                    .filter(|t| !t.is_empty())
                    .unwrap_or(default_target),
                "rewrite": service.proxy_rewrite(),
            },
        },
        "user": identity,
    });
    format!("<script>window.__SERVICE_CONTEXT__={context};</script>")
}

/// `GET /{service_id}` - entry page with injected context
pub async fn service_page(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    PathParams(service_id): PathParams<String>,
) -> Result<Html<String>, ApiError> {
    let service = state
        .registry
        .get(&service_id)
        .await
        .ok_or_else(|| ApiError::not_found("service not found"))?;
    ensure_access(&identity, &service)?;

    let html = tokio::fs::read_to_string(&service.abs_html_path)
        .await
        .map_err(|e| {
            tracing::error!("[pages] entry page for {service_id} unreadable: {e}");
            ApiError::internal()
        })?;
    let script = context_script(&service, &identity, &state.default_proxy_target);
    Ok(Html(inject_context(&html, &script)))
}

/// Resolve an asset path lexically, rejecting any `..` that would climb
/// out of the distribution directory. The canonical check follows.
fn resolve_lexically(dist_dir: &Path, asset: &str) -> Result<PathBuf, ApiError> {
    let mut resolved = PathBuf::new();
    for component in Path::new(asset).components() {
        match component {
            Component::Normal(c) => resolved.push(c),
            Component::ParentDir => {
                if !resolved.pop() {
                    return Err(svchub_core::Error::PathTraversal.into());
                }
            }
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => {
                return Err(svchub_core::Error::PathTraversal.into())
            }
        }
    }
    Ok(dist_dir.join(resolved))
}

/// `GET /services-assets/{service_id}/{*asset}`
pub async fn service_asset(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    PathParams((service_id, asset)): PathParams<(String, String)>,
) -> Result<Response, ApiError> {
    let service = state
        .registry
        .get(&service_id)
        .await
        .ok_or_else(|| ApiError::not_found("service not found"))?;
    ensure_access(&identity, &service)?;

    let dist_dir = service.dist_dir();
    let requested = resolve_lexically(dist_dir, &asset)?;

    // Canonicalize before comparing against the permitted root; symlinks
    // pointing outside the distribution directory are rejected, not followed.
    let canonical_dir = tokio::fs::canonicalize(dist_dir)
        .await
        .map_err(|_| ApiError::not_found("asset not found"))?;
    let canonical = tokio::fs::canonicalize(&requested)
        .await
        .map_err(|_| ApiError::not_found("asset not found"))?;
    if !canonical.starts_with(&canonical_dir) {
        return Err(svchub_core::Error::PathTraversal.into());
    }

    let bytes = tokio::fs::read(&canonical)
        .await
        .map_err(|_| ApiError::not_found("asset not found"))?;
    Ok((
        [(header::CONTENT_TYPE, content_type_for(&canonical))],
        bytes,
    )
        .into_response())
}

/// `GET /api/services/{service_id}/docs/{doc_type}`
pub async fn service_doc(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    PathParams((service_id, doc_type)): PathParams<(String, String)>,
) -> Result<Response, ApiError> {
    let service = state
        .registry
        .get(&service_id)
        .await
        .ok_or_else(|| ApiError::not_found("service not found"))?;
    ensure_access(&identity, &service)?;

    let path = match doc_type.as_str() {
        "api" => &service.api_doc_path,
        "plan" => &service.plan_path,
        "workblook" => &service.workbook_path,
        _ => return Err(ApiError::not_found("unknown document type")),
    };
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|_| ApiError::not_found("document not found"))?;
    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        content,
    )
        .into_response())
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("js") | Some("mjs") => "application/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        Some("wasm") => "application/wasm",
        Some("map") => "application/json; charset=utf-8",
        _ => "application/octet-stream",
    }
}
