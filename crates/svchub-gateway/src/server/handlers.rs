//! HTTP handlers for the gateway

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use svchub_core::{RegistrationRequest, RegistrationStatus, ServiceRuntime, UpdateService, User};

use crate::access::can_access;
use crate::auth::{AdminIdentity, AuthIdentity, TOKEN_COOKIE};
use crate::error::ApiError;
use crate::token::TOKEN_TTL_SECS;

use super::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// User as exposed through the API - never carries the password hash.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
    pub services: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            roles: user.roles,
            services: user.services,
            created_at: user.created_at,
        }
    }
}

/// Registration request as exposed through the API.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestView {
    pub id: Uuid,
    pub username: String,
    pub status: RegistrationStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<RegistrationRequest> for RequestView {
    fn from(request: RegistrationRequest) -> Self {
        Self {
            id: request.id,
            username: request.username,
            status: request.status,
            created_at: request.created_at,
            reviewed_at: request.reviewed_at,
            reviewer_id: request.reviewer_id,
            reason: request.reason,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAdminView {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required_roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_rewrite: Option<String>,
}

impl From<ServiceRuntime> for ServiceAdminView {
    fn from(rt: ServiceRuntime) -> Self {
        Self {
            id: rt.manifest.id.clone(),
            name: rt.manifest.name.clone(),
            description: rt.manifest.description.clone(),
            required_roles: rt.manifest.required_roles.clone(),
            proxy_target: rt.manifest.proxy_target.clone(),
            proxy_rewrite: rt.manifest.proxy_rewrite.clone(),
        }
    }
}

// ============================================================================
// /auth
// ============================================================================

#[derive(Deserialize)]
pub struct RegisterPayload {
    pub username: String,
    pub password: String,
}

/// `POST /auth/register` - submit a registration request
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<Response, ApiError> {
    if payload.username.chars().count() < 3 {
        return Err(ApiError::bad_request("username must be at least 3 characters"));
    }
    if payload.password.chars().count() < 6 {
        return Err(ApiError::bad_request("password must be at least 6 characters"));
    }
    let request = state
        .registrations
        .create(&payload.username, &payload.password)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": request.id,
            "username": request.username,
            "message": "registration submitted, awaiting approval",
        })),
    )
        .into_response())
}

#[derive(Deserialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

/// `POST /auth/login` - validate credentials, issue token + cookie
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Response, ApiError> {
    let user = state
        .users
        .validate_credentials(&payload.username, &payload.password)
        .await
        .ok_or_else(|| {
            ApiError::new(StatusCode::UNAUTHORIZED, "invalid username or password")
        })?;
    let token = state.tokens.issue(&user);
    let cookie = format!(
        "{TOKEN_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={TOKEN_TTL_SECS}"
    );
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "token": token, "user": UserView::from(user) })),
    )
        .into_response())
}

/// `GET /auth/me` - return the caller's verified identity
pub async fn me(AuthIdentity(identity): AuthIdentity) -> Json<serde_json::Value> {
    Json(json!({ "user": identity }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    pub old_password: String,
    pub new_password: String,
}

/// `POST /auth/change-password` - rotate the caller's own password
pub async fn change_password(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if payload.new_password.chars().count() < 6 {
        return Err(ApiError::bad_request("password must be at least 6 characters"));
    }
    state
        .users
        .change_password(identity.subject, &payload.old_password, &payload.new_password)
        .await?;
    Ok(Json(json!({ "message": "password updated" })))
}

#[derive(Deserialize)]
pub struct AssignPayload {
    pub username: String,
    pub services: Vec<String>,
    pub roles: Option<Vec<String>>,
}

/// `POST /auth/assign` - admin sets a user's roles/services by username
pub async fn assign(
    State(state): State<AppState>,
    AdminIdentity(_admin): AdminIdentity,
    Json(payload): Json<AssignPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let updated = state
        .users
        .update_by_username(&payload.username, payload.roles, Some(payload.services))
        .await?;
    Ok(Json(json!({
        "message": "assignments updated",
        "user": UserView::from(updated),
    })))
}

// ============================================================================
// /admin
// ============================================================================

/// `GET /admin/users`
pub async fn admin_list_users(
    State(state): State<AppState>,
    AdminIdentity(_admin): AdminIdentity,
) -> Json<serde_json::Value> {
    let users: Vec<UserView> = state
        .users
        .list()
        .await
        .into_iter()
        .map(UserView::from)
        .collect();
    Json(json!({ "users": users }))
}

#[derive(Deserialize)]
pub struct UpdateUserPayload {
    pub roles: Option<Vec<String>>,
    pub services: Option<Vec<String>>,
}

/// `PATCH /admin/users/{user_id}` - self-target forbidden
pub async fn admin_update_user(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if user_id == admin.subject {
        return Err(ApiError::forbidden("cannot modify your own permissions"));
    }
    let updated = state
        .users
        .update_user(user_id, payload.roles, payload.services)
        .await?;
    Ok(Json(json!({ "user": UserView::from(updated) })))
}

/// `DELETE /admin/users/{user_id}` - self-target forbidden
pub async fn admin_delete_user(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    Path(user_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if user_id == admin.subject {
        return Err(ApiError::forbidden("cannot delete your own account"));
    }
    state.users.delete(user_id).await?;
    Ok(Json(json!({ "message": "user deleted" })))
}

/// `GET /admin/registration-requests` - pending only
pub async fn admin_list_requests(
    State(state): State<AppState>,
    AdminIdentity(_admin): AdminIdentity,
) -> Json<serde_json::Value> {
    let requests: Vec<RequestView> = state
        .registrations
        .list(RegistrationStatus::Pending)
        .await
        .into_iter()
        .map(RequestView::from)
        .collect();
    Json(json!({ "requests": requests }))
}

/// `POST /admin/registration-requests/{request_id}/approve`
pub async fn admin_approve_request(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    Path(request_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (request, user) = state
        .registrations
        .approve(request_id, &state.users, admin.subject)
        .await?;
    Ok(Json(json!({
        "request": RequestView::from(request),
        "user": UserView::from(user),
    })))
}

#[derive(Deserialize, Default)]
pub struct RejectPayload {
    pub reason: Option<String>,
}

/// `POST /admin/registration-requests/{request_id}/reject`
pub async fn admin_reject_request(
    State(state): State<AppState>,
    AdminIdentity(admin): AdminIdentity,
    Path(request_id): Path<Uuid>,
    payload: Option<Json<RejectPayload>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let reason = payload.and_then(|Json(p)| p.reason);
    let request = state
        .registrations
        .reject(request_id, admin.subject, reason)
        .await?;
    Ok(Json(json!({ "request": RequestView::from(request) })))
}

/// `GET /admin/services` - every manifest, including access requirements
pub async fn admin_list_services(
    State(state): State<AppState>,
    AdminIdentity(_admin): AdminIdentity,
) -> Json<serde_json::Value> {
    let services: Vec<ServiceAdminView> = state
        .registry
        .list()
        .await
        .into_iter()
        .map(ServiceAdminView::from)
        .collect();
    Json(json!({ "services": services }))
}

/// `PATCH /admin/services/{service_id}` - update mutable manifest fields
pub async fn admin_update_service(
    State(state): State<AppState>,
    AdminIdentity(_admin): AdminIdentity,
    Path(service_id): Path<String>,
    Json(updates): Json<UpdateService>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let updated = state.registry.update(&service_id, &updates).await?;
    Ok(Json(json!({
        "message": "service configuration updated",
        "service": ServiceAdminView::from(updated),
    })))
}

// ============================================================================
// /api/services
// ============================================================================

/// `GET /api/services` - services the caller may access, with doc links
pub async fn list_services(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
) -> Json<serde_json::Value> {
    let services: Vec<serde_json::Value> = state
        .registry
        .list()
        .await
        .into_iter()
        .filter(|service| can_access(&identity, service))
        .map(|service| {
            let id = service.id();
            json!({
                "id": id,
                "name": service.manifest.name,
                "description": service.manifest.description,
                "docs": {
                    "api": format!("/api/services/{id}/docs/api"),
                    "plan": format!("/api/services/{id}/docs/plan"),
                    "workblook": format!("/api/services/{id}/docs/workblook"),
                },
            })
        })
        .collect();
    Json(json!({ "services": services }))
}
