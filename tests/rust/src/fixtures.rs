//! Test fixtures: a full gateway wired against temp directories,
//! plus request/response helpers for driving the router in-process.

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use svchub_gateway::{build_router, AppState, TokenService};
use svchub_storage::{RegistrationStore, ServiceRegistry, UserStore};

pub const TEST_SECRET: &[u8] = b"integration-test-secret-32-bytes";

pub struct TestEnv {
    pub router: Router,
    pub state: AppState,
    pub data_dir: TempDir,
    pub services_dir: TempDir,
}

/// Fresh gateway with empty stores. The user store bootstraps the
/// default `admin`/`admin123` account on open.
pub async fn test_env() -> TestEnv {
    env_with_dirs(TempDir::new().unwrap(), TempDir::new().unwrap()).await
}

/// Gateway over pre-populated directories (write services first, then
/// build the env so the registry scan picks them up).
pub async fn env_with_dirs(data_dir: TempDir, services_dir: TempDir) -> TestEnv {
    let users = Arc::new(UserStore::open(data_dir.path()).await.unwrap());
    let registrations = Arc::new(RegistrationStore::open(data_dir.path()).await.unwrap());
    let registry = Arc::new(ServiceRegistry::new(services_dir.path()));
    registry.load().await.unwrap();
    let state = AppState {
        users,
        registrations,
        registry,
        tokens: Arc::new(TokenService::new(TEST_SECRET.to_vec())),
        http: reqwest::Client::new(),
        default_proxy_target: "http://localhost:4000".to_string(),
    };
    TestEnv {
        router: build_router(state.clone()),
        state,
        data_dir,
        services_dir,
    }
}

/// Write a service directory: manifest (base fields merged with `extra`),
/// an entry page, a distribution script, and two documentation files.
pub async fn write_service(services_dir: &Path, id: &str, extra: Value) {
    let service_dir = services_dir.join(id);
    tokio::fs::create_dir_all(service_dir.join("frontend"))
        .await
        .unwrap();
    tokio::fs::create_dir_all(service_dir.join("dist"))
        .await
        .unwrap();

    let mut manifest = json!({
        "id": id,
        "name": format!("Service {id}"),
        "entryHtml": "frontend/index.html",
        "entryScript": "dist/main.js",
    });
    if let (Some(base), Some(extra)) = (manifest.as_object_mut(), extra.as_object()) {
        for (k, v) in extra {
            base.insert(k.clone(), v.clone());
        }
    }
    tokio::fs::write(
        service_dir.join("service.config.json"),
        serde_json::to_string_pretty(&manifest).unwrap(),
    )
    .await
    .unwrap();

    tokio::fs::write(
        service_dir.join("frontend/index.html"),
        format!("<html><body><h1>{id}</h1></body></html>"),
    )
    .await
    .unwrap();
    tokio::fs::write(service_dir.join("dist/main.js"), "console.log('ok');")
        .await
        .unwrap();
    tokio::fs::write(service_dir.join("API_DOCUMENT.md"), format!("# {id} API\n"))
        .await
        .unwrap();
    tokio::fs::write(service_dir.join("PLAN.md"), format!("# {id} plan\n"))
        .await
        .unwrap();
}

pub async fn send(router: &Router, req: Request<Body>) -> Response<Body> {
    router.clone().oneshot(req).await.unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_authed(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: &Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn request_without_body(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Log in and return the bearer token, asserting success.
pub async fn login(router: &Router, username: &str, password: &str) -> String {
    let response = send(
        router,
        json_request(
            "POST",
            "/auth/login",
            None,
            &json!({ "username": username, "password": password }),
        ),
    )
    .await;
    assert_eq!(response.status(), 200, "login for {username} failed");
    let body = body_json(response).await;
    body["token"].as_str().unwrap().to_string()
}

/// Token for the bootstrapped administrator.
pub async fn admin_token(router: &Router) -> String {
    login(router, "admin", "admin123").await
}
