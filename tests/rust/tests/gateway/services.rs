//! Service catalog, entry pages, assets, and documentation

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

use tests::fixtures::{
    admin_token, body_json, body_string, env_with_dirs, get_authed, json_request, login,
    send, write_service, TestEnv,
};

/// Two services: `svc-a` gated on the `ops` role with a custom rewrite,
/// `svc-b` reachable only via explicit grant.
async fn env_with_services() -> TestEnv {
    let services_dir = TempDir::new().unwrap();
    write_service(
        services_dir.path(),
        "svc-a",
        json!({ "requiredRoles": ["ops"], "proxyRewrite": "/v2", "description": "alpha" }),
    )
    .await;
    write_service(services_dir.path(), "svc-b", json!({})).await;
    env_with_dirs(TempDir::new().unwrap(), services_dir).await
}

#[tokio::test]
async fn catalog_lists_only_accessible_services() {
    let env = env_with_services().await;
    env.state
        .users
        .create("alice", "secret1", vec!["user".into()], vec![])
        .await
        .unwrap();
    let token = login(&env.router, "alice", "secret1").await;

    let response = send(&env.router, get_authed("/api/services", &token)).await;
    let body = body_json(response).await;
    assert_eq!(body["services"], json!([]));

    // grant svc-b explicitly; it appears with its doc links
    let admin = admin_token(&env.router).await;
    send(
        &env.router,
        json_request(
            "POST",
            "/auth/assign",
            Some(&admin),
            &json!({ "username": "alice", "services": ["svc-b"] }),
        ),
    )
    .await;
    let token = login(&env.router, "alice", "secret1").await;
    let response = send(&env.router, get_authed("/api/services", &token)).await;
    let body = body_json(response).await;
    let services = body["services"].as_array().unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0]["id"], "svc-b");
    assert_eq!(services[0]["docs"]["api"], "/api/services/svc-b/docs/api");

    // admin sees everything
    let response = send(&env.router, get_authed("/api/services", &admin)).await;
    let body = body_json(response).await;
    assert_eq!(body["services"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn entry_page_carries_injected_context() {
    let env = env_with_services().await;
    env.state
        .users
        .create("olive", "secret1", vec!["ops".into()], vec![])
        .await
        .unwrap();
    let token = login(&env.router, "olive", "secret1").await;

    let response = send(&env.router, get_authed("/svc-a", &token)).await;
    assert_eq!(response.status(), 200);
    let html = body_string(response).await;
    assert!(html.contains("window.__SERVICE_CONTEXT__="));
    assert!(html.contains(r#""rewrite":"/v2""#));
    assert!(html.contains(r#""path":"/svc-a/api""#));
    assert!(html.contains(r#""username":"olive""#));
    // injected before the closing body tag
    let script_at = html.find("window.__SERVICE_CONTEXT__").unwrap();
    let body_close_at = html.find("</body>").unwrap();
    assert!(script_at < body_close_at);
}

#[tokio::test]
async fn page_access_is_enforced() {
    let env = env_with_services().await;
    env.state
        .users
        .create("alice", "secret1", vec!["user".into()], vec![])
        .await
        .unwrap();
    let token = login(&env.router, "alice", "secret1").await;

    let response = send(&env.router, get_authed("/svc-a", &token)).await;
    assert_eq!(response.status(), 403);

    let response = send(&env.router, get_authed("/ghost", &token)).await;
    assert_eq!(response.status(), 404);

    let response = send(&env.router, tests::fixtures::get("/svc-a")).await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn docs_are_served_per_type() {
    let env = env_with_services().await;
    let admin = admin_token(&env.router).await;

    let response = send(
        &env.router,
        get_authed("/api/services/svc-a/docs/api", &admin),
    )
    .await;
    assert_eq!(response.status(), 200);
    assert!(body_string(response).await.contains("svc-a API"));

    // the fixture writes no WORKBLOOK.md
    let response = send(
        &env.router,
        get_authed("/api/services/svc-a/docs/workblook", &admin),
    )
    .await;
    assert_eq!(response.status(), 404);

    let response = send(
        &env.router,
        get_authed("/api/services/svc-a/docs/nonsense", &admin),
    )
    .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn assets_are_served_from_the_dist_dir() {
    let env = env_with_services().await;
    let admin = admin_token(&env.router).await;

    let response = send(
        &env.router,
        get_authed("/services-assets/svc-a/main.js", &admin),
    )
    .await;
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-type"],
        "application/javascript; charset=utf-8"
    );
    assert_eq!(body_string(response).await, "console.log('ok');");

    let response = send(
        &env.router,
        get_authed("/services-assets/svc-a/missing.js", &admin),
    )
    .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn asset_paths_escaping_the_dist_dir_are_rejected() {
    let env = env_with_services().await;
    let admin = admin_token(&env.router).await;

    // the manifest sits one level above dist/ and must stay unreachable
    let response = send(
        &env.router,
        get_authed("/services-assets/svc-a/../service.config.json", &admin),
    )
    .await;
    assert_eq!(response.status(), 400);

    let response = send(
        &env.router,
        get_authed("/services-assets/svc-a/sub/../../frontend/index.html", &admin),
    )
    .await;
    assert_eq!(response.status(), 400);
}

#[cfg(unix)]
#[tokio::test]
async fn symlinked_assets_may_not_leave_the_dist_dir() {
    let env = env_with_services().await;
    let admin = admin_token(&env.router).await;

    let secret = env.services_dir.path().join("outside.txt");
    tokio::fs::write(&secret, "keep out").await.unwrap();
    std::os::unix::fs::symlink(
        &secret,
        env.services_dir.path().join("svc-a/dist/link.txt"),
    )
    .unwrap();

    let response = send(
        &env.router,
        get_authed("/services-assets/svc-a/link.txt", &admin),
    )
    .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn admin_updates_a_manifest_in_place() {
    let env = env_with_services().await;
    let admin = admin_token(&env.router).await;

    let response = send(
        &env.router,
        json_request(
            "PATCH",
            "/admin/services/svc-a",
            Some(&admin),
            &json!({ "proxyRewrite": "/v3", "description": "updated" }),
        ),
    )
    .await;
    assert_eq!(response.status(), 200);

    // visible without a reload, omitted fields retained
    let response = send(&env.router, get_authed("/admin/services", &admin)).await;
    let body = body_json(response).await;
    let svc = body["services"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["id"] == "svc-a")
        .unwrap();
    assert_eq!(svc["proxyRewrite"], "/v3");
    assert_eq!(svc["description"], "updated");
    assert_eq!(svc["requiredRoles"], json!(["ops"]));

    // the sibling manifest is untouched
    let svc_b = body["services"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["id"] == "svc-b")
        .unwrap();
    assert!(svc_b.get("proxyRewrite").is_none());
}

#[tokio::test]
async fn manifest_update_requires_admin_and_a_known_service() {
    let env = env_with_services().await;
    env.state
        .users
        .create("alice", "secret1", vec!["user".into()], vec![])
        .await
        .unwrap();
    let token = login(&env.router, "alice", "secret1").await;
    let response = send(
        &env.router,
        json_request(
            "PATCH",
            "/admin/services/svc-a",
            Some(&token),
            &json!({ "name": "hijack" }),
        ),
    )
    .await;
    assert_eq!(response.status(), 403);

    let admin = admin_token(&env.router).await;
    let response = send(
        &env.router,
        json_request(
            "PATCH",
            "/admin/services/ghost",
            Some(&admin),
            &json!({ "name": "nope" }),
        ),
    )
    .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn manifest_placeholders_resolve_from_the_environment() {
    std::env::set_var("SVCHUB_TEST_SVC_PORT", "9444");
    let services_dir = TempDir::new().unwrap();
    write_service(
        services_dir.path(),
        "svc-env",
        json!({ "proxyTarget": "http://backend:${SVCHUB_TEST_SVC_PORT}" }),
    )
    .await;
    let env = env_with_dirs(TempDir::new().unwrap(), services_dir).await;
    let admin = admin_token(&env.router).await;

    let response = send(&env.router, get_authed("/admin/services", &admin)).await;
    let body = body_json(response).await;
    assert_eq!(body["services"][0]["proxyTarget"], "http://backend:9444");
}
