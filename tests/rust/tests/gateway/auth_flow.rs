//! Registration, login, and session lifecycle

use pretty_assertions::assert_eq;
use serde_json::json;

use tests::fixtures::{
    admin_token, body_json, get_authed, json_request, login, send, test_env,
};

#[tokio::test]
async fn register_approve_login_flow() {
    let env = test_env().await;

    // 1. Alice registers
    let response = send(
        &env.router,
        json_request(
            "POST",
            "/auth/register",
            None,
            &json!({ "username": "alice", "password": "secret1" }),
        ),
    )
    .await;
    assert_eq!(response.status(), 201);
    let body = body_json(response).await;
    assert_eq!(body["username"], "alice");
    let request_id = body["id"].as_str().unwrap().to_string();

    // 2. The pending list shows her request
    let admin = admin_token(&env.router).await;
    let response = send(
        &env.router,
        get_authed("/admin/registration-requests", &admin),
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["requests"][0]["username"], "alice");
    assert_eq!(body["requests"][0]["status"], "pending");

    // 3. Admin approves; login now succeeds with the registered password
    let response = send(
        &env.router,
        json_request(
            "POST",
            &format!("/admin/registration-requests/{request_id}/approve"),
            Some(&admin),
            &json!({}),
        ),
    )
    .await;
    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["request"]["status"], "approved");

    let response = send(
        &env.router,
        json_request(
            "POST",
            "/auth/login",
            None,
            &json!({ "username": "alice", "password": "secret1" }),
        ),
    )
    .await;
    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["roles"], json!(["user"]));
    assert_eq!(body["user"]["services"], json!([]));
}

#[tokio::test]
async fn duplicate_pending_registration_is_rejected() {
    let env = test_env().await;
    let payload = json!({ "username": "alice", "password": "secret1" });
    let response = send(
        &env.router,
        json_request("POST", "/auth/register", None, &payload),
    )
    .await;
    assert_eq!(response.status(), 201);

    let response = send(
        &env.router,
        json_request("POST", "/auth/register", None, &payload),
    )
    .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn registration_input_is_validated() {
    let env = test_env().await;
    let response = send(
        &env.router,
        json_request(
            "POST",
            "/auth/register",
            None,
            &json!({ "username": "al", "password": "secret1" }),
        ),
    )
    .await;
    assert_eq!(response.status(), 400);

    let response = send(
        &env.router,
        json_request(
            "POST",
            "/auth/register",
            None,
            &json!({ "username": "alice", "password": "short" }),
        ),
    )
    .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let env = test_env().await;
    let response = send(
        &env.router,
        json_request(
            "POST",
            "/auth/login",
            None,
            &json!({ "username": "admin", "password": "wrong" }),
        ),
    )
    .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn login_sets_session_cookie_and_cookie_authenticates() {
    let env = test_env().await;
    let response = send(
        &env.router,
        json_request(
            "POST",
            "/auth/login",
            None,
            &json!({ "username": "admin", "password": "admin123" }),
        ),
    )
    .await;
    assert_eq!(response.status(), 200);
    let cookie = response
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));

    // /auth/me via the cookie alone
    let token_pair = cookie.split(';').next().unwrap();
    let request = axum::http::Request::builder()
        .uri("/auth/me")
        .header("cookie", token_pair)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = send(&env.router, request).await;
    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["user"]["username"], "admin");
}

#[tokio::test]
async fn me_requires_valid_credentials() {
    let env = test_env().await;
    let response = send(&env.router, tests::fixtures::get("/auth/me")).await;
    assert_eq!(response.status(), 401);

    let response = send(&env.router, get_authed("/auth/me", "not.a-token")).await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn me_returns_identity_claims() {
    let env = test_env().await;
    let token = admin_token(&env.router).await;
    let response = send(&env.router, get_authed("/auth/me", &token)).await;
    assert_eq!(response.status(), 200);
    let body = body_json(response).await;
    assert_eq!(body["user"]["username"], "admin");
    assert_eq!(body["user"]["roles"], json!(["admin"]));
}

#[tokio::test]
async fn change_password_requires_the_old_one() {
    let env = test_env().await;
    env.state
        .users
        .create("alice", "secret1", vec!["user".into()], vec![])
        .await
        .unwrap();
    let token = login(&env.router, "alice", "secret1").await;

    let response = send(
        &env.router,
        json_request(
            "POST",
            "/auth/change-password",
            Some(&token),
            &json!({ "oldPassword": "wrong", "newPassword": "next-secret" }),
        ),
    )
    .await;
    assert_eq!(response.status(), 400);

    let response = send(
        &env.router,
        json_request(
            "POST",
            "/auth/change-password",
            Some(&token),
            &json!({ "oldPassword": "secret1", "newPassword": "next-secret" }),
        ),
    )
    .await;
    assert_eq!(response.status(), 200);

    // old password dead, new one live
    let response = send(
        &env.router,
        json_request(
            "POST",
            "/auth/login",
            None,
            &json!({ "username": "alice", "password": "secret1" }),
        ),
    )
    .await;
    assert_eq!(response.status(), 401);
    login(&env.router, "alice", "next-secret").await;
}
