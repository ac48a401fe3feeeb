//! End-to-end tests driving the router over an in-memory store: guard
//! behavior, status codes and response shapes.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use libraryhub::{app::build_app, state::AppState};

/// Fresh app over an in-memory store, with an admin account provisioned.
async fn build_test_app() -> Router {
    let state = AppState::fake();
    state
        .auth
        .bootstrap(Some("Admin123!"))
        .await
        .expect("bootstrap admin");
    build_app(state)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"));
    match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn register(app: &Router, username: &str, email: &str, password: &str) {
    let (status, body) = send(
        app,
        post_json(
            "/api/users/register",
            json!({ "username": username, "email": email, "password": password }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    assert_eq!(body["success"], json!(true));
}

async fn login(app: &Router, username: &str, password: &str) -> (String, Value) {
    let (status, body) = send(
        app,
        post_json(
            "/api/users/login",
            json!({ "username": username, "password": password }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    (body["token"].as_str().unwrap().to_string(), body["user"].clone())
}

#[tokio::test]
async fn health_is_open() {
    let app = build_test_app().await;
    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("OK"));
}

#[tokio::test]
async fn user_list_requires_a_token() {
    let app = build_test_app().await;

    let (status, _) = send(
        &app,
        Request::builder()
            .uri("/api/users")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Wrong scheme.
    let (status, _) = send(
        &app,
        Request::builder()
            .uri("/api/users")
            .header("authorization", "Basic abc123")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Garbage token.
    let (status, body) = send(&app, authed("GET", "/api/users", "not-a-jwt", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!("Invalid or expired token"));
}

#[tokio::test]
async fn register_login_flow() {
    let app = build_test_app().await;
    register(&app, "alice", "alice@example.com", "Secret123!").await;

    let (_token, user) = login(&app, "alice", "Secret123!").await;
    assert_eq!(user["username"], json!("alice"));
    assert_eq!(user["role"], json!("member"));
    assert!(user.get("password").is_none());

    let (status, _) = send(
        &app,
        post_json(
            "/api/users/login",
            json!({ "username": "alice", "password": "wrong" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_rejects_duplicates_and_bad_input() {
    let app = build_test_app().await;
    register(&app, "alice", "alice@example.com", "Secret123!").await;

    let (status, _) = send(
        &app,
        post_json(
            "/api/users/register",
            json!({ "username": "ALICE", "email": "other@example.com", "password": "Secret123!" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        post_json(
            "/api/users/register",
            json!({ "username": "bob", "email": "not-an-email", "password": "Secret123!" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        post_json(
            "/api/users/register",
            json!({ "username": "bob", "email": "bob@example.com", "password": "weak" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listing_never_exposes_hashes() {
    let app = build_test_app().await;
    register(&app, "alice", "alice@example.com", "Secret123!").await;
    let (token, _) = login(&app, "alice", "Secret123!").await;

    let (status, body) = send(&app, authed("GET", "/api/users", &token, None)).await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    for user in users {
        assert!(user.get("password").is_none());
        assert!(user.get("passwordHash").is_none());
    }

    let (status, me) = send(&app, authed("GET", "/api/users/me", &token, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], json!("alice"));
    assert!(me.get("password").is_none());
}

#[tokio::test]
async fn profile_updates_enforce_ownership() {
    let app = build_test_app().await;
    register(&app, "alice", "alice@example.com", "Secret123!").await;
    register(&app, "bob", "bob@example.com", "Secret123!").await;
    let (alice_token, alice) = login(&app, "alice", "Secret123!").await;
    let (bob_token, _) = login(&app, "bob", "Secret123!").await;
    let alice_id = alice["id"].as_u64().unwrap();

    // Bob cannot touch Alice's profile.
    let (status, _) = send(
        &app,
        authed(
            "PUT",
            &format!("/api/users/{alice_id}"),
            &bob_token,
            Some(json!({ "name": "Mallory" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Alice updates herself through /me; other fields stay untouched.
    let (status, updated) = send(
        &app,
        authed(
            "PUT",
            "/api/users/me",
            &alice_token,
            Some(json!({ "name": "Alice A." })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], json!("Alice A."));
    assert_eq!(updated["email"], json!("alice@example.com"));

    // Taking Bob's email conflicts.
    let (status, _) = send(
        &app,
        authed(
            "PUT",
            "/api/users/me",
            &alice_token,
            Some(json!({ "email": "bob@example.com" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // The admin may update anyone.
    let (admin_token, _) = login(&app, "admin", "Admin123!").await;
    let (status, updated) = send(
        &app,
        authed(
            "PUT",
            &format!("/api/users/{alice_id}"),
            &admin_token,
            Some(json!({ "avatar": "https://example.com/a.png" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["avatar"], json!("https://example.com/a.png"));
}

#[tokio::test]
async fn delete_is_admin_only_and_permanent() {
    let app = build_test_app().await;
    register(&app, "alice", "alice@example.com", "Secret123!").await;
    let (alice_token, alice) = login(&app, "alice", "Secret123!").await;
    let (admin_token, _) = login(&app, "admin", "Admin123!").await;
    let alice_id = alice["id"].as_u64().unwrap();

    let (status, _) = send(
        &app,
        authed("DELETE", &format!("/api/users/{alice_id}"), &alice_token, None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        authed("DELETE", &format!("/api/users/{alice_id}"), &admin_token, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("User deleted successfully"));

    let (status, _) = send(
        &app,
        authed("GET", &format!("/api/users/{alice_id}"), &admin_token, None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        authed("DELETE", &format!("/api/users/{alice_id}"), &admin_token, None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_role_flows_through_the_token() {
    let app = build_test_app().await;
    let (_, admin) = login(&app, "admin", "Admin123!").await;
    assert_eq!(admin["role"], json!("admin"));
    assert_eq!(admin["username"], json!("admin"));
}
