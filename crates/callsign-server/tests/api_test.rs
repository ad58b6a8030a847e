//! HTTP tests for the auth routes, backed by in-memory SurrealDB.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use callsign_auth::{AuthConfig, AuthService};
use callsign_db::DbManager;
use callsign_server::AppState;
use callsign_server::routes::{RefreshResponse, SessionResponse, create_router};
use serde_json::{Value, json};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use tower::ServiceExt;

async fn create_test_app() -> Router {
    let client = Surreal::new::<Mem>(()).await.unwrap();
    let db = DbManager::open(client, "test", "test").await.unwrap();

    let config = AuthConfig {
        access_token_secret: "access-secret-for-tests".into(),
        refresh_token_secret: "refresh-secret-for-tests".into(),
        ..Default::default()
    };
    let auth = AuthService::new(db.users(), &config).unwrap();
    create_router(Arc::new(AppState { auth }))
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn ada() -> Value {
    json!({
        "display_name": "Ada",
        "phone_number": "+15551234567",
        "password": "password123",
    })
}

#[tokio::test]
async fn health_check() {
    let app = create_test_app().await;
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn sign_up_returns_created() {
    let app = create_test_app().await;

    let (status, body) = post(&app, "/auth/sign-up", ada()).await;
    assert_eq!(status, StatusCode::CREATED);

    let session: SessionResponse = serde_json::from_value(body).unwrap();
    assert!(!session.access_token.is_empty());
    assert!(!session.refresh_token.is_empty());
    assert_eq!(session.expires_in, 900);
}

#[tokio::test]
async fn duplicate_sign_up_conflicts() {
    let app = create_test_app().await;
    post(&app, "/auth/sign-up", ada()).await;

    let (status, body) = post(&app, "/auth/sign-up", ada()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "phone_number_taken");
}

#[tokio::test]
async fn invalid_input_is_bad_request() {
    let app = create_test_app().await;

    let (status, body) = post(
        &app,
        "/auth/sign-up",
        json!({
            "display_name": "Ada",
            "phone_number": "not-a-phone",
            "password": "password123",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, body) = post(&app, "/auth/sign-up", json!({ "display_name": "Ada" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn sign_in_failures_look_the_same() {
    let app = create_test_app().await;
    post(&app, "/auth/sign-up", ada()).await;

    let (wrong_status, wrong_body) = post(
        &app,
        "/auth/sign-in",
        json!({ "phone_number": "+15551234567", "password": "wrongpass" }),
    )
    .await;
    let (unknown_status, unknown_body) = post(
        &app,
        "/auth/sign-in",
        json!({ "phone_number": "+15559876543", "password": "password123" }),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_status, unknown_status);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn refresh_and_logout_flow() {
    let app = create_test_app().await;

    let (_, body) = post(&app, "/auth/sign-up", ada()).await;
    let signed_up: SessionResponse = serde_json::from_value(body).unwrap();

    let (status, body) = post(
        &app,
        "/auth/sign-in",
        json!({ "phone_number": "+15551234567", "password": "password123" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let signed_in: SessionResponse = serde_json::from_value(body).unwrap();
    assert_eq!(signed_in.id, signed_up.id);

    let (status, body) = post(
        &app,
        "/auth/refresh",
        json!({ "refresh_token": signed_in.refresh_token }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let refreshed: RefreshResponse = serde_json::from_value(body).unwrap();

    // Consumed token is now stale.
    let (status, body) = post(
        &app,
        "/auth/refresh",
        json!({ "refresh_token": signed_in.refresh_token }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "token_revoked");

    let (status, body) = post(
        &app,
        "/auth/logout",
        json!({ "access_token": refreshed.access_token }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "logged_out");

    let (status, body) = post(
        &app,
        "/auth/refresh",
        json!({ "refresh_token": refreshed.refresh_token }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "token_revoked");
}

#[tokio::test]
async fn logout_with_garbage_token() {
    let app = create_test_app().await;

    let (status, body) = post(&app, "/auth/logout", json!({ "access_token": "garbage" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "token_malformed");
}
