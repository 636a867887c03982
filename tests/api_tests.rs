use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::{TestRequest, TestServer};
use serde_json::Value;

use matchmaking_api::api::identity::{USER_ID_HEADER, USER_VERIFIED_HEADER};
use matchmaking_api::api::{create_router, AppState};
use matchmaking_api::db::memory::{MemoryInteractionStore, MemorySessionCache, MemoryUserDirectory};
use matchmaking_api::middleware::request_id::REQUEST_ID_HEADER;
use matchmaking_api::services::{EngineSettings, MatchingEngine};

fn create_test_server(population: i64, max_daily_views: u32) -> TestServer {
    let engine = MatchingEngine::new(
        Arc::new(MemoryUserDirectory::with_population(population)),
        Arc::new(MemoryInteractionStore::new()),
        Arc::new(MemorySessionCache::new()),
        EngineSettings {
            max_daily_views,
            ..EngineSettings::default()
        },
    )
    .with_seed(42);

    let app = create_router(AppState::new(engine, Duration::from_secs(5)));
    TestServer::new(app).unwrap()
}

fn as_user(request: TestRequest, user_id: i64, verified: bool) -> TestRequest {
    request
        .add_header(
            HeaderName::from_static(USER_ID_HEADER),
            HeaderValue::from_str(&user_id.to_string()).unwrap(),
        )
        .add_header(
            HeaderName::from_static(USER_VERIFIED_HEADER),
            HeaderValue::from_static(if verified { "true" } else { "false" }),
        )
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(2, 10);
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server(2, 10);
    let id = "6f1c8a52-34e3-4a51-9d53-6e3f0c8b2a10";

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static(REQUEST_ID_HEADER),
            HeaderValue::from_static(id),
        )
        .await;

    let echoed = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok());
    assert_eq!(echoed, Some(id));
}

#[tokio::test]
async fn test_missing_identity_is_unauthorized() {
    let server = create_test_server(4, 10);
    let response = server.get("/api/v1/partner").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_current_partner_is_stable() {
    let server = create_test_server(4, 10);

    let first: Value = as_user(server.get("/api/v1/partner"), 1, true).await.json();
    let second: Value = as_user(server.get("/api/v1/partner"), 1, true).await.json();

    assert_ne!(first["id"], 1);
    assert_eq!(first["id"], second["id"]);
    assert_eq!(first["status"], "PENDING");
}

#[tokio::test]
async fn test_pass_until_quota_exhausted() {
    let server = create_test_server(6, 3);

    for _ in 0..3 {
        let response = as_user(server.post("/api/v1/partner/pass"), 1, false).await;
        response.assert_status_ok();
    }

    let response = as_user(server.post("/api/v1/partner/pass"), 1, false).await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);

    // Viewing the current partner is budgeted the same way
    let response = as_user(server.get("/api/v1/partner"), 1, false).await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);

    // Verified users are not limited
    let response = as_user(server.post("/api/v1/partner/pass"), 1, true).await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_like_requires_current_partner() {
    let server = create_test_server(4, 10);
    let response = as_user(server.post("/api/v1/partner/like"), 1, false).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_like_then_duplicate_like() {
    let server = create_test_server(4, 10);

    let partner: Value = as_user(server.post("/api/v1/partner/pass"), 1, false)
        .await
        .json();

    let response = as_user(server.post("/api/v1/partner/like"), 1, false).await;
    response.assert_status(StatusCode::NO_CONTENT);

    let response = as_user(server.post("/api/v1/partner/like"), 1, false).await;
    response.assert_status(StatusCode::CONFLICT);

    let liked: Vec<Value> = as_user(server.get("/api/v1/partner/liked"), 1, false)
        .await
        .json();
    assert_eq!(liked.len(), 1);
    assert_eq!(liked[0]["id"], partner["id"]);
    assert_eq!(liked[0]["status"], "PENDING");

    // The current partner now displays as liked
    let current: Value = as_user(server.get("/api/v1/partner"), 1, false).await.json();
    assert_eq!(current["status"], "APPROVED");
}

#[tokio::test]
async fn test_mutual_match_over_http() {
    // With two users each can only be proposed the other
    let server = create_test_server(2, 10);

    let a: Value = as_user(server.post("/api/v1/partner/pass"), 1, true).await.json();
    let b: Value = as_user(server.post("/api/v1/partner/pass"), 2, true).await.json();
    assert_eq!(a["id"], 2);
    assert_eq!(b["id"], 1);

    as_user(server.post("/api/v1/partner/like"), 1, true)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    as_user(server.post("/api/v1/partner/like"), 2, true)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    for user_id in [1, 2] {
        let liked: Vec<Value> = as_user(server.get("/api/v1/partner/liked"), user_id, true)
            .await
            .json();
        assert_eq!(liked.len(), 1);
        assert_eq!(liked[0]["status"], "APPROVED");
    }
}

#[tokio::test]
async fn test_liked_list_starts_empty() {
    let server = create_test_server(4, 10);
    let response = as_user(server.get("/api/v1/partner/liked"), 3, false).await;
    response.assert_status_ok();
    let liked: Vec<Value> = response.json();
    assert!(liked.is_empty());
}
