// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Token refresh behavior against a local fake token endpoint.
//!
//! The fake endpoint counts hits, proving `ensure_fresh_token` makes
//! exactly one refresh call when the token is inside the expiry margin
//! and none otherwise.

use axum::{extract::State, routing::post, Json, Router};
use chrono::{Duration, Utc};
use landscape_pro::db::FirestoreDb;
use landscape_pro::error::AppError;
use landscape_pro::models::CalendarLink;
use landscape_pro::services::{CalendarApiClient, CalendarService, GoogleAuthClient};
use landscape_pro::time_utils::format_utc_rfc3339;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct FakeTokenEndpoint {
    hits: Arc<AtomicUsize>,
    addr: std::net::SocketAddr,
}

/// Spawn a local token endpoint; `fail` makes it answer 500.
async fn spawn_token_endpoint(fail: bool) -> FakeTokenEndpoint {
    let hits = Arc::new(AtomicUsize::new(0));

    async fn ok_handler(State(hits): State<Arc<AtomicUsize>>) -> Json<serde_json::Value> {
        hits.fetch_add(1, Ordering::SeqCst);
        Json(serde_json::json!({
            "access_token": "refreshed-token",
            "expires_in": 3600,
            "token_type": "Bearer"
        }))
    }

    async fn fail_handler(
        State(hits): State<Arc<AtomicUsize>>,
    ) -> (axum::http::StatusCode, &'static str) {
        hits.fetch_add(1, Ordering::SeqCst);
        (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom")
    }

    let app = if fail {
        Router::new()
            .route("/token", post(fail_handler))
            .with_state(hits.clone())
    } else {
        Router::new()
            .route("/token", post(ok_handler))
            .with_state(hits.clone())
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeTokenEndpoint { hits, addr }
}

fn service_against(endpoint: &FakeTokenEndpoint) -> CalendarService {
    let oauth = GoogleAuthClient::new("cid".to_string(), "secret".to_string())
        .with_token_url(format!("http://{}/token", endpoint.addr));
    CalendarService::new(CalendarApiClient::new(), oauth, FirestoreDb::new_mock())
}

fn link(refresh_token: Option<&str>, expires_in_secs: i64) -> CalendarLink {
    CalendarLink {
        is_connected: true,
        access_token: Some("current-token".to_string()),
        refresh_token: refresh_token.map(str::to_string),
        token_expiry: Some(format_utc_rfc3339(
            Utc::now() + Duration::seconds(expires_in_secs),
        )),
        last_sync: None,
        calendars: Vec::new(),
    }
}

#[tokio::test]
async fn test_fresh_token_triggers_zero_refresh_calls() {
    let endpoint = spawn_token_endpoint(false).await;
    let service = service_against(&endpoint);

    // Expires in an hour - well outside the 5 minute margin
    let token = service
        .ensure_fresh_token("uid-1", &link(Some("refresh"), 3600))
        .await
        .expect("uses current token");

    assert_eq!(token, "current-token");
    assert_eq!(endpoint.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_expired_token_triggers_exactly_one_refresh_call() {
    let endpoint = spawn_token_endpoint(false).await;
    let service = service_against(&endpoint);

    // Already expired. The refresh succeeds, after which persisting the
    // new token hits the offline mock db - the refreshed-token-persisted
    // invariant comes before proceeding.
    let result = service
        .ensure_fresh_token("uid-1", &link(Some("refresh"), -60))
        .await;

    assert!(matches!(result, Err(AppError::Database(_))));
    assert_eq!(endpoint.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_refresh_failure_falls_back_to_stale_token() {
    let endpoint = spawn_token_endpoint(true).await;
    let service = service_against(&endpoint);

    let token = service
        .ensure_fresh_token("uid-1", &link(Some("refresh"), -60))
        .await
        .expect("falls back to the stale token");

    assert_eq!(token, "current-token");
    assert_eq!(endpoint.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_refresh_token_skips_refresh() {
    let endpoint = spawn_token_endpoint(false).await;
    let service = service_against(&endpoint);

    // Expired, but there is nothing to refresh with - the stale token is
    // used as-is and no call is made.
    let token = service
        .ensure_fresh_token("uid-1", &link(None, -60))
        .await
        .expect("uses stale token");

    assert_eq!(token, "current-token");
    assert_eq!(endpoint.hits.load(Ordering::SeqCst), 0);
}
