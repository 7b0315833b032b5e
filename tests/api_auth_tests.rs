// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API authentication and CORS tests.
//!
//! These tests verify that:
//! 1. Protected routes reject requests without a valid session
//! 2. Sessions are accepted from the cookie or the bearer header
//! 3. CORS preflight requests return correct headers

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use runclub::services::session::SessionClaims;
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_health_is_public() {
    let app = common::create_test_app();

    let response = app
        .router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    let json = common::json_body(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_protected_route_without_session() {
    let app = common::create_test_app();

    let response = app
        .router
        .oneshot(Request::builder().uri("/api/me").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = common::json_body(response).await;
    assert_eq!(json["error"], "unauthorized");
}

#[tokio::test]
async fn test_session_cookie_accepted() {
    let app = common::create_test_app();
    common::seed_runner(&app.db, "r1", "Ana", false).await;

    let response = app
        .router
        .oneshot(
            common::authed("GET", "/api/me", "user_r1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = common::json_body(response).await;
    assert_eq!(json["id"], "r1");
    assert_eq!(json["email"], "r1@example.com");
}

#[tokio::test]
async fn test_bearer_header_accepted() {
    let app = common::create_test_app();
    common::seed_runner(&app.db, "r1", "Ana", false).await;

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", common::session_token("user_r1")),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_session_for_unknown_runner_not_found() {
    let app = common::create_test_app();

    let response = app
        .router
        .oneshot(
            common::authed("GET", "/api/me", "user_ghost")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = common::json_body(response).await;
    assert_eq!(json["details"], "Runner not found");
}

#[tokio::test]
async fn test_wrong_key_and_expired_tokens_rejected() {
    let app = common::create_test_app();
    common::seed_runner(&app.db, "r1", "Ana", false).await;
    let now = chrono::Utc::now().timestamp() as usize;

    let forged = encode(
        &Header::new(Algorithm::HS256),
        &SessionClaims {
            sub: "user_r1".to_string(),
            exp: now + 3600,
            iat: Some(now),
            nbf: None,
            iss: None,
        },
        &EncodingKey::from_secret(b"some_other_key_that_is_long_enough"),
    )
    .unwrap();

    let expired = encode(
        &Header::new(Algorithm::HS256),
        &SessionClaims {
            sub: "user_r1".to_string(),
            exp: now - 3600,
            iat: Some(now - 7200),
            nbf: None,
            iss: None,
        },
        &EncodingKey::from_secret(common::TEST_SESSION_KEY),
    )
    .unwrap();

    for token in [forged, expired, "not-a-jwt".to_string()] {
        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/me")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_cors_preflight_for_frontend() {
    let app = common::create_test_app();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/events")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_cors_rejects_unknown_origin() {
    let app = common::create_test_app();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/events")
                .header(header::ORIGIN, "https://evil.example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
