// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity webhook integration tests.
//!
//! Deliveries are signed with the test secret and posted through the full
//! router, so header handling, signature checks and the runner sync are all
//! exercised together.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use runclub::db::Store;
use serde_json::json;
use tower::ServiceExt;

mod common;

fn signed_request(config: &runclub::config::Config, id: &str, body: &str) -> Request<Body> {
    let timestamp = chrono::Utc::now().timestamp().to_string();
    let signature = common::svix_signature(config, id, &timestamp, body.as_bytes());

    Request::builder()
        .method("POST")
        .uri("/webhooks/identity")
        .header("content-type", "application/json")
        .header("svix-id", id)
        .header("svix-timestamp", timestamp)
        .header("svix-signature", signature)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn user_payload(event_type: &str, user_id: &str, first: &str, email: &str) -> String {
    json!({
        "type": event_type,
        "data": {
            "id": user_id,
            "email_addresses": [{"email_address": email}],
            "first_name": first,
            "last_name": "Popescu",
            "image_url": "https://img.example.com/a.png"
        }
    })
    .to_string()
}

#[tokio::test]
async fn test_webhook_missing_headers_rejected() {
    let app = common::create_test_app();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhooks/identity")
                .header("content-type", "application/json")
                .body(Body::from(user_payload(
                    "user.created",
                    "user_1",
                    "Ana",
                    "ana@example.com",
                )))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.db.list_runners().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_webhook_bad_signature_rejected() {
    let app = common::create_test_app();
    let body = user_payload("user.created", "user_1", "Ana", "ana@example.com");
    let timestamp = chrono::Utc::now().timestamp().to_string();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhooks/identity")
                .header("svix-id", "msg_1")
                .header("svix-timestamp", timestamp)
                .header("svix-signature", "v1,AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = common::json_body(response).await;
    assert_eq!(json["details"], "Verification failed");
}

#[tokio::test]
async fn test_webhook_tampered_body_rejected() {
    let app = common::create_test_app();
    let config = &app.state.config;
    let body = user_payload("user.created", "user_1", "Ana", "ana@example.com");
    let timestamp = chrono::Utc::now().timestamp().to_string();
    let signature = common::svix_signature(config, "msg_1", &timestamp, body.as_bytes());

    let tampered = body.replace("Ana", "Eve");
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhooks/identity")
                .header("svix-id", "msg_1")
                .header("svix-timestamp", timestamp)
                .header("svix-signature", signature)
                .body(Body::from(tampered))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_stale_timestamp_rejected() {
    let app = common::create_test_app();
    let body = user_payload("user.created", "user_1", "Ana", "ana@example.com");
    let timestamp = (chrono::Utc::now().timestamp() - 3600).to_string();
    let signature =
        common::svix_signature(&app.state.config, "msg_1", &timestamp, body.as_bytes());

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhooks/identity")
                .header("svix-id", "msg_1")
                .header("svix-timestamp", timestamp)
                .header("svix-signature", signature)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_user_created_then_updated() {
    let app = common::create_test_app();
    let config = app.state.config.clone();

    let created = user_payload("user.created", "user_abc", "Ana", "ana@example.com");
    let response = app
        .router
        .clone()
        .oneshot(signed_request(&config, "msg_1", &created))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let runner = app
        .db
        .get_runner_by_identity("user_abc")
        .await
        .unwrap()
        .expect("runner created");
    assert_eq!(runner.name, "Ana Popescu");
    assert_eq!(runner.email, "ana@example.com");
    assert!(!runner.is_admin);

    let updated = user_payload("user.updated", "user_abc", "Ioana", "ioana@example.com");
    let response = app
        .router
        .clone()
        .oneshot(signed_request(&config, "msg_2", &updated))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let runner = app
        .db
        .get_runner_by_identity("user_abc")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(runner.name, "Ioana Popescu");
    assert_eq!(runner.email, "ioana@example.com");
    assert_eq!(app.db.list_runners().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_redelivered_create_keeps_one_runner() {
    let app = common::create_test_app();
    let config = app.state.config.clone();
    let created = user_payload("user.created", "user_abc", "Ana", "ana@example.com");

    for _ in 0..2 {
        let response = app
            .router
            .clone()
            .oneshot(signed_request(&config, "msg_1", &created))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(app.db.list_runners().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_created_without_email_is_rejected() {
    let app = common::create_test_app();
    let body = json!({
        "type": "user.created",
        "data": {"id": "user_noemail", "email_addresses": []}
    })
    .to_string();

    let response = app
        .router
        .clone()
        .oneshot(signed_request(&app.state.config, "msg_1", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = common::json_body(response).await;
    assert_eq!(json["details"], "No email found");
    assert!(app.db.list_runners().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unhandled_event_type_acknowledged() {
    let app = common::create_test_app();
    let body = json!({"type": "session.created", "data": {"id": "sess_1"}}).to_string();

    let response = app
        .router
        .oneshot(signed_request(&app.state.config, "msg_1", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = common::json_body(response).await;
    assert_eq!(json["message"], "Webhook event not handled");
}
