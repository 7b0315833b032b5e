// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weekly survey API tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

mod common;

fn post_json(uri: &str, identity_key: &str, body: serde_json::Value) -> Request<Body> {
    common::authed("POST", uri, identity_key)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn new_survey() -> serde_json::Value {
    json!({"question": "Coming on Sunday?", "survey_date": "2026-10-18"})
}

#[tokio::test]
async fn test_active_survey_empty_when_none() {
    let app = common::create_test_app();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/api/survey/active")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = common::json_body(response).await;
    assert!(json["survey"].is_null());
    assert!(json["currentRunnerId"].is_null());
}

#[tokio::test]
async fn test_respond_without_survey_not_found() {
    let app = common::create_test_app();
    common::seed_runner(&app.db, "r1", "Ana", false).await;

    let response = app
        .router
        .oneshot(post_json(
            "/api/survey/respond",
            "user_r1",
            json!({"is_coming": true}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(common::json_body(response).await["error"], "no_active_survey");
}

#[tokio::test]
async fn test_create_survey_requires_admin() {
    let app = common::create_test_app();
    common::seed_runner(&app.db, "r1", "Ana", false).await;

    let response = app
        .router
        .oneshot(post_json("/api/surveys", "user_r1", new_survey()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_respond_rejects_non_boolean() {
    let app = common::create_test_app();
    common::seed_runner(&app.db, "admin", "Admin", true).await;
    app.router
        .clone()
        .oneshot(post_json("/api/surveys", "user_admin", new_survey()))
        .await
        .unwrap();

    for body in [json!({"is_coming": "yes"}), json!({}), json!({"is_coming": 1})] {
        let response = app
            .router
            .clone()
            .oneshot(post_json("/api/survey/respond", "user_admin", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(common::json_body(response).await["error"], "bad_request");
    }
}

#[tokio::test]
async fn test_survey_flow() {
    let app = common::create_test_app();
    common::seed_runner(&app.db, "admin", "Admin", true).await;
    common::seed_runner(&app.db, "r1", "Ana", false).await;

    let response = app
        .router
        .clone()
        .oneshot(post_json("/api/surveys", "user_admin", new_survey()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    for (identity, coming) in [("user_r1", true), ("user_admin", false), ("user_r1", false), ("user_r1", true)] {
        let response = app
            .router
            .clone()
            .oneshot(post_json(
                "/api/survey/respond",
                identity,
                json!({"is_coming": coming}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .router
        .clone()
        .oneshot(
            common::authed("GET", "/api/survey/active", "user_r1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = common::json_body(response).await;
    assert_eq!(json["currentRunnerId"], "r1");
    assert_eq!(json["survey"]["question"], "Coming on Sunday?");
    assert_eq!(json["survey"]["responses"].as_array().unwrap().len(), 2);
    assert_eq!(json["survey"]["coming"].as_array().unwrap().len(), 1);
    assert_eq!(json["survey"]["coming"][0]["name"], "Ana");
    assert_eq!(json["survey"]["user_response"]["is_coming"], true);

    // A new survey replaces the active one
    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/surveys",
            "user_admin",
            json!({"question": "Next week?", "survey_date": "2026-10-25"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/api/survey/active")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = common::json_body(response).await;
    assert_eq!(json["survey"]["question"], "Next week?");
    assert!(json["survey"]["responses"].as_array().unwrap().is_empty());
}
