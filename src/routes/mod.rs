// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod cron;
pub mod events;
pub mod photos;
pub mod registrations;
pub mod runners;
pub mod survey;
pub mod webhook;

use crate::config::PhotoBackend;
use crate::error::{AppError, Result};
use crate::middleware::{require_cron_secret, resolve_session, AuthUser};
use crate::models::Runner;
use crate::AppState;
use axum::http::{header, Method};
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HealthResponse {
    pub status: String,
    pub build_id: String,
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    let build_id = option_env!("BUILD_ID").unwrap_or("unknown").to_string();
    Json(HealthResponse {
        status: "ok".to_string(),
        build_id,
    })
}

/// Plain `{success: true}` acknowledgment.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Runner profile of the authenticated caller.
pub(crate) async fn caller(state: &AppState, user: &AuthUser) -> Result<Runner> {
    state.runners.require_caller(&user.identity_key).await
}

/// Runner profile of the caller, who must be an admin.
pub(crate) async fn admin_caller(state: &AppState, user: &AuthUser) -> Result<Runner> {
    let runner = caller(state, user).await?;
    if !runner.is_admin {
        tracing::warn!(runner_id = %runner.id, "Admin action attempted by non-admin");
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }
    Ok(runner)
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS layer - allow requests from frontend URL and localhost (for dev)
    let frontend_url = state.config.frontend_url.clone();
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::predicate(
            move |origin: &axum::http::HeaderValue, _request_parts: &axum::http::request::Parts| {
                let origin_str = origin.to_str().unwrap_or("");
                origin_str == frontend_url
                    || origin_str.starts_with("http://localhost")
                    || origin_str.starts_with("http://127.0.0.1")
            },
        ))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    // Public routes (no session)
    let mut public_routes = Router::new()
        .route("/health", get(health_check))
        .merge(webhook::routes());

    if let PhotoBackend::Local { dir, .. } = &state.config.photo_backend {
        public_routes = public_routes.nest_service("/photos", ServeDir::new(dir));
    }

    // Cron trigger (shared secret)
    let cron_routes = cron::routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        require_cron_secret,
    ));

    // API routes (session resolved when present; handlers decide if required)
    let api_routes = Router::new()
        .merge(runners::routes())
        .merge(events::routes())
        .merge(registrations::routes())
        .merge(photos::routes())
        .merge(survey::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            resolve_session,
        ));

    Router::new()
        .merge(public_routes)
        .merge(cron_routes)
        .merge(api_routes)
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
