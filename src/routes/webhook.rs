// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider webhook (Svix-signed user lifecycle events).

use crate::error::{AppError, Result};
use crate::services::identity::{verify_signature, IdentityEvent, SyncOutcome, WebhookHeaders};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

/// Webhook routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/webhooks/identity", post(handle_event))
}

#[derive(Serialize)]
struct WebhookAck {
    message: &'static str,
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Handle incoming webhook events (POST).
///
/// The raw body is verified before parsing; re-serialized JSON would not
/// match the signature.
async fn handle_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let (Some(id), Some(timestamp), Some(signature)) = (
        header(&headers, "svix-id"),
        header(&headers, "svix-timestamp"),
        header(&headers, "svix-signature"),
    ) else {
        tracing::warn!("Webhook rejected: missing svix headers");
        return Err(AppError::BadRequest("Missing svix headers".to_string()));
    };

    let webhook_headers = WebhookHeaders {
        id,
        timestamp,
        signature,
    };
    if let Err(e) = verify_signature(
        &state.config.identity_webhook_secret,
        &webhook_headers,
        &body,
        chrono::Utc::now(),
    ) {
        tracing::warn!(svix_id = %id, error = %e, "Webhook verification failed");
        return Err(AppError::BadRequest("Verification failed".to_string()));
    }

    let event: IdentityEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {}", e)))?;

    tracing::info!(svix_id = %id, event_type = %event.event_type, "Webhook event received");

    let message = match state.identity.apply(event, chrono::Utc::now()).await? {
        SyncOutcome::Created(_) => "Runner created",
        SyncOutcome::Updated(_) => "Runner updated",
        SyncOutcome::UnknownIdentity(_) => "No runner for identity",
        SyncOutcome::Ignored(_) => "Webhook event not handled",
    };

    Ok((StatusCode::OK, Json(WebhookAck { message })).into_response())
}
