// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event registration routes.

use crate::error::Result;
use crate::middleware::{ApiJson, AuthUser, MaybeAuthUser};
use crate::models::EventRegistration;
use crate::routes::{caller, SuccessResponse};
use crate::services::{group_by_distance, DistanceGroup, Registrant};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/events/{id}/register", post(register))
        .route("/api/events/{id}/unregister", delete(unregister))
        .route("/api/events/{id}/registrations", get(list_registrations))
}

/// Registration body. Older clients send a single `selected_distance`.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub selected_distance: Option<String>,
    #[serde(default)]
    pub selected_distances: Option<Vec<String>>,
}

impl RegisterRequest {
    /// Submitted labels; the list form wins when both are present.
    pub fn selections(self) -> Vec<String> {
        match (self.selected_distances, self.selected_distance) {
            (Some(list), _) if !list.is_empty() => list,
            (_, Some(single)) => vec![single],
            _ => Vec::new(),
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RegisterResponse {
    pub success: bool,
    pub registration: EventRegistration,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationsResponse {
    pub registrations: Vec<Registrant>,
    pub user_registration: Option<EventRegistration>,
    pub groups: Vec<DistanceGroup>,
}

async fn register(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(event_id): Path<String>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<Json<RegisterResponse>> {
    let runner = caller(&state, &user).await?;
    let registration = state
        .registrations
        .register(&event_id, &runner.id, request.selections(), chrono::Utc::now())
        .await?;

    Ok(Json(RegisterResponse {
        success: true,
        registration,
    }))
}

async fn unregister(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(event_id): Path<String>,
) -> Result<Json<SuccessResponse>> {
    let runner = caller(&state, &user).await?;
    state
        .registrations
        .unregister(&event_id, &runner.id, chrono::Utc::now())
        .await?;

    Ok(Json(SuccessResponse { success: true }))
}

async fn list_registrations(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(event_id): Path<String>,
) -> Result<Json<RegistrationsResponse>> {
    let event = state.events.get(&event_id).await?;
    let registrations = state.registrations.list_for_event(&event_id).await?;
    let groups = group_by_distance(&event, &registrations);

    let user_registration = match user {
        Some(user) => match state.runners.get_by_identity(&user.identity_key).await? {
            Some(runner) => {
                state
                    .registrations
                    .caller_registration(&event_id, &runner.id)
                    .await?
            }
            None => None,
        },
        None => None,
    };

    Ok(Json(RegistrationsResponse {
        registrations,
        user_registration,
        groups,
    }))
}
