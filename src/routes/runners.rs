// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Runner directory routes.

use crate::error::Result;
use crate::middleware::{ApiJson, AuthUser};
use crate::models::{Runner, RunnerProfile};
use crate::routes::caller;
use crate::services::ProfileUpdate;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/runners", get(list_runners))
        .route("/api/runners/{id}", get(get_runner).put(update_runner))
}

/// The caller's own profile, including private fields.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MeResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub is_admin: bool,
}

impl From<Runner> for MeResponse {
    fn from(runner: Runner) -> Self {
        Self {
            id: runner.id,
            email: runner.email,
            name: runner.name,
            bio: runner.bio,
            avatar_url: runner.avatar_url,
            is_admin: runner.is_admin,
        }
    }
}

async fn get_me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<MeResponse>> {
    Ok(Json(caller(&state, &user).await?.into()))
}

async fn list_runners(State(state): State<Arc<AppState>>) -> Result<Json<Vec<RunnerProfile>>> {
    let runners = state.runners.list().await?;
    Ok(Json(runners.iter().map(RunnerProfile::from).collect()))
}

async fn get_runner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RunnerProfile>> {
    let runner = state.runners.get(&id).await?;
    Ok(Json(RunnerProfile::from(&runner)))
}

async fn update_runner(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> Result<Json<RunnerProfile>> {
    let editor = caller(&state, &user).await?;
    let runner = state
        .runners
        .update_profile(&editor, &id, update, chrono::Utc::now())
        .await?;
    Ok(Json(RunnerProfile::from(&runner)))
}
