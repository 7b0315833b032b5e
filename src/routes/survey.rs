// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weekly survey routes.

use crate::error::{AppError, Result};
use crate::middleware::{ApiJson, AuthUser, MaybeAuthUser};
use crate::models::Survey;
use crate::routes::{admin_caller, caller, SuccessResponse};
use crate::services::{ActiveSurvey, NewSurvey};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/survey/active", get(get_active))
        .route("/api/survey/respond", post(respond))
        .route("/api/surveys", post(create_survey))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSurveyResponse {
    pub survey: Option<ActiveSurvey>,
    pub current_runner_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub is_coming: bool,
}

async fn get_active(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(user): MaybeAuthUser,
) -> Result<Json<ActiveSurveyResponse>> {
    let current_runner_id = match user {
        Some(user) => state
            .runners
            .get_by_identity(&user.identity_key)
            .await?
            .map(|r| r.id),
        None => None,
    };

    let survey = state
        .surveys
        .get_active(current_runner_id.as_deref())
        .await?;

    Ok(Json(ActiveSurveyResponse {
        survey,
        current_runner_id,
    }))
}

async fn respond(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    body: std::result::Result<Json<RespondRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>> {
    let Json(request) =
        body.map_err(|_| AppError::BadRequest("is_coming must be a boolean".to_string()))?;
    let runner = caller(&state, &user).await?;

    state
        .surveys
        .respond(&runner.id, request.is_coming, chrono::Utc::now())
        .await?;

    Ok(Json(SuccessResponse { success: true }))
}

async fn create_survey(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(request): ApiJson<NewSurvey>,
) -> Result<(StatusCode, Json<Survey>)> {
    admin_caller(&state, &user).await?;
    let survey = state.surveys.create(request, chrono::Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(survey)))
}
