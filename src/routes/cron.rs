// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scheduled job endpoints (called by Cloud Scheduler with the cron secret).

use crate::error::Result;
use crate::models::Event;
use crate::services::RollFailure;
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Cron routes. The secret check is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/cron/create-recurring-events",
        get(create_recurring_events),
    )
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct RollResponse {
    pub success: bool,
    pub created_count: usize,
    pub events: Vec<Event>,
    pub failures: Vec<RollFailure>,
}

async fn create_recurring_events(State(state): State<Arc<AppState>>) -> Result<Json<RollResponse>> {
    let summary = state.roller.roll(chrono::Utc::now()).await?;

    Ok(Json(RollResponse {
        success: true,
        created_count: summary.created.len(),
        events: summary.created,
        failures: summary.failures,
    }))
}
