// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event catalog routes.

use crate::error::Result;
use crate::middleware::{ApiJson, AuthUser};
use crate::models::Event;
use crate::routes::admin_caller;
use crate::services::{EventFields, EventFilter};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/events", get(list_events).post(create_event))
        .route("/api/events/{id}", get(get_event).put(update_event))
}

/// Event as returned to clients, with pastness evaluated at request time.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    /// Declared distance labels, split out of `distance`
    pub distance_options: Vec<String>,
}

impl EventView {
    pub fn at(mut event: Event, now: DateTime<Utc>) -> Self {
        event.is_past = event.is_past_at(now);
        let distance_options = event.distance_options();
        Self {
            event,
            distance_options,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListEventsQuery {
    #[serde(default)]
    pub filter: EventFilter,
}

async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<Vec<EventView>>> {
    let now = Utc::now();
    let events = state.events.list(query.filter, now).await?;
    Ok(Json(
        events.into_iter().map(|e| EventView::at(e, now)).collect(),
    ))
}

async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<EventView>> {
    let event = state.events.get(&id).await?;
    Ok(Json(EventView::at(event, Utc::now())))
}

async fn create_event(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(fields): ApiJson<EventFields>,
) -> Result<(StatusCode, Json<EventView>)> {
    let admin = admin_caller(&state, &user).await?;
    let now = Utc::now();
    let event = state.events.create(fields, &admin.id, now).await?;
    Ok((StatusCode::CREATED, Json(EventView::at(event, now))))
}

async fn update_event(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(fields): ApiJson<EventFields>,
) -> Result<Json<EventView>> {
    admin_caller(&state, &user).await?;
    let now = Utc::now();
    let event = state.events.update(&id, fields, now).await?;
    Ok(Json(EventView::at(event, now)))
}
