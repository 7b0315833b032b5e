// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event photo routes.

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::EventPhoto;
use crate::routes::caller;
use crate::services::gallery::MAX_FILE_BYTES;
use crate::services::{RejectedFile, UploadFile};
use crate::AppState;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Multipart field carrying the images.
const PHOTOS_FIELD: &str = "photos";

/// Whole-request cap: ten files at the per-file limit plus form overhead.
const UPLOAD_BODY_LIMIT: usize = 64 * 1024 * 1024;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/events/{id}/photos/upload",
            post(upload_photos).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/events/{id}/photos", get(list_photos))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UploadResponse {
    pub success: bool,
    pub count: usize,
    pub photos: Vec<EventPhoto>,
    pub rejected: Vec<RejectedFile>,
}

async fn upload_photos(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(event_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let runner = caller(&state, &user).await?;

    let mut files = Vec::new();
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(PHOTOS_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(String::from);
        let content_type = field.content_type().map(String::from);

        // Once a file is over the limit the rest of it is drained unbuffered;
        // the gallery rejects it on size alone.
        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?
        {
            if bytes.len() <= MAX_FILE_BYTES {
                bytes.extend_from_slice(&chunk);
            }
        }

        files.push(UploadFile {
            file_name,
            content_type,
            bytes,
        });
    }

    let outcome = state
        .photos
        .upload(&event_id, &runner.id, files, chrono::Utc::now())
        .await?;

    Ok(Json(UploadResponse {
        success: true,
        count: outcome.photos.len(),
        photos: outcome.photos,
        rejected: outcome.rejected,
    }))
}

async fn list_photos(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<Json<Vec<EventPhoto>>> {
    Ok(Json(state.photos.list(&event_id).await?))
}
