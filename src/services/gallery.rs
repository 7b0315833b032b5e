// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event photo gallery.
//!
//! Uploads open once an event has started and only for registered runners.
//! Files are validated and stored one at a time; a bad or failed file is
//! reported back without affecting the rest of the batch.

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::EventPhoto;
use crate::services::storage::PhotoStorage;
use crate::time_utils::unix_millis;
use chrono::{DateTime, Utc};
use ring::rand::{SecureRandom, SystemRandom};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub const MAX_FILES_PER_UPLOAD: usize = 10;
pub const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;
pub const ALLOWED_CONTENT_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Random bytes in the generated object name suffix.
const NAME_SUFFIX_BYTES: usize = 6;

/// One file from a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// A file that was not stored, and why.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RejectedFile {
    pub file_name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct UploadOutcome {
    pub photos: Vec<EventPhoto>,
    pub rejected: Vec<RejectedFile>,
}

pub struct PhotoGallery {
    store: Arc<dyn Store>,
    storage: Arc<dyn PhotoStorage>,
    rng: SystemRandom,
}

impl PhotoGallery {
    pub fn new(store: Arc<dyn Store>, storage: Arc<dyn PhotoStorage>) -> Self {
        Self {
            store,
            storage,
            rng: SystemRandom::new(),
        }
    }

    pub async fn upload(
        &self,
        event_id: &str,
        runner_id: &str,
        files: Vec<UploadFile>,
        now: DateTime<Utc>,
    ) -> Result<UploadOutcome> {
        let event = self
            .store
            .get_event(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        let registered = self
            .store
            .get_registration(event_id, runner_id)
            .await?
            .is_some_and(|r| r.is_active());
        if !registered {
            return Err(AppError::NotRegistered);
        }

        if !event.has_started(now) {
            return Err(AppError::EventNotStarted);
        }

        if files.is_empty() {
            return Err(AppError::Validation("No files provided".to_string()));
        }

        let mut outcome = UploadOutcome::default();
        for (index, file) in files.into_iter().enumerate() {
            let display_name = file
                .file_name
                .clone()
                .unwrap_or_else(|| format!("file {}", index + 1));

            if let Err(reason) = check_file(index, &file) {
                tracing::debug!(event_id, file = %display_name, reason = %reason, "Rejected photo");
                outcome.rejected.push(RejectedFile {
                    file_name: display_name,
                    reason,
                });
                continue;
            }

            match self.store_one(event_id, runner_id, file, now).await {
                Ok(photo) => outcome.photos.push(photo),
                Err(e) => {
                    tracing::error!(event_id, file = %display_name, error = %e, "Photo upload failed");
                    outcome.rejected.push(RejectedFile {
                        file_name: display_name,
                        reason: "upload failed".to_string(),
                    });
                }
            }
        }

        tracing::info!(
            event_id,
            runner_id,
            stored = outcome.photos.len(),
            rejected = outcome.rejected.len(),
            "Photo upload processed"
        );
        Ok(outcome)
    }

    async fn store_one(
        &self,
        event_id: &str,
        runner_id: &str,
        file: UploadFile,
        now: DateTime<Utc>,
    ) -> Result<EventPhoto> {
        let content_type = file.content_type.as_deref().unwrap_or_default();
        let extension = file_extension(file.file_name.as_deref(), content_type);
        let name = format!(
            "{}-{}-{}.{}",
            event_id,
            unix_millis(now),
            self.random_suffix()?,
            extension
        );

        let photo_url = self.storage.put(&name, content_type, file.bytes).await?;

        let photo = EventPhoto {
            id: uuid::Uuid::new_v4().to_string(),
            event_id: event_id.to_string(),
            photo_url,
            caption: None,
            uploaded_by: Some(runner_id.to_string()),
            created_at: now,
        };
        self.store.insert_photo(&photo).await?;
        Ok(photo)
    }

    fn random_suffix(&self) -> Result<String> {
        let mut bytes = [0u8; NAME_SUFFIX_BYTES];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("system RNG failure")))?;
        Ok(hex::encode(bytes))
    }

    /// Photos for an event, newest first.
    pub async fn list(&self, event_id: &str) -> Result<Vec<EventPhoto>> {
        let mut photos = self.store.list_photos(event_id).await?;
        photos.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(photos)
    }
}

fn check_file(index: usize, file: &UploadFile) -> std::result::Result<(), String> {
    if index >= MAX_FILES_PER_UPLOAD {
        return Err(format!(
            "too many files (maximum {} per upload)",
            MAX_FILES_PER_UPLOAD
        ));
    }

    let content_type = file.content_type.as_deref().unwrap_or_default();
    if !ALLOWED_CONTENT_TYPES.contains(&content_type) {
        return Err(format!(
            "invalid file type {:?}; only JPEG, PNG and WebP images are allowed",
            content_type
        ));
    }

    if file.bytes.len() > MAX_FILE_BYTES {
        return Err("file too large (maximum 5MB)".to_string());
    }

    Ok(())
}

/// Extension from the original file name, else derived from the content type.
fn file_extension(file_name: Option<&str>, content_type: &str) -> String {
    let from_name = file_name
        .and_then(|n| n.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    from_name.unwrap_or_else(|| {
        match content_type {
            "image/png" => "png",
            "image/webp" => "webp",
            _ => "jpg",
        }
        .to_string()
    })
}
