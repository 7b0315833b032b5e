// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Photo object storage backends.
//!
//! - [`GcsPhotoStorage`]: Cloud Storage JSON upload API, authenticated with
//!   application default credentials (the service account on Cloud Run).
//! - [`LocalPhotoStorage`]: plain files in a directory (local development).

use crate::config::PhotoBackend;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use gcloud_sdk::{GoogleAuthTokenGenerator, TokenSourceType};
use std::path::PathBuf;
use std::sync::Arc;

const GCS_UPLOAD_BASE: &str = "https://storage.googleapis.com/upload/storage/v1/b";
const GCS_PUBLIC_BASE: &str = "https://storage.googleapis.com";
const GCS_WRITE_SCOPE: &str = "https://www.googleapis.com/auth/devstorage.read_write";

/// Write-once object store for uploaded photos.
#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Store `bytes` under `name` and return the public URL.
    async fn put(&self, name: &str, content_type: &str, bytes: Vec<u8>) -> Result<String>;
}

/// Build the storage backend selected by configuration.
pub async fn from_backend(backend: &PhotoBackend) -> Result<Arc<dyn PhotoStorage>> {
    Ok(match backend {
        PhotoBackend::Gcs { bucket } => Arc::new(GcsPhotoStorage::new(bucket.clone()).await?),
        PhotoBackend::Local {
            dir,
            public_base_url,
        } => Arc::new(LocalPhotoStorage::new(dir.clone(), public_base_url.clone())),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Cloud Storage
// ─────────────────────────────────────────────────────────────────────────────

/// Media upload endpoint for one object.
fn upload_url(bucket: &str, name: &str) -> String {
    format!(
        "{}/{}/o?uploadType=media&name={}",
        GCS_UPLOAD_BASE,
        bucket,
        urlencoding::encode(name)
    )
}

/// Public URL of an uploaded object.
fn public_url(bucket: &str, name: &str) -> String {
    format!("{}/{}/{}", GCS_PUBLIC_BASE, bucket, name)
}

pub struct GcsPhotoStorage {
    http: reqwest::Client,
    bucket: String,
    tokens: GoogleAuthTokenGenerator,
}

impl GcsPhotoStorage {
    /// Resolve credentials via ADC: key file, gcloud user login or the
    /// metadata server. Tokens are cached and refreshed by the generator.
    pub async fn new(bucket: String) -> Result<Self> {
        let tokens =
            GoogleAuthTokenGenerator::new(TokenSourceType::Default, vec![GCS_WRITE_SCOPE.into()])
                .await
                .map_err(|e| AppError::Storage(format!("no storage credentials: {}", e)))?;

        tracing::info!(bucket = %bucket, "Using Cloud Storage for photos");
        Ok(Self {
            http: reqwest::Client::new(),
            bucket,
            tokens,
        })
    }
}

#[async_trait]
impl PhotoStorage for GcsPhotoStorage {
    async fn put(&self, name: &str, content_type: &str, bytes: Vec<u8>) -> Result<String> {
        let token = self
            .tokens
            .create_token()
            .await
            .map_err(|e| AppError::Storage(format!("access token: {}", e)))?;
        let url = upload_url(&self.bucket, name);

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, token.header_value())
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("upload request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!("HTTP {}: {}", status, body)));
        }

        Ok(public_url(&self.bucket, name))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Local directory
// ─────────────────────────────────────────────────────────────────────────────

pub struct LocalPhotoStorage {
    dir: PathBuf,
    public_base_url: String,
}

impl LocalPhotoStorage {
    pub fn new(dir: PathBuf, public_base_url: String) -> Self {
        tracing::info!(dir = %dir.display(), "Using local directory for photos");
        Self {
            dir,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PhotoStorage for LocalPhotoStorage {
    async fn put(&self, name: &str, _content_type: &str, bytes: Vec<u8>) -> Result<String> {
        if name.contains('/') || name.contains("..") {
            return Err(AppError::Storage(format!("invalid object name: {}", name)));
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
        tokio::fs::write(self.dir.join(name), bytes)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(format!("{}/{}", self.public_base_url, name))
    }
}
