// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! On Cloud Run, secrets are injected as environment variables through
//! secret bindings, so everything is read from the environment once at startup.

use std::env;
use std::path::PathBuf;

/// Default fixed name used when deriving recurring event titles.
pub const DEFAULT_RECURRING_SERIES_NAME: &str = "Herastrau Run";

/// Which document store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    /// In-process store (local development and tests).
    Memory,
}

/// Where uploaded photos are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoBackend {
    /// Google Cloud Storage bucket.
    Gcs { bucket: String },
    /// Local directory, served under `public_base_url`.
    Local {
        dir: PathBuf,
        public_base_url: String,
    },
}

/// How session tokens issued by the identity provider are verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionKeySource {
    /// RS256 tokens checked against the provider's JWKS.
    Jwks { url: String, issuer: Option<String> },
    /// HS256 tokens signed with a shared key (raw bytes).
    SharedSecret(Vec<u8>),
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    pub store_backend: StoreBackend,
    pub photo_backend: PhotoBackend,
    /// Fixed name prefix of derived recurring event titles
    pub recurring_series_name: String,

    // --- Secrets ---
    /// Shared secret expected in `Authorization: Bearer` on the cron trigger
    pub cron_secret: String,
    /// Identity provider webhook signing secret (`whsec_...`)
    pub identity_webhook_secret: String,
    pub session_keys: SessionKeySource,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:3000".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            store_backend: StoreBackend::Memory,
            photo_backend: PhotoBackend::Local {
                dir: env::temp_dir().join("runclub-test-photos"),
                public_base_url: "http://localhost:8080/photos".to_string(),
            },
            recurring_series_name: DEFAULT_RECURRING_SERIES_NAME.to_string(),
            cron_secret: "test_cron_secret".to_string(),
            // base64("test_webhook_secret_bytes")
            identity_webhook_secret: "whsec_dGVzdF93ZWJob29rX3NlY3JldF9ieXRlcw==".to_string(),
            session_keys: SessionKeySource::SharedSecret(
                b"test_session_key_32_bytes_minimum!".to_vec(),
            ),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file is loaded first if present (local development).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let store_backend = match env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "firestore".to_string())
            .as_str()
        {
            "firestore" => StoreBackend::Firestore,
            "memory" => StoreBackend::Memory,
            _ => return Err(ConfigError::Invalid("STORE_BACKEND")),
        };

        let photo_backend = match env::var("PHOTO_BUCKET") {
            Ok(bucket) if !bucket.trim().is_empty() => PhotoBackend::Gcs {
                bucket: bucket.trim().to_string(),
            },
            _ => PhotoBackend::Local {
                dir: env::var("PHOTO_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("./data/photos")),
                public_base_url: env::var("PHOTO_PUBLIC_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:8080/photos".to_string()),
            },
        };

        let session_keys = match env::var("SESSION_JWKS_URL") {
            Ok(url) if !url.trim().is_empty() => SessionKeySource::Jwks {
                url: url.trim().to_string(),
                issuer: env::var("SESSION_ISSUER")
                    .ok()
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty()),
            },
            _ => SessionKeySource::SharedSecret(
                env::var("SESSION_SIGNING_KEY")
                    .map_err(|_| ConfigError::Missing("SESSION_SIGNING_KEY"))?
                    .into_bytes(),
            ),
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            store_backend,
            photo_backend,
            recurring_series_name: env::var("RECURRING_SERIES_NAME")
                .unwrap_or_else(|_| DEFAULT_RECURRING_SERIES_NAME.to_string()),

            cron_secret: env::var("CRON_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("CRON_SECRET"))?,
            identity_webhook_secret: env::var("IDENTITY_WEBHOOK_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("IDENTITY_WEBHOOK_SECRET"))?,
            session_keys,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
