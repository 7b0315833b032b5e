// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider webhook verification and runner profile sync.
//!
//! The provider delivers user lifecycle events signed with the Svix scheme:
//! HMAC-SHA256 over `"{svix-id}.{svix-timestamp}.{body}"`, keyed with the
//! base64 part of a `whsec_` secret, sent as space-separated `v1,<base64>`
//! entries in `svix-signature`.

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::Runner;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

const SECRET_PREFIX: &str = "whsec_";
const SIGNATURE_VERSION: &str = "v1";
/// Maximum age (and future skew) accepted for a delivery timestamp.
const TIMESTAMP_TOLERANCE_SECS: u64 = 5 * 60;

/// The three signature headers of one delivery.
#[derive(Debug, Clone)]
pub struct WebhookHeaders<'a> {
    pub id: &'a str,
    pub timestamp: &'a str,
    pub signature: &'a str,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("Missing svix headers")]
    MissingHeaders,
    #[error("Webhook secret is not a valid whsec_ key")]
    InvalidSecret,
    #[error("Invalid webhook timestamp")]
    InvalidTimestamp,
    #[error("Webhook timestamp outside tolerance")]
    StaleTimestamp,
    #[error("No matching signature")]
    SignatureMismatch,
}

/// Verify a delivery against the shared signing secret.
pub fn verify_signature(
    secret: &str,
    headers: &WebhookHeaders<'_>,
    body: &[u8],
    now: DateTime<Utc>,
) -> std::result::Result<(), WebhookError> {
    let key = BASE64
        .decode(secret.strip_prefix(SECRET_PREFIX).unwrap_or(secret))
        .map_err(|_| WebhookError::InvalidSecret)?;

    let timestamp: i64 = headers
        .timestamp
        .trim()
        .parse()
        .map_err(|_| WebhookError::InvalidTimestamp)?;
    if now.timestamp().abs_diff(timestamp) > TIMESTAMP_TOLERANCE_SECS {
        return Err(WebhookError::StaleTimestamp);
    }

    let expected = sign(&key, headers.id, headers.timestamp.trim(), body)?;

    let matched = headers
        .signature
        .split_whitespace()
        .filter_map(|entry| entry.split_once(','))
        .filter(|(version, _)| *version == SIGNATURE_VERSION)
        .filter_map(|(_, sig)| BASE64.decode(sig).ok())
        .any(|candidate| bool::from(candidate.as_slice().ct_eq(expected.as_slice())));

    if matched {
        Ok(())
    } else {
        Err(WebhookError::SignatureMismatch)
    }
}

/// Raw HMAC over the signed content.
pub fn sign(
    key: &[u8],
    id: &str,
    timestamp: &str,
    body: &[u8],
) -> std::result::Result<Vec<u8>, WebhookError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| WebhookError::InvalidSecret)?;
    mac.update(id.as_bytes());
    mac.update(b".");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Webhook envelope.
#[derive(Debug, Deserialize)]
pub struct IdentityEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: serde_json::Value,
}

/// `data` payload of `user.created` / `user.updated`.
#[derive(Debug, Deserialize)]
pub struct IdentityUser {
    pub id: String,
    #[serde(default)]
    pub email_addresses: Vec<EmailAddress>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmailAddress {
    pub email_address: String,
}

impl IdentityUser {
    /// First listed email address.
    pub fn primary_email(&self) -> Option<&str> {
        self.email_addresses
            .first()
            .map(|e| e.email_address.trim())
            .filter(|e| !e.is_empty())
    }
}

/// "First Last", else whichever part exists, else the email local part.
pub fn derive_display_name(first: Option<&str>, last: Option<&str>, email: &str) -> String {
    let first = first.map(str::trim).filter(|s| !s.is_empty());
    let last = last.map(str::trim).filter(|s| !s.is_empty());

    match (first, last) {
        (Some(f), Some(l)) => format!("{} {}", f, l),
        (Some(n), None) | (None, Some(n)) => n.to_string(),
        (None, None) => email.split('@').next().unwrap_or(email).to_string(),
    }
}

/// What a delivery did to the runner directory.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    Created(Runner),
    Updated(Runner),
    /// `user.updated` for an identity we never saw created.
    UnknownIdentity(String),
    /// Event type we do not handle.
    Ignored(String),
}

/// Mirrors identity provider users into runner profiles.
pub struct IdentitySync {
    store: Arc<dyn Store>,
}

impl IdentitySync {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Apply a verified event.
    pub async fn apply(&self, event: IdentityEvent, now: DateTime<Utc>) -> Result<SyncOutcome> {
        match event.event_type.as_str() {
            "user.created" => {
                let user = parse_user(event.data)?;
                self.user_created(user, now).await
            }
            "user.updated" => {
                let user = parse_user(event.data)?;
                self.user_updated(user, now).await
            }
            other => Ok(SyncOutcome::Ignored(other.to_string())),
        }
    }

    async fn user_created(&self, user: IdentityUser, now: DateTime<Utc>) -> Result<SyncOutcome> {
        let email = user
            .primary_email()
            .ok_or_else(|| AppError::Validation("No email found".to_string()))?
            .to_string();
        let name = derive_display_name(user.first_name.as_deref(), user.last_name.as_deref(), &email);

        // Redelivery of the same creation: keep one runner per identity.
        if let Some(mut existing) = self.store.get_runner_by_identity(&user.id).await? {
            tracing::info!(
                runner_id = %existing.id,
                clerk_user_id = %user.id,
                "Runner already exists for created identity, updating"
            );
            existing.email = email;
            existing.name = name;
            existing.avatar_url = user.image_url.filter(|u| !u.is_empty());
            existing.updated_at = now;
            self.store.put_runner(&existing).await?;
            return Ok(SyncOutcome::Updated(existing));
        }

        let runner = Runner {
            id: uuid::Uuid::new_v4().to_string(),
            clerk_user_id: user.id,
            email,
            name,
            bio: None,
            avatar_url: user.image_url.filter(|u| !u.is_empty()),
            is_admin: false,
            created_at: now,
            updated_at: now,
        };
        self.store.put_runner(&runner).await?;

        tracing::info!(runner_id = %runner.id, "Runner profile created");
        Ok(SyncOutcome::Created(runner))
    }

    async fn user_updated(&self, user: IdentityUser, now: DateTime<Utc>) -> Result<SyncOutcome> {
        let email = user
            .primary_email()
            .ok_or_else(|| AppError::Validation("No email found".to_string()))?
            .to_string();
        let name = derive_display_name(user.first_name.as_deref(), user.last_name.as_deref(), &email);

        let Some(mut runner) = self.store.get_runner_by_identity(&user.id).await? else {
            tracing::warn!(clerk_user_id = %user.id, "Update for unknown identity");
            return Ok(SyncOutcome::UnknownIdentity(user.id));
        };

        runner.email = email;
        runner.name = name;
        runner.avatar_url = user.image_url.filter(|u| !u.is_empty());
        runner.updated_at = now;
        self.store.put_runner(&runner).await?;

        tracing::info!(runner_id = %runner.id, "Runner profile updated");
        Ok(SyncOutcome::Updated(runner))
    }
}

fn parse_user(data: serde_json::Value) -> Result<IdentityUser> {
    serde_json::from_value(data)
        .map_err(|e| AppError::BadRequest(format!("Invalid user payload: {}", e)))
}
