// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Runner directory: profile lookups and self-service edits.

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::{Runner, RunnerProfile};
use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt, TryStreamExt};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use validator::Validate;

/// Concurrent profile lookups when joining runners onto other records.
const PROFILE_FETCH_CONCURRENCY: usize = 8;

/// Editable profile fields.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub bio: Option<String>,
    #[validate(url)]
    pub avatar_url: Option<String>,
}

pub struct RunnerDirectory {
    store: Arc<dyn Store>,
}

impl RunnerDirectory {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: &str) -> Result<Runner> {
        self.store
            .get_runner(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Runner not found".to_string()))
    }

    /// Runner mirrored from the given identity, for an authenticated caller.
    ///
    /// A valid session whose identity was never synced has no profile yet.
    pub async fn require_caller(&self, identity_key: &str) -> Result<Runner> {
        self.store
            .get_runner_by_identity(identity_key)
            .await?
            .ok_or_else(|| AppError::NotFound("Runner not found".to_string()))
    }

    pub async fn get_by_identity(&self, identity_key: &str) -> Result<Option<Runner>> {
        self.store.get_runner_by_identity(identity_key).await
    }

    /// All runners, ordered by display name.
    pub async fn list(&self) -> Result<Vec<Runner>> {
        let mut runners = self.store.list_runners().await?;
        runners.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(runners)
    }

    /// Edit a profile. Runners may edit themselves; admins may edit anyone.
    pub async fn update_profile(
        &self,
        editor: &Runner,
        runner_id: &str,
        update: ProfileUpdate,
        now: DateTime<Utc>,
    ) -> Result<Runner> {
        if editor.id != runner_id && !editor.is_admin {
            return Err(AppError::Forbidden(
                "Cannot edit another runner's profile".to_string(),
            ));
        }

        let update = ProfileUpdate {
            name: update.name.trim().to_string(),
            bio: update.bio.map(|b| b.trim().to_string()).filter(|b| !b.is_empty()),
            avatar_url: update
                .avatar_url
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty()),
        };
        update
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        if let Some(url) = &update.avatar_url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(AppError::Validation(
                    "avatar_url must be an http(s) URL".to_string(),
                ));
            }
        }

        let mut runner = self.get(runner_id).await?;
        runner.name = update.name;
        runner.bio = update.bio;
        runner.avatar_url = update.avatar_url;
        runner.updated_at = now;
        self.store.put_runner(&runner).await?;

        tracing::info!(runner_id = %runner.id, editor_id = %editor.id, "Runner profile edited");
        Ok(runner)
    }

    /// Public profiles for a set of runner IDs. Unknown IDs are omitted.
    pub async fn profiles<'a, I>(&self, ids: I) -> Result<HashMap<String, RunnerProfile>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let unique: BTreeSet<String> = ids.into_iter().map(str::to_string).collect();

        // Owned ids and store handles keep the lookup futures Send.
        let store = self.store.clone();
        let found: Vec<Option<Runner>> = stream::iter(unique)
            .map(move |id| {
                let store = store.clone();
                async move { store.get_runner(&id).await }
            })
            .buffer_unordered(PROFILE_FETCH_CONCURRENCY)
            .try_collect()
            .await?;

        Ok(found
            .into_iter()
            .flatten()
            .map(|r| (r.id.clone(), RunnerProfile::from(&r)))
            .collect())
    }
}
