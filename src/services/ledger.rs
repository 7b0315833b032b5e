// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration ledger: who is running which distance at which event.

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::{Event, EventRegistration, RegistrationStatus, RunnerProfile};
use crate::services::RunnerDirectory;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Active registration joined with the runner's public profile.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Registrant {
    #[serde(flatten)]
    pub registration: EventRegistration,
    /// Canonical selected labels
    pub selections: Vec<String>,
    /// Missing if the runner record no longer exists
    pub runner: Option<RunnerProfile>,
}

/// Registrants sharing one distance label.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DistanceGroup {
    pub distance: String,
    pub runners: Vec<Registrant>,
}

pub struct RegistrationLedger {
    store: Arc<dyn Store>,
    directory: Arc<RunnerDirectory>,
}

impl RegistrationLedger {
    pub fn new(store: Arc<dyn Store>, directory: Arc<RunnerDirectory>) -> Self {
        Self { store, directory }
    }

    /// Register (or re-register) a runner with the given distance labels.
    pub async fn register(
        &self,
        event_id: &str,
        runner_id: &str,
        selections: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<EventRegistration> {
        let selections = normalize_selections(selections);
        if selections.is_empty() {
            return Err(AppError::EmptySelection);
        }

        let event = self.event(event_id).await?;
        if event.is_past_at(now) {
            return Err(AppError::EventClosed(
                "Cannot register for past events".to_string(),
            ));
        }

        let declared = event.distance_options();
        let invalid: Vec<String> = selections
            .iter()
            .filter(|s| !declared.contains(s))
            .cloned()
            .collect();
        if !invalid.is_empty() {
            return Err(AppError::InvalidSelection(invalid));
        }

        let created_at = self
            .store
            .get_registration(event_id, runner_id)
            .await?
            .map(|existing| existing.created_at)
            .unwrap_or(now);

        let registration =
            EventRegistration::registered(event_id, runner_id, selections, created_at, now);
        self.store.put_registration(&registration).await?;

        tracing::info!(
            event_id,
            runner_id,
            selections = ?registration.selected_distances,
            "Runner registered"
        );
        Ok(registration)
    }

    /// Cancel a registration. Missing records are left alone.
    pub async fn unregister(
        &self,
        event_id: &str,
        runner_id: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let event = self.event(event_id).await?;
        if event.has_started(now) {
            return Err(AppError::EventClosed(
                "Cannot unregister from past events".to_string(),
            ));
        }

        let Some(mut registration) = self.store.get_registration(event_id, runner_id).await? else {
            tracing::debug!(event_id, runner_id, "Unregister without registration");
            return Ok(());
        };

        registration.status = RegistrationStatus::Cancelled;
        registration.updated_at = now;
        self.store.put_registration(&registration).await?;

        tracing::info!(event_id, runner_id, "Runner unregistered");
        Ok(())
    }

    /// Active registrations for an event, oldest first.
    pub async fn list_for_event(&self, event_id: &str) -> Result<Vec<Registrant>> {
        let mut registrations = self.store.list_active_registrations(event_id).await?;
        registrations.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.runner_id.cmp(&b.runner_id))
        });

        let mut profiles = self
            .directory
            .profiles(registrations.iter().map(|r| r.runner_id.as_str()))
            .await?;

        Ok(registrations
            .into_iter()
            .map(|registration| Registrant {
                selections: registration.selections(),
                runner: profiles.remove(&registration.runner_id),
                registration,
            })
            .collect())
    }

    /// The runner's active registration for an event, if any.
    pub async fn caller_registration(
        &self,
        event_id: &str,
        runner_id: &str,
    ) -> Result<Option<EventRegistration>> {
        Ok(self
            .store
            .get_registration(event_id, runner_id)
            .await?
            .filter(EventRegistration::is_active))
    }

    async fn event(&self, event_id: &str) -> Result<Event> {
        self.store
            .get_event(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
    }
}

/// Trim, drop blanks and de-duplicate while keeping submission order.
fn normalize_selections(selections: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(selections.len());
    for label in selections {
        let label = label.trim();
        if !label.is_empty() && !seen.iter().any(|s: &String| s == label) {
            seen.push(label.to_string());
        }
    }
    seen
}

/// Group registrants by selected distance.
///
/// A registrant with several labels appears once per label. Groups follow the
/// event's declared label order; labels no longer declared follow in the
/// order they are first seen.
pub fn group_by_distance(event: &Event, registrants: &[Registrant]) -> Vec<DistanceGroup> {
    let mut groups: Vec<DistanceGroup> = event
        .distance_options()
        .into_iter()
        .map(|distance| DistanceGroup {
            distance,
            runners: Vec::new(),
        })
        .collect();

    for registrant in registrants {
        for label in &registrant.selections {
            let idx = match groups.iter().position(|g| &g.distance == label) {
                Some(idx) => idx,
                None => {
                    groups.push(DistanceGroup {
                        distance: label.clone(),
                        runners: Vec::new(),
                    });
                    groups.len() - 1
                }
            };
            groups[idx].runners.push(registrant.clone());
        }
    }

    groups.retain(|g| !g.runners.is_empty());
    groups
}
