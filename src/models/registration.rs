// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event registration model.
//!
//! Registrations moved from a single distance (`selected_distance`) to a list
//! (`selected_distances`). Both fields are stored; readers go through
//! [`EventRegistration::selection`] so either shape yields the same labels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Registered,
    /// Soft delete; a later registration flips it back.
    Cancelled,
}

impl RegistrationStatus {
    /// Stored string form (matches the serde representation).
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Registered => "registered",
            RegistrationStatus::Cancelled => "cancelled",
        }
    }
}

/// One runner's opt-in for one event.
///
/// Document ID is [`EventRegistration::key`], which makes the (event, runner)
/// pair the upsert key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EventRegistration {
    pub id: String,
    pub event_id: String,
    pub runner_id: String,
    /// Legacy single selection (first entry of `selected_distances` on new writes)
    #[serde(default)]
    pub selected_distance: Option<String>,
    #[serde(default)]
    pub selected_distances: Option<Vec<String>>,
    pub status: RegistrationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Normalized view over the two stored selection shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceSelection<'a> {
    Multiple(&'a [String]),
    Legacy(&'a str),
    None,
}

impl DistanceSelection<'_> {
    pub fn labels(&self) -> Vec<String> {
        match self {
            DistanceSelection::Multiple(labels) => labels.to_vec(),
            DistanceSelection::Legacy(label) => vec![label.to_string()],
            DistanceSelection::None => Vec::new(),
        }
    }
}

impl EventRegistration {
    /// Document key for the (event, runner) pair.
    pub fn key(event_id: &str, runner_id: &str) -> String {
        format!("{}_{}", event_id, runner_id)
    }

    /// Build an active registration for `selections`.
    ///
    /// `created_at` should carry over from an existing record so ordering by
    /// first registration survives re-registration.
    pub fn registered(
        event_id: &str,
        runner_id: &str,
        selections: Vec<String>,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Self::key(event_id, runner_id),
            event_id: event_id.to_string(),
            runner_id: runner_id.to_string(),
            selected_distance: selections.first().cloned(),
            selected_distances: Some(selections),
            status: RegistrationStatus::Registered,
            created_at,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == RegistrationStatus::Registered
    }

    /// Which stored shape this record carries.
    pub fn selection(&self) -> DistanceSelection<'_> {
        match (&self.selected_distances, &self.selected_distance) {
            (Some(list), _) if !list.is_empty() => DistanceSelection::Multiple(list),
            (_, Some(single)) if !single.trim().is_empty() => DistanceSelection::Legacy(single),
            _ => DistanceSelection::None,
        }
    }

    /// Canonical list of selected labels.
    pub fn selections(&self) -> Vec<String> {
        self.selection().labels()
    }
}
