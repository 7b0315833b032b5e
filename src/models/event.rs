// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event model and recurrence rules.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Separator used when joining distance labels into the stored string.
const DISTANCE_SEPARATOR: &str = ", ";

/// A scheduled group run stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Event {
    /// Event ID (also used as document ID)
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Scheduled start
    pub event_date: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<String>,
    /// Comma-separated distance/option labels (e.g. "5K, 10K")
    #[serde(default)]
    pub distance: Option<String>,
    /// Owning runner ID
    #[serde(default)]
    pub created_by: Option<String>,
    /// Computed at write time; see [`Event::is_past_at`] for the read-time view
    pub is_past: bool,
    #[serde(default)]
    pub is_recurring: bool,
    /// Raw pattern string, parsed with [`RecurrencePattern::parse`]
    #[serde(default)]
    pub recurrence_pattern: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Declared distance labels, split on commas and trimmed.
    pub fn distance_options(&self) -> Vec<String> {
        parse_distance_options(self.distance.as_deref())
    }

    /// True once the scheduled start is at or before `now`.
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.event_date <= now
    }

    /// Pastness corrected for the window between the scheduled time and the
    /// next write that flips the stored flag.
    pub fn is_past_at(&self, now: DateTime<Utc>) -> bool {
        self.is_past || self.has_started(now)
    }
}

/// Split a stored distance string into trimmed, non-empty labels.
pub fn parse_distance_options(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

/// Join labels into the stored representation. Returns `None` for no labels.
pub fn join_distance_options(labels: &[String]) -> Option<String> {
    let labels: Vec<&str> = labels
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    if labels.is_empty() {
        None
    } else {
        Some(labels.join(DISTANCE_SEPARATOR))
    }
}

/// Supported recurrence rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrencePattern {
    Weekly,
}

impl RecurrencePattern {
    /// Parse a stored pattern string. Unknown patterns return `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "weekly" => Some(Self::Weekly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
        }
    }

    /// Start of the occurrence following one that starts at `from`.
    pub fn next_occurrence(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Weekly => from + Duration::days(7),
        }
    }
}
