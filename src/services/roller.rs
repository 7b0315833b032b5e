// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Recurring event roll-over, run by the scheduled cron trigger.
//!
//! Each recurring event whose start has passed is retired (`is_past`) and,
//! unless one already exists, replaced by the next occurrence.

use crate::db::Store;
use crate::error::Result;
use crate::models::{Event, RecurrencePattern};
use crate::time_utils::{format_utc_rfc3339, short_month_day};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One source event that could not be fully processed.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RollFailure {
    pub event_id: String,
    pub reason: String,
}

/// Outcome of one roll-over pass.
#[derive(Debug, Clone, Default)]
pub struct RollSummary {
    pub created: Vec<Event>,
    pub retired: Vec<String>,
    pub failures: Vec<RollFailure>,
}

/// Title of a recurring occurrence, e.g. "Herastrau Run - Feb 22".
pub fn occurrence_title(series_name: &str, date: DateTime<Utc>) -> String {
    format!("{} - {}", series_name, short_month_day(date))
}

pub struct RecurrenceRoller {
    store: Arc<dyn Store>,
    series_name: String,
}

impl RecurrenceRoller {
    pub fn new(store: Arc<dyn Store>, series_name: impl Into<String>) -> Self {
        Self {
            store,
            series_name: series_name.into(),
        }
    }

    /// Process every due recurring event. Fails only if the initial query
    /// fails; per-event problems end up in [`RollSummary::failures`].
    pub async fn roll(&self, now: DateTime<Utc>) -> Result<RollSummary> {
        let mut due: Vec<Event> = self
            .store
            .list_open_recurring_events()
            .await?
            .into_iter()
            .filter(|e| e.has_started(now))
            .collect();
        due.sort_by(|a, b| a.event_date.cmp(&b.event_date).then_with(|| a.id.cmp(&b.id)));

        tracing::info!(count = due.len(), "Rolling recurring events");

        let mut summary = RollSummary::default();
        for event in due {
            self.roll_one(event, now, &mut summary).await;
        }

        tracing::info!(
            created = summary.created.len(),
            retired = summary.retired.len(),
            failures = summary.failures.len(),
            "Recurring roll-over complete"
        );
        Ok(summary)
    }

    async fn roll_one(&self, mut event: Event, now: DateTime<Utc>, summary: &mut RollSummary) {
        match self.create_successor(&event, now).await {
            Ok(Some(next)) => summary.created.push(next),
            Ok(None) => {}
            Err(reason) => {
                tracing::warn!(event_id = %event.id, reason = %reason, "Failed to create next occurrence");
                summary.failures.push(RollFailure {
                    event_id: event.id.clone(),
                    reason,
                });
            }
        }

        // Retire the source even when no successor was made, so it is not
        // picked up again on the next run.
        event.is_past = true;
        event.updated_at = now;
        match self.store.put_event(&event).await {
            Ok(()) => summary.retired.push(event.id),
            Err(e) => {
                tracing::error!(event_id = %event.id, error = %e, "Failed to mark event as past");
                summary.failures.push(RollFailure {
                    event_id: event.id,
                    reason: format!("failed to mark event as past: {}", e),
                });
            }
        }
    }

    /// Create the next occurrence. `Ok(None)` when it already exists.
    async fn create_successor(
        &self,
        event: &Event,
        now: DateTime<Utc>,
    ) -> std::result::Result<Option<Event>, String> {
        let raw = event.recurrence_pattern.as_deref().unwrap_or_default();
        let pattern = RecurrencePattern::parse(raw)
            .ok_or_else(|| format!("unsupported recurrence pattern: {:?}", raw))?;

        let next_date = pattern.next_occurrence(event.event_date);
        let title = occurrence_title(&self.series_name, next_date);

        let existing = self
            .store
            .find_recurring_event_by_title(&title)
            .await
            .map_err(|e| format!("failed to look up {}: {}", title, e))?;
        if existing.is_some() {
            tracing::debug!(title = %title, "Next occurrence already exists");
            return Ok(None);
        }

        let next = Event {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            description: event.description.clone(),
            event_date: next_date,
            location: event.location.clone(),
            distance: event.distance.clone(),
            created_by: event.created_by.clone(),
            is_past: false,
            is_recurring: true,
            recurrence_pattern: Some(pattern.as_str().to_string()),
            created_at: now,
            updated_at: now,
        };
        self.store
            .put_event(&next)
            .await
            .map_err(|e| format!("failed to create {}: {}", next.title, e))?;

        tracing::info!(
            source_id = %event.id,
            event_id = %next.id,
            title = %next.title,
            event_date = %format_utc_rfc3339(next.event_date),
            "Created next occurrence"
        );
        Ok(Some(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_RECURRING_SERIES_NAME;
    use crate::db::MemoryDb;
    use chrono::TimeZone;

    fn recurring(id: &str, date: DateTime<Utc>, pattern: Option<&str>) -> Event {
        Event {
            id: id.to_string(),
            title: occurrence_title(DEFAULT_RECURRING_SERIES_NAME, date),
            description: Some("Easy loop".to_string()),
            event_date: date,
            location: Some("Herastrau Park".to_string()),
            distance: Some("5K, 10K".to_string()),
            created_by: Some("admin".to_string()),
            is_past: false,
            is_recurring: true,
            recurrence_pattern: pattern.map(String::from),
            created_at: date,
            updated_at: date,
        }
    }

    fn feb15() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 15, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_occurrence_title() {
        assert_eq!(
            occurrence_title("Herastrau Run", Utc.with_ymd_and_hms(2026, 2, 22, 9, 0, 0).unwrap()),
            "Herastrau Run - Feb 22"
        );
    }

    #[tokio::test]
    async fn test_roll_creates_next_week_and_retires_source() {
        let store = Arc::new(MemoryDb::new());
        store
            .put_event(&recurring("src", feb15(), Some("weekly")))
            .await
            .unwrap();
        let roller = RecurrenceRoller::new(store.clone(), DEFAULT_RECURRING_SERIES_NAME);

        let now = feb15() + chrono::Duration::hours(3);
        let summary = roller.roll(now).await.unwrap();

        assert_eq!(summary.created.len(), 1);
        let next = &summary.created[0];
        assert_eq!(next.title, "Herastrau Run - Feb 22");
        assert_eq!(next.event_date, Utc.with_ymd_and_hms(2026, 2, 22, 9, 0, 0).unwrap());
        assert_eq!(next.distance.as_deref(), Some("5K, 10K"));
        assert_eq!(next.created_by.as_deref(), Some("admin"));
        assert!(!next.is_past);

        let source = store.get_event("src").await.unwrap().unwrap();
        assert!(source.is_past);
        assert_eq!(summary.retired, vec!["src".to_string()]);
    }

    #[tokio::test]
    async fn test_roll_is_idempotent() {
        let store = Arc::new(MemoryDb::new());
        store
            .put_event(&recurring("src", feb15(), Some("weekly")))
            .await
            .unwrap();
        let roller = RecurrenceRoller::new(store.clone(), DEFAULT_RECURRING_SERIES_NAME);
        let now = feb15() + chrono::Duration::hours(3);

        roller.roll(now).await.unwrap();
        let second = roller.roll(now).await.unwrap();

        assert!(second.created.is_empty());
        assert_eq!(store.event_count_with_title("Herastrau Run - Feb 22"), 1);
    }

    #[tokio::test]
    async fn test_existing_successor_still_retires_source() {
        let store = Arc::new(MemoryDb::new());
        store
            .put_event(&recurring("src", feb15(), Some("weekly")))
            .await
            .unwrap();
        let existing = recurring("next", feb15() + chrono::Duration::days(7), Some("weekly"));
        store.put_event(&existing).await.unwrap();

        let roller = RecurrenceRoller::new(store.clone(), DEFAULT_RECURRING_SERIES_NAME);
        let summary = roller
            .roll(feb15() + chrono::Duration::hours(1))
            .await
            .unwrap();

        assert!(summary.created.is_empty());
        assert!(store.get_event("src").await.unwrap().unwrap().is_past);
        assert_eq!(store.event_count_with_title("Herastrau Run - Feb 22"), 1);
    }

    #[tokio::test]
    async fn test_future_events_are_left_alone() {
        let store = Arc::new(MemoryDb::new());
        store
            .put_event(&recurring("src", feb15(), Some("weekly")))
            .await
            .unwrap();
        let roller = RecurrenceRoller::new(store.clone(), DEFAULT_RECURRING_SERIES_NAME);

        let summary = roller
            .roll(feb15() - chrono::Duration::hours(1))
            .await
            .unwrap();

        assert!(summary.created.is_empty());
        assert!(summary.retired.is_empty());
        assert!(!store.get_event("src").await.unwrap().unwrap().is_past);
    }

    #[tokio::test]
    async fn test_unknown_pattern_reports_failure_and_retires() {
        let store = Arc::new(MemoryDb::new());
        store
            .put_event(&recurring("monthly", feb15(), Some("monthly")))
            .await
            .unwrap();
        let roller = RecurrenceRoller::new(store.clone(), DEFAULT_RECURRING_SERIES_NAME);

        let summary = roller
            .roll(feb15() + chrono::Duration::hours(1))
            .await
            .unwrap();

        assert!(summary.created.is_empty());
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].event_id, "monthly");
        assert!(store.get_event("monthly").await.unwrap().unwrap().is_past);
    }
}
