// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event catalog: create, edit and list scheduled runs.

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::event::{join_distance_options, parse_distance_options};
use crate::models::{Event, RecurrencePattern};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// Which slice of the calendar to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventFilter {
    Upcoming,
    Past,
    #[default]
    All,
}

/// Editable event fields, as submitted by the event form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct EventFields {
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    #[validate(length(max = 500))]
    pub location: Option<String>,
    /// Distance labels as a list
    #[serde(default)]
    pub distances: Vec<String>,
    /// Distance labels as one comma-separated string
    #[serde(default)]
    pub distance: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurrence_pattern: Option<String>,
}

/// Fields after validation and normalization.
struct NormalizedFields {
    title: String,
    description: Option<String>,
    event_date: DateTime<Utc>,
    location: Option<String>,
    distance: Option<String>,
    is_recurring: bool,
    recurrence_pattern: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl EventFields {
    fn normalize(self) -> Result<NormalizedFields> {
        self.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let title =
            non_empty(self.title).ok_or_else(|| AppError::Validation("Title is required".into()))?;
        let event_date = self
            .event_date
            .ok_or_else(|| AppError::Validation("Event date is required".into()))?;

        let mut labels = self.distances;
        labels.extend(parse_distance_options(self.distance.as_deref()));

        let recurrence_pattern = if self.is_recurring {
            let raw = non_empty(self.recurrence_pattern);
            let pattern = match raw.as_deref() {
                None => RecurrencePattern::Weekly,
                Some(raw) => RecurrencePattern::parse(raw).ok_or_else(|| {
                    AppError::Validation(format!("Unsupported recurrence pattern: {}", raw))
                })?,
            };
            Some(pattern.as_str().to_string())
        } else {
            None
        };

        Ok(NormalizedFields {
            title,
            description: non_empty(self.description),
            event_date,
            location: non_empty(self.location),
            distance: join_distance_options(&labels),
            is_recurring: self.is_recurring,
            recurrence_pattern,
        })
    }
}

pub struct EventCatalog {
    store: Arc<dyn Store>,
}

impl EventCatalog {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        fields: EventFields,
        owner_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Event> {
        let fields = fields.normalize()?;

        let event = Event {
            id: uuid::Uuid::new_v4().to_string(),
            title: fields.title,
            description: fields.description,
            event_date: fields.event_date,
            location: fields.location,
            distance: fields.distance,
            created_by: Some(owner_id.to_string()),
            is_past: fields.event_date <= now,
            is_recurring: fields.is_recurring,
            recurrence_pattern: fields.recurrence_pattern,
            created_at: now,
            updated_at: now,
        };
        self.store.put_event(&event).await?;

        tracing::info!(event_id = %event.id, title = %event.title, "Event created");
        Ok(event)
    }

    /// Replace the editable fields of an event.
    pub async fn update(&self, id: &str, fields: EventFields, now: DateTime<Utc>) -> Result<Event> {
        let fields = fields.normalize()?;
        let mut event = self.get(id).await?;

        event.title = fields.title;
        event.description = fields.description;
        event.event_date = fields.event_date;
        event.location = fields.location;
        event.distance = fields.distance;
        event.is_past = fields.event_date <= now;
        event.is_recurring = fields.is_recurring;
        event.recurrence_pattern = fields.recurrence_pattern;
        event.updated_at = now;
        self.store.put_event(&event).await?;

        tracing::info!(event_id = %event.id, "Event updated");
        Ok(event)
    }

    pub async fn get(&self, id: &str) -> Result<Event> {
        self.store
            .get_event(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
    }

    /// Events for the filter, with pastness evaluated at `now`.
    pub async fn list(&self, filter: EventFilter, now: DateTime<Utc>) -> Result<Vec<Event>> {
        let mut events: Vec<Event> = self
            .store
            .list_events()
            .await?
            .into_iter()
            .filter(|e| match filter {
                EventFilter::Upcoming => !e.is_past_at(now),
                EventFilter::Past => e.is_past_at(now),
                EventFilter::All => true,
            })
            .collect();

        events.sort_by(|a, b| a.event_date.cmp(&b.event_date).then_with(|| a.id.cmp(&b.id)));
        if filter == EventFilter::Past {
            events.reverse();
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDb;
    use chrono::{Duration, TimeZone};

    fn fields(title: &str, date: DateTime<Utc>) -> EventFields {
        EventFields {
            title: Some(title.to_string()),
            event_date: Some(date),
            distances: vec![" 5K".to_string(), "10K ".to_string(), "".to_string()],
            ..Default::default()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_create_normalizes_fields() {
        let catalog = EventCatalog::new(Arc::new(MemoryDb::new()));
        let event = catalog
            .create(fields("  Sunday Long Run ", now() + Duration::days(1)), "r1", now())
            .await
            .unwrap();

        assert_eq!(event.title, "Sunday Long Run");
        assert_eq!(event.distance.as_deref(), Some("5K, 10K"));
        assert_eq!(event.created_by.as_deref(), Some("r1"));
        assert!(!event.is_past);
        assert!(event.recurrence_pattern.is_none());
    }

    #[tokio::test]
    async fn test_create_requires_title_and_date() {
        let catalog = EventCatalog::new(Arc::new(MemoryDb::new()));

        let err = catalog
            .create(fields("   ", now()), "r1", now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let mut missing_date = fields("Run", now());
        missing_date.event_date = None;
        let err = catalog.create(missing_date, "r1", now()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_recurring_defaults_to_weekly() {
        let catalog = EventCatalog::new(Arc::new(MemoryDb::new()));
        let mut f = fields("Run", now());
        f.is_recurring = true;
        let event = catalog.create(f, "r1", now()).await.unwrap();
        assert_eq!(event.recurrence_pattern.as_deref(), Some("weekly"));

        let mut f = fields("Run", now());
        f.is_recurring = true;
        f.recurrence_pattern = Some("fortnightly".to_string());
        let err = catalog.create(f, "r1", now()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_recomputes_past_and_keeps_owner() {
        let catalog = EventCatalog::new(Arc::new(MemoryDb::new()));
        let created = catalog
            .create(fields("Run", now() + Duration::days(2)), "owner", now())
            .await
            .unwrap();

        let later = now() + Duration::days(3);
        let updated = catalog
            .update(&created.id, fields("Run v2", now() + Duration::days(1)), later)
            .await
            .unwrap();

        assert!(updated.is_past);
        assert_eq!(updated.created_by.as_deref(), Some("owner"));
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.updated_at, later);
    }

    #[tokio::test]
    async fn test_list_filters_by_read_time_pastness() {
        let store = Arc::new(MemoryDb::new());
        let catalog = EventCatalog::new(store.clone());

        // Stored as upcoming, but its start has since passed.
        let stale = catalog
            .create(fields("stale", now() + Duration::hours(1)), "r1", now())
            .await
            .unwrap();
        let soon = catalog
            .create(fields("soon", now() + Duration::days(1)), "r1", now())
            .await
            .unwrap();
        let later = catalog
            .create(fields("later", now() + Duration::days(5)), "r1", now())
            .await
            .unwrap();
        let old = catalog
            .create(fields("old", now() - Duration::days(7)), "r1", now())
            .await
            .unwrap();

        let read_at = now() + Duration::hours(2);
        let ids = |events: Vec<Event>| events.into_iter().map(|e| e.id).collect::<Vec<_>>();

        assert_eq!(
            ids(catalog.list(EventFilter::Upcoming, read_at).await.unwrap()),
            vec![soon.id.clone(), later.id.clone()]
        );
        assert_eq!(
            ids(catalog.list(EventFilter::Past, read_at).await.unwrap()),
            vec![stale.id.clone(), old.id.clone()]
        );
        assert_eq!(
            ids(catalog.list(EventFilter::All, read_at).await.unwrap()),
            vec![old.id, stale.id, soon.id, later.id]
        );
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let catalog = EventCatalog::new(Arc::new(MemoryDb::new()));
        assert!(matches!(
            catalog.get("nope").await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}
