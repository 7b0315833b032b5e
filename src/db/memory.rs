// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process [`Store`] for local development and tests.
//!
//! Each collection is a `DashMap` keyed by document ID, so a put on one key
//! is atomic with respect to other puts on the same key.

use crate::db::Store;
use crate::error::Result;
use crate::models::{Event, EventPhoto, EventRegistration, Runner, Survey, SurveyResponse};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Default)]
struct Collections {
    runners: DashMap<String, Runner>,
    events: DashMap<String, Event>,
    registrations: DashMap<String, EventRegistration>,
    photos: DashMap<String, EventPhoto>,
    surveys: DashMap<String, Survey>,
    survey_responses: DashMap<String, SurveyResponse>,
}

/// In-memory document store. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryDb {
    inner: Arc<Collections>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registration records (any status) for an event.
    #[cfg(test)]
    pub(crate) fn registration_count(&self, event_id: &str) -> usize {
        self.inner
            .registrations
            .iter()
            .filter(|r| r.event_id == event_id)
            .count()
    }

    /// Number of events with exactly this title.
    #[cfg(test)]
    pub(crate) fn event_count_with_title(&self, title: &str) -> usize {
        self.inner
            .events
            .iter()
            .filter(|e| e.title == title)
            .count()
    }
}

fn collect<T: Clone>(map: &DashMap<String, T>, keep: impl Fn(&T) -> bool) -> Vec<T> {
    map.iter()
        .filter(|entry| keep(entry.value()))
        .map(|entry| entry.value().clone())
        .collect()
}

#[async_trait]
impl Store for MemoryDb {
    async fn get_runner(&self, id: &str) -> Result<Option<Runner>> {
        Ok(self.inner.runners.get(id).map(|r| r.clone()))
    }

    async fn get_runner_by_identity(&self, clerk_user_id: &str) -> Result<Option<Runner>> {
        Ok(collect(&self.inner.runners, |r| r.clerk_user_id == clerk_user_id)
            .into_iter()
            .next())
    }

    async fn put_runner(&self, runner: &Runner) -> Result<()> {
        self.inner
            .runners
            .insert(runner.id.clone(), runner.clone());
        Ok(())
    }

    async fn list_runners(&self) -> Result<Vec<Runner>> {
        Ok(collect(&self.inner.runners, |_| true))
    }

    async fn get_event(&self, id: &str) -> Result<Option<Event>> {
        Ok(self.inner.events.get(id).map(|e| e.clone()))
    }

    async fn put_event(&self, event: &Event) -> Result<()> {
        self.inner.events.insert(event.id.clone(), event.clone());
        Ok(())
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        Ok(collect(&self.inner.events, |_| true))
    }

    async fn list_open_recurring_events(&self) -> Result<Vec<Event>> {
        Ok(collect(&self.inner.events, |e| e.is_recurring && !e.is_past))
    }

    async fn find_recurring_event_by_title(&self, title: &str) -> Result<Option<Event>> {
        Ok(
            collect(&self.inner.events, |e| e.is_recurring && e.title == title)
                .into_iter()
                .next(),
        )
    }

    async fn get_registration(
        &self,
        event_id: &str,
        runner_id: &str,
    ) -> Result<Option<EventRegistration>> {
        Ok(self
            .inner
            .registrations
            .get(&EventRegistration::key(event_id, runner_id))
            .map(|r| r.clone()))
    }

    async fn put_registration(&self, registration: &EventRegistration) -> Result<()> {
        self.inner
            .registrations
            .insert(registration.id.clone(), registration.clone());
        Ok(())
    }

    async fn list_active_registrations(&self, event_id: &str) -> Result<Vec<EventRegistration>> {
        Ok(collect(&self.inner.registrations, |r| {
            r.event_id == event_id && r.is_active()
        }))
    }

    async fn insert_photo(&self, photo: &EventPhoto) -> Result<()> {
        self.inner.photos.insert(photo.id.clone(), photo.clone());
        Ok(())
    }

    async fn list_photos(&self, event_id: &str) -> Result<Vec<EventPhoto>> {
        Ok(collect(&self.inner.photos, |p| p.event_id == event_id))
    }

    async fn put_survey(&self, survey: &Survey) -> Result<()> {
        self.inner.surveys.insert(survey.id.clone(), survey.clone());
        Ok(())
    }

    async fn list_active_surveys(&self) -> Result<Vec<Survey>> {
        Ok(collect(&self.inner.surveys, |s| s.is_active))
    }

    async fn put_survey_response(&self, response: &SurveyResponse) -> Result<()> {
        self.inner
            .survey_responses
            .insert(response.id.clone(), response.clone());
        Ok(())
    }

    async fn get_survey_response(
        &self,
        survey_id: &str,
        runner_id: &str,
    ) -> Result<Option<SurveyResponse>> {
        Ok(self
            .inner
            .survey_responses
            .get(&SurveyResponse::key(survey_id, runner_id))
            .map(|r| r.clone()))
    }

    async fn list_survey_responses(&self, survey_id: &str) -> Result<Vec<SurveyResponse>> {
        Ok(collect(&self.inner.survey_responses, |r| {
            r.survey_id == survey_id
        }))
    }
}
