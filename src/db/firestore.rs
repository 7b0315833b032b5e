// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper implementing [`Store`].
//!
//! Collections:
//! - `runners` (profiles mirrored from the identity provider)
//! - `events` (scheduled runs)
//! - `event_registrations` (keyed by event + runner)
//! - `event_photos`
//! - `surveys` / `survey_responses` (keyed by survey + runner)

use crate::db::{collections, Store};
use crate::error::{AppError, Result};
use crate::models::{
    Event, EventPhoto, EventRegistration, RegistrationStatus, Runner, Survey, SurveyResponse,
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self> {
        // The emulator accepts any token; skip credential discovery entirely.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    // ─── Helper Methods ────────────────────────────────────────────

    async fn get_doc<T>(&self, collection: &str, id: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.client
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whole-document set under a known ID.
    async fn set_doc<T>(&self, collection: &str, id: &str, object: &T) -> Result<()>
    where
        T: Serialize + DeserializeOwned + Sync + Send,
    {
        let _: T = self
            .client
            .fluent()
            .update()
            .in_col(collection)
            .document_id(id)
            .object(object)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn list_all<T>(&self, collection: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.client
            .fluent()
            .select()
            .from(collection)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[async_trait]
impl Store for FirestoreDb {
    // ─── Runner Operations ───────────────────────────────────────

    async fn get_runner(&self, id: &str) -> Result<Option<Runner>> {
        self.get_doc(collections::RUNNERS, id).await
    }

    async fn get_runner_by_identity(&self, clerk_user_id: &str) -> Result<Option<Runner>> {
        let clerk_user_id = clerk_user_id.to_string();
        let runners: Vec<Runner> = self
            .client
            .fluent()
            .select()
            .from(collections::RUNNERS)
            .filter(move |q| q.field("clerk_user_id").eq(clerk_user_id.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(runners.into_iter().next())
    }

    async fn put_runner(&self, runner: &Runner) -> Result<()> {
        self.set_doc(collections::RUNNERS, &runner.id, runner).await
    }

    async fn list_runners(&self) -> Result<Vec<Runner>> {
        self.list_all(collections::RUNNERS).await
    }

    // ─── Event Operations ────────────────────────────────────────

    async fn get_event(&self, id: &str) -> Result<Option<Event>> {
        self.get_doc(collections::EVENTS, id).await
    }

    async fn put_event(&self, event: &Event) -> Result<()> {
        self.set_doc(collections::EVENTS, &event.id, event).await
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        self.list_all(collections::EVENTS).await
    }

    async fn list_open_recurring_events(&self) -> Result<Vec<Event>> {
        self.client
            .fluent()
            .select()
            .from(collections::EVENTS)
            .filter(|q| {
                q.for_all([
                    q.field("is_recurring").eq(true),
                    q.field("is_past").eq(false),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_recurring_event_by_title(&self, title: &str) -> Result<Option<Event>> {
        let title = title.to_string();
        let events: Vec<Event> = self
            .client
            .fluent()
            .select()
            .from(collections::EVENTS)
            .filter(move |q| {
                q.for_all([
                    q.field("title").eq(title.clone()),
                    q.field("is_recurring").eq(true),
                ])
            })
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(events.into_iter().next())
    }

    // ─── Registration Operations ─────────────────────────────────

    async fn get_registration(
        &self,
        event_id: &str,
        runner_id: &str,
    ) -> Result<Option<EventRegistration>> {
        self.get_doc(
            collections::EVENT_REGISTRATIONS,
            &EventRegistration::key(event_id, runner_id),
        )
        .await
    }

    async fn put_registration(&self, registration: &EventRegistration) -> Result<()> {
        self.set_doc(
            collections::EVENT_REGISTRATIONS,
            &registration.id,
            registration,
        )
        .await
    }

    async fn list_active_registrations(&self, event_id: &str) -> Result<Vec<EventRegistration>> {
        let event_id = event_id.to_string();
        let registered = RegistrationStatus::Registered.as_str();

        self.client
            .fluent()
            .select()
            .from(collections::EVENT_REGISTRATIONS)
            .filter(move |q| {
                q.for_all([
                    q.field("event_id").eq(event_id.clone()),
                    q.field("status").eq(registered),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Photo Operations ────────────────────────────────────────

    async fn insert_photo(&self, photo: &EventPhoto) -> Result<()> {
        let _: EventPhoto = self
            .client
            .fluent()
            .insert()
            .into(collections::EVENT_PHOTOS)
            .document_id(&photo.id)
            .object(photo)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn list_photos(&self, event_id: &str) -> Result<Vec<EventPhoto>> {
        let event_id = event_id.to_string();
        self.client
            .fluent()
            .select()
            .from(collections::EVENT_PHOTOS)
            .filter(move |q| q.field("event_id").eq(event_id.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Survey Operations ───────────────────────────────────────

    async fn put_survey(&self, survey: &Survey) -> Result<()> {
        self.set_doc(collections::SURVEYS, &survey.id, survey).await
    }

    async fn list_active_surveys(&self) -> Result<Vec<Survey>> {
        self.client
            .fluent()
            .select()
            .from(collections::SURVEYS)
            .filter(|q| q.field("is_active").eq(true))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn put_survey_response(&self, response: &SurveyResponse) -> Result<()> {
        self.set_doc(collections::SURVEY_RESPONSES, &response.id, response)
            .await
    }

    async fn get_survey_response(
        &self,
        survey_id: &str,
        runner_id: &str,
    ) -> Result<Option<SurveyResponse>> {
        self.get_doc(
            collections::SURVEY_RESPONSES,
            &SurveyResponse::key(survey_id, runner_id),
        )
        .await
    }

    async fn list_survey_responses(&self, survey_id: &str) -> Result<Vec<SurveyResponse>> {
        let survey_id = survey_id.to_string();
        self.client
            .fluent()
            .select()
            .from(collections::SURVEY_RESPONSES)
            .filter(move |q| q.field("survey_id").eq(survey_id.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
