//! Database layer.
//!
//! [`Store`] is the seam between services and persistence. Production uses
//! [`FirestoreDb`]; [`MemoryDb`] keeps everything in-process for local runs
//! and tests.

pub mod firestore;
pub mod memory;

pub use self::firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::Result;
use crate::models::{Event, EventPhoto, EventRegistration, Runner, Survey, SurveyResponse};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const RUNNERS: &str = "runners";
    pub const EVENTS: &str = "events";
    /// Keyed by `{event_id}_{runner_id}`
    pub const EVENT_REGISTRATIONS: &str = "event_registrations";
    pub const EVENT_PHOTOS: &str = "event_photos";
    pub const SURVEYS: &str = "surveys";
    /// Keyed by `{survey_id}_{runner_id}`
    pub const SURVEY_RESPONSES: &str = "survey_responses";
}

/// Typed persistence operations used by the services.
///
/// Writes keyed by a document ID are whole-document sets, so upserts on the
/// registration and survey-response keys are last-writer-wins.
/// List operations make no ordering promise; services sort.
#[async_trait]
pub trait Store: Send + Sync {
    // ─── Runners ─────────────────────────────────────────────────
    async fn get_runner(&self, id: &str) -> Result<Option<Runner>>;
    async fn get_runner_by_identity(&self, clerk_user_id: &str) -> Result<Option<Runner>>;
    /// Create or replace a runner by ID.
    async fn put_runner(&self, runner: &Runner) -> Result<()>;
    async fn list_runners(&self) -> Result<Vec<Runner>>;

    // ─── Events ──────────────────────────────────────────────────
    async fn get_event(&self, id: &str) -> Result<Option<Event>>;
    /// Create or replace an event by ID.
    async fn put_event(&self, event: &Event) -> Result<()>;
    async fn list_events(&self) -> Result<Vec<Event>>;
    /// Recurring events whose stored `is_past` flag is still false.
    async fn list_open_recurring_events(&self) -> Result<Vec<Event>>;
    /// Recurring event with exactly this title, if any.
    async fn find_recurring_event_by_title(&self, title: &str) -> Result<Option<Event>>;

    // ─── Registrations ───────────────────────────────────────────
    async fn get_registration(
        &self,
        event_id: &str,
        runner_id: &str,
    ) -> Result<Option<EventRegistration>>;
    /// Create or replace the record for its (event, runner) key.
    async fn put_registration(&self, registration: &EventRegistration) -> Result<()>;
    /// Registrations with status `registered` for one event.
    async fn list_active_registrations(&self, event_id: &str) -> Result<Vec<EventRegistration>>;

    // ─── Photos ──────────────────────────────────────────────────
    async fn insert_photo(&self, photo: &EventPhoto) -> Result<()>;
    async fn list_photos(&self, event_id: &str) -> Result<Vec<EventPhoto>>;

    // ─── Surveys ─────────────────────────────────────────────────
    async fn put_survey(&self, survey: &Survey) -> Result<()>;
    async fn list_active_surveys(&self) -> Result<Vec<Survey>>;
    /// Create or replace the response for its (survey, runner) key.
    async fn put_survey_response(&self, response: &SurveyResponse) -> Result<()>;
    async fn get_survey_response(
        &self,
        survey_id: &str,
        runner_id: &str,
    ) -> Result<Option<SurveyResponse>>;
    async fn list_survey_responses(&self, survey_id: &str) -> Result<Vec<SurveyResponse>>;
}
