// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod catalog;
pub mod directory;
pub mod gallery;
pub mod identity;
pub mod ledger;
pub mod roller;
pub mod session;
pub mod storage;
pub mod survey;

pub use catalog::{EventCatalog, EventFields, EventFilter};
pub use directory::{ProfileUpdate, RunnerDirectory};
pub use gallery::{PhotoGallery, RejectedFile, UploadFile, UploadOutcome};
pub use identity::{IdentityEvent, IdentitySync, SyncOutcome, WebhookError, WebhookHeaders};
pub use ledger::{group_by_distance, DistanceGroup, Registrant, RegistrationLedger};
pub use roller::{RecurrenceRoller, RollFailure, RollSummary};
pub use session::{SessionError, SessionVerifier, VerifiedSession};
pub use storage::{GcsPhotoStorage, LocalPhotoStorage, PhotoStorage};
pub use survey::{ActiveSurvey, NewSurvey, Respondent, WeeklySurvey};
