// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod event;
pub mod photo;
pub mod registration;
pub mod runner;
pub mod survey;

pub use event::{Event, RecurrencePattern};
pub use photo::EventPhoto;
pub use registration::{DistanceSelection, EventRegistration, RegistrationStatus};
pub use runner::{Runner, RunnerProfile};
pub use survey::{Survey, SurveyResponse};
