// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Runclub: backend API for a weekly running group
//!
//! Runner profiles mirrored from the identity provider, scheduled runs with
//! per-distance registrations, recurring run roll-over, photo galleries and
//! a weekly attendance survey.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Store;
use services::{
    EventCatalog, IdentitySync, PhotoGallery, PhotoStorage, RecurrenceRoller, RegistrationLedger,
    RunnerDirectory, SessionVerifier, WeeklySurvey,
};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub session_verifier: SessionVerifier,
    pub runners: Arc<RunnerDirectory>,
    pub identity: IdentitySync,
    pub events: EventCatalog,
    pub registrations: RegistrationLedger,
    pub roller: RecurrenceRoller,
    pub photos: PhotoGallery,
    pub surveys: WeeklySurvey,
}

impl AppState {
    /// Wire every service onto one store and photo backend.
    pub fn new(
        config: Config,
        store: Arc<dyn Store>,
        photo_storage: Arc<dyn PhotoStorage>,
        session_verifier: SessionVerifier,
    ) -> Self {
        let runners = Arc::new(RunnerDirectory::new(store.clone()));

        Self {
            session_verifier,
            identity: IdentitySync::new(store.clone()),
            events: EventCatalog::new(store.clone()),
            registrations: RegistrationLedger::new(store.clone(), runners.clone()),
            roller: RecurrenceRoller::new(store.clone(), config.recurring_series_name.clone()),
            photos: PhotoGallery::new(store.clone(), photo_storage),
            surveys: WeeklySurvey::new(store.clone(), runners.clone()),
            runners,
            store,
            config,
        }
    }
}
