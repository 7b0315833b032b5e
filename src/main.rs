// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Runclub API Server
//!
//! Backend for a weekly running group: runner profiles synced from the
//! identity provider, events with registrations, photos and a weekly survey.

use runclub::{
    config::{Config, StoreBackend},
    db::{FirestoreDb, MemoryDb, Store},
    services::{storage, SessionVerifier},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Runclub API");

    let store: Arc<dyn Store> = match config.store_backend {
        StoreBackend::Firestore => {
            let db = FirestoreDb::new(&config.gcp_project_id).await?;
            tracing::info!(project = %config.gcp_project_id, "Firestore connected");
            Arc::new(db)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryDb::new())
        }
    };

    let photo_storage = storage::from_backend(&config.photo_backend).await?;
    tracing::info!(backend = ?config.photo_backend, "Photo storage initialized");

    let session_verifier = SessionVerifier::new(&config)?;

    // Build shared state
    let state = Arc::new(AppState::new(
        config.clone(),
        store,
        photo_storage,
        session_verifier,
    ));

    // Build router
    let app = runclub::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in ["runclub=debug", "info"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::registry().with(filter).with(format).init();
}
