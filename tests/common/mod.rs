// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use runclub::config::{Config, PhotoBackend};
use runclub::db::{FirestoreDb, MemoryDb, Store};
use runclub::models::{Event, Runner};
use runclub::routes::create_router;
use runclub::services::identity::sign;
use runclub::services::session::SessionClaims;
use runclub::services::{LocalPhotoStorage, SessionVerifier};
use runclub::AppState;
use std::sync::Arc;

/// HS256 key from `Config::test_default`.
pub const TEST_SESSION_KEY: &[u8] = b"test_session_key_32_bytes_minimum!";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Test app backed by the in-memory store and a per-test photo directory.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub db: Arc<MemoryDb>,
}

/// Create a test app with offline dependencies.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    let mut config = Config::test_default();
    let dir = std::env::temp_dir().join(format!("runclub-test-{}", uuid::Uuid::new_v4()));
    let public_base_url = "http://localhost:8080/photos".to_string();
    config.photo_backend = PhotoBackend::Local {
        dir: dir.clone(),
        public_base_url: public_base_url.clone(),
    };

    let db = Arc::new(MemoryDb::new());
    let storage = Arc::new(LocalPhotoStorage::new(dir, public_base_url));
    let verifier = SessionVerifier::new(&config).expect("verifier");

    let state = Arc::new(AppState::new(config, db.clone(), storage, verifier));
    TestApp {
        router: create_router(state.clone()),
        state,
        db,
    }
}

/// Session token for an identity, signed with the test key.
#[allow(dead_code)]
pub fn session_token(identity_key: &str) -> String {
    let now = Utc::now().timestamp() as usize;
    let claims = SessionClaims {
        sub: identity_key.to_string(),
        exp: now + 3600,
        iat: Some(now),
        nbf: None,
        iss: None,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SESSION_KEY),
    )
    .unwrap()
}

/// `svix-signature` header value for `body` under the test webhook secret.
#[allow(dead_code)]
pub fn svix_signature(config: &Config, id: &str, timestamp: &str, body: &[u8]) -> String {
    let secret = config
        .identity_webhook_secret
        .strip_prefix("whsec_")
        .unwrap();
    let key = BASE64.decode(secret).unwrap();
    format!("v1,{}", BASE64.encode(sign(&key, id, timestamp, body).unwrap()))
}

/// Insert a runner whose identity key is `user_{id}`.
#[allow(dead_code)]
pub async fn seed_runner(db: &MemoryDb, id: &str, name: &str, is_admin: bool) -> Runner {
    let now = Utc::now();
    let runner = Runner {
        id: id.to_string(),
        clerk_user_id: format!("user_{}", id),
        email: format!("{}@example.com", id),
        name: name.to_string(),
        bio: None,
        avatar_url: None,
        is_admin,
        created_at: now,
        updated_at: now,
    };
    db.put_runner(&runner).await.unwrap();
    runner
}

/// Insert an event starting at `event_date` with the given distance string.
#[allow(dead_code)]
pub async fn seed_event(
    db: &MemoryDb,
    id: &str,
    event_date: DateTime<Utc>,
    distance: Option<&str>,
) -> Event {
    let created = event_date - Duration::days(7);
    let event = Event {
        id: id.to_string(),
        title: format!("Run {}", id),
        description: None,
        event_date,
        location: Some("Herastrau Park".to_string()),
        distance: distance.map(String::from),
        created_by: None,
        is_past: false,
        is_recurring: false,
        recurrence_pattern: None,
        created_at: created,
        updated_at: created,
    };
    db.put_event(&event).await.unwrap();
    event
}

/// Request builder with the session cookie for `identity_key`.
#[allow(dead_code)]
pub fn authed(method: &str, uri: &str, identity_key: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::COOKIE,
            format!("__session={}", session_token(identity_key)),
        )
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
