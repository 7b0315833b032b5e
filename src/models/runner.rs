//! Runner (member profile) model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Runner profile stored in Firestore, mirrored from the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Runner {
    /// Runner ID (also used as document ID)
    pub id: String,
    /// Stable identity provider user ID
    pub clerk_user_id: String,
    pub email: String,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub bio: Option<String>,
    /// Profile picture URL
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Granted manually in the console, never through the API
    #[serde(default)]
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public subset of a runner shown next to registrations, photos and responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RunnerProfile {
    pub id: String,
    pub name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<&Runner> for RunnerProfile {
    fn from(runner: &Runner) -> Self {
        Self {
            id: runner.id.clone(),
            name: runner.name.clone(),
            bio: runner.bio.clone(),
            avatar_url: runner.avatar_url.clone(),
        }
    }
}
