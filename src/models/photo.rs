//! Event photo model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Uploaded image tied to an event. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EventPhoto {
    pub id: String,
    pub event_id: String,
    /// Public URL of the stored object
    pub photo_url: String,
    #[serde(default)]
    pub caption: Option<String>,
    /// Uploading runner ID
    #[serde(default)]
    pub uploaded_by: Option<String>,
    pub created_at: DateTime<Utc>,
}
