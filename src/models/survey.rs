// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weekly attendance survey models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Survey {
    pub id: String,
    pub question: String,
    /// Week the survey is about
    pub survey_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// One runner's answer. Document ID is [`SurveyResponse::key`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SurveyResponse {
    pub id: String,
    pub survey_id: String,
    pub runner_id: String,
    pub is_coming: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SurveyResponse {
    /// Document key for the (survey, runner) pair.
    pub fn key(survey_id: &str, runner_id: &str) -> String {
        format!("{}_{}", survey_id, runner_id)
    }
}
