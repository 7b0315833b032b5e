// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weekly "are you coming?" attendance survey.

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::{RunnerProfile, Survey, SurveyResponse};
use crate::services::RunnerDirectory;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Survey response joined with the runner's public profile.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Respondent {
    #[serde(flatten)]
    pub response: SurveyResponse,
    pub runner: Option<RunnerProfile>,
}

/// The active survey with everything the survey card shows.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActiveSurvey {
    #[serde(flatten)]
    pub survey: Survey,
    pub responses: Vec<Respondent>,
    /// Profiles of runners who answered yes
    pub coming: Vec<RunnerProfile>,
    pub user_response: Option<SurveyResponse>,
}

/// Admin request to open a new survey.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewSurvey {
    #[validate(length(min = 1, max = 500))]
    pub question: String,
    pub survey_date: NaiveDate,
}

pub struct WeeklySurvey {
    store: Arc<dyn Store>,
    directory: Arc<RunnerDirectory>,
}

impl WeeklySurvey {
    pub fn new(store: Arc<dyn Store>, directory: Arc<RunnerDirectory>) -> Self {
        Self { store, directory }
    }

    /// Most recently created active survey.
    async fn current(&self) -> Result<Option<Survey>> {
        let surveys = self.store.list_active_surveys().await?;
        Ok(surveys
            .into_iter()
            .max_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id))))
    }

    /// Active survey with responses, or `None` when no survey is open.
    pub async fn get_active(&self, caller_runner_id: Option<&str>) -> Result<Option<ActiveSurvey>> {
        let Some(survey) = self.current().await? else {
            return Ok(None);
        };

        let mut responses = self.store.list_survey_responses(&survey.id).await?;
        responses.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.runner_id.cmp(&b.runner_id))
        });

        let mut profiles = self
            .directory
            .profiles(responses.iter().map(|r| r.runner_id.as_str()))
            .await?;

        let user_response = caller_runner_id
            .and_then(|id| responses.iter().find(|r| r.runner_id == id))
            .cloned();

        let responses: Vec<Respondent> = responses
            .into_iter()
            .map(|response| Respondent {
                runner: profiles.remove(&response.runner_id),
                response,
            })
            .collect();

        let coming = responses
            .iter()
            .filter(|r| r.response.is_coming)
            .filter_map(|r| r.runner.clone())
            .collect();

        Ok(Some(ActiveSurvey {
            survey,
            responses,
            coming,
            user_response,
        }))
    }

    /// Record (or replace) the runner's answer to the active survey.
    pub async fn respond(
        &self,
        runner_id: &str,
        is_coming: bool,
        now: DateTime<Utc>,
    ) -> Result<SurveyResponse> {
        let survey = self.current().await?.ok_or(AppError::NoActiveSurvey)?;

        let created_at = self
            .store
            .get_survey_response(&survey.id, runner_id)
            .await?
            .map(|existing| existing.created_at)
            .unwrap_or(now);

        let response = SurveyResponse {
            id: SurveyResponse::key(&survey.id, runner_id),
            survey_id: survey.id.clone(),
            runner_id: runner_id.to_string(),
            is_coming,
            created_at,
            updated_at: now,
        };
        self.store.put_survey_response(&response).await?;

        tracing::info!(survey_id = %survey.id, runner_id, is_coming, "Survey response recorded");
        Ok(response)
    }

    /// Open a new survey and close any others.
    pub async fn create(&self, request: NewSurvey, now: DateTime<Utc>) -> Result<Survey> {
        let question = request.question.trim().to_string();
        let request = NewSurvey {
            question,
            survey_date: request.survey_date,
        };
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let survey = Survey {
            id: uuid::Uuid::new_v4().to_string(),
            question: request.question,
            survey_date: request.survey_date,
            is_active: true,
            created_at: now,
        };
        self.store.put_survey(&survey).await?;

        for mut other in self.store.list_active_surveys().await? {
            if other.id == survey.id {
                continue;
            }
            other.is_active = false;
            self.store.put_survey(&other).await?;
            tracing::debug!(survey_id = %other.id, "Deactivated previous survey");
        }

        tracing::info!(survey_id = %survey.id, "Survey created");
        Ok(survey)
    }
}
