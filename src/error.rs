// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("You must be registered for this event to upload photos")]
    NotRegistered,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("No active survey")]
    NoActiveSurvey,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid distance selection: {}", .0.join(", "))]
    InvalidSelection(Vec<String>),

    #[error("At least one distance must be selected")]
    EmptySelection,

    #[error("Event closed: {0}")]
    EventClosed(String),

    #[error("Photo uploads are only available during or after the event")]
    EventNotStarted,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// HTTP status for this error category.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) | AppError::NotRegistered => StatusCode::FORBIDDEN,
            AppError::NotFound(_) | AppError::NoActiveSurvey => StatusCode::NOT_FOUND,
            AppError::BadRequest(_)
            | AppError::Validation(_)
            | AppError::InvalidSelection(_)
            | AppError::EmptySelection
            | AppError::EventClosed(_)
            | AppError::EventNotStarted => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Storage(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, details) = match &self {
            AppError::Unauthorized => ("unauthorized", None),
            AppError::InvalidToken => ("invalid_token", None),
            AppError::Forbidden(msg) => ("forbidden", Some(msg.clone())),
            AppError::NotRegistered => ("not_registered", Some(self.to_string())),
            AppError::NotFound(msg) => ("not_found", Some(msg.clone())),
            AppError::NoActiveSurvey => ("no_active_survey", Some(self.to_string())),
            AppError::BadRequest(msg) => ("bad_request", Some(msg.clone())),
            AppError::Validation(msg) => ("validation_error", Some(msg.clone())),
            AppError::InvalidSelection(_) => ("invalid_selection", Some(self.to_string())),
            AppError::EmptySelection => ("empty_selection", Some(self.to_string())),
            AppError::EventClosed(msg) => ("event_closed", Some(msg.clone())),
            AppError::EventNotStarted => ("event_not_started", Some(self.to_string())),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                ("database_error", None)
            }
            AppError::Storage(msg) => {
                tracing::error!(error = %msg, "Storage error");
                ("storage_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                ("internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
