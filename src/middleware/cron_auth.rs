// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cron trigger authentication middleware.

use crate::error::AppError;
use crate::services::session::extract_bearer_token;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Require `Authorization: Bearer <CRON_SECRET>` for `/api/cron/*` routes.
pub async fn require_cron_secret(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let presented = extract_bearer_token(request.headers().get(header::AUTHORIZATION));

    let expected = state.config.cron_secret.as_bytes();
    let authorized = !expected.is_empty()
        && presented.is_some_and(|token| bool::from(token.as_bytes().ct_eq(expected)));

    if !authorized {
        tracing::warn!(
            has_token = presented.is_some(),
            "Blocked cron request with invalid secret"
        );
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}
