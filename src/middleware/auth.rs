// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session authentication middleware and extractors.

use crate::error::AppError;
use crate::services::session::{extract_bearer_token, SessionError};
use crate::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::convert::Infallible;
use std::sync::Arc;

/// Cookie set by the identity provider's frontend SDK.
pub const SESSION_COOKIE: &str = "__session";

/// Authenticated caller extracted from a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Identity provider user ID
    pub identity_key: String,
}

/// Middleware that resolves the session, if any, for every request.
///
/// Requests without a valid session continue unauthenticated; handlers that
/// need a caller extract [`AuthUser`], which rejects with 401.
pub async fn resolve_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    // Try cookie first, then header
    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            extract_bearer_token(request.headers().get(header::AUTHORIZATION)).map(String::from)
        });

    if let Some(token) = token {
        match state.session_verifier.verify(&token).await {
            Ok(session) => {
                request.extensions_mut().insert(AuthUser {
                    identity_key: session.identity_key,
                });
            }
            Err(SessionError::Invalid(reason)) => {
                tracing::debug!(reason = %reason, "Ignoring invalid session token");
            }
            Err(SessionError::Transient(reason)) => {
                tracing::error!(reason = %reason, "Session verification transient failure");
            }
        }
    }

    next.run(request).await
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Caller if a valid session was presented.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(parts.extensions.get::<AuthUser>().cloned()))
    }
}
