// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token verification for identity provider JWTs.

use crate::config::{Config, SessionKeySource};
use anyhow::Context;
use axum::http::HeaderValue;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::header::CACHE_CONTROL;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
const CLOCK_SKEW_SECS: u64 = 60;

/// Caller identity extracted from a valid session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedSession {
    /// Identity provider user ID (`sub`)
    pub identity_key: String,
}

/// Session verification error categories.
#[derive(Debug, Clone)]
pub enum SessionError {
    /// The token is malformed, expired, or signed with an unknown key.
    Invalid(String),
    /// Key material could not be fetched.
    Transient(String),
}

/// Claims carried in a session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

enum VerifierMode {
    Jwks {
        url: String,
        issuer: Option<String>,
    },
    SharedSecret(Arc<DecodingKey>),
}

#[derive(Clone)]
struct JwksCacheEntry {
    keys_by_kid: HashMap<String, Arc<DecodingKey>>,
    expires_at: Instant,
}

/// Verifier for session tokens presented by the frontend.
pub struct SessionVerifier {
    http_client: reqwest::Client,
    mode: VerifierMode,
    jwks_cache: RwLock<Option<JwksCacheEntry>>,
    refresh_lock: Mutex<()>,
}

impl SessionVerifier {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building session HTTP client")?;

        let mode = match &config.session_keys {
            SessionKeySource::Jwks { url, issuer } => {
                tracing::info!(jwks_url = %url, issuer = ?issuer, "Initialized JWKS session verifier");
                VerifierMode::Jwks {
                    url: url.clone(),
                    issuer: issuer.clone(),
                }
            }
            SessionKeySource::SharedSecret(secret) => {
                if secret.is_empty() {
                    anyhow::bail!("session signing key must not be empty");
                }
                tracing::info!("Initialized shared-key session verifier");
                VerifierMode::SharedSecret(Arc::new(DecodingKey::from_secret(secret)))
            }
        };

        Ok(Self {
            http_client,
            mode,
            jwks_cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Verify a raw session token.
    pub async fn verify(&self, token: &str) -> Result<VerifiedSession, SessionError> {
        let header = decode_header(token)
            .map_err(|e| SessionError::Invalid(format!("invalid JWT header: {e}")))?;

        let (decoding_key, validation) = match &self.mode {
            VerifierMode::SharedSecret(key) => {
                if header.alg != Algorithm::HS256 {
                    return Err(SessionError::Invalid(format!(
                        "unexpected JWT alg: {:?}",
                        header.alg
                    )));
                }
                (key.clone(), base_validation(Algorithm::HS256))
            }
            VerifierMode::Jwks { issuer, .. } => {
                if header.alg != Algorithm::RS256 {
                    return Err(SessionError::Invalid(format!(
                        "unexpected JWT alg: {:?}",
                        header.alg
                    )));
                }
                let kid = header
                    .kid
                    .ok_or_else(|| SessionError::Invalid("missing JWT kid".to_string()))?;
                let key = self.decoding_key_for_kid(&kid).await?;

                let mut validation = base_validation(Algorithm::RS256);
                if let Some(issuer) = issuer {
                    validation.set_issuer(&[issuer.as_str()]);
                }
                (key, validation)
            }
        };

        let claims = decode::<SessionClaims>(token, decoding_key.as_ref(), &validation)
            .map_err(|e| SessionError::Invalid(format!("JWT validation failed: {e}")))?
            .claims;

        if claims.sub.trim().is_empty() {
            return Err(SessionError::Invalid("empty sub claim".to_string()));
        }

        Ok(VerifiedSession {
            identity_key: claims.sub,
        })
    }

    async fn decoding_key_for_kid(&self, kid: &str) -> Result<Arc<DecodingKey>, SessionError> {
        if let Some(key) = self.lookup_cached_key(kid).await {
            return Ok(key);
        }

        // Provider key rotation: retry once with a forced refresh.
        for force_refresh in [false, true] {
            self.refresh_jwks(force_refresh).await?;
            if let Some(key) = self.lookup_cached_key(kid).await {
                return Ok(key);
            }
        }

        Err(SessionError::Invalid(format!(
            "JWT kid not found in JWKS after refresh: {kid}"
        )))
    }

    async fn lookup_cached_key(&self, kid: &str) -> Option<Arc<DecodingKey>> {
        let cache = self.jwks_cache.read().await;
        let now = Instant::now();
        cache
            .as_ref()
            .filter(|entry| entry.expires_at > now)
            .and_then(|entry| entry.keys_by_kid.get(kid))
            .cloned()
    }

    async fn refresh_jwks(&self, force_refresh: bool) -> Result<(), SessionError> {
        let VerifierMode::Jwks { url, .. } = &self.mode else {
            return Ok(());
        };

        let _guard = self.refresh_lock.lock().await;

        if !force_refresh {
            let cache = self.jwks_cache.read().await;
            if cache
                .as_ref()
                .is_some_and(|entry| entry.expires_at > Instant::now())
            {
                return Ok(());
            }
        }

        tracing::debug!(jwks_url = %url, "Refreshing session JWKS cache");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| SessionError::Transient(format!("JWKS request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(SessionError::Transient(format!(
                "JWKS request returned status {}",
                response.status()
            )));
        }

        let ttl = cache_ttl_from_headers(response.headers(), DEFAULT_CACHE_TTL);

        let jwks: Jwks = response
            .json()
            .await
            .map_err(|e| SessionError::Transient(format!("invalid JWKS JSON: {e}")))?;

        let keys_by_kid = usable_keys(jwks);
        if keys_by_kid.is_empty() {
            return Err(SessionError::Transient(
                "JWKS response did not include any usable RSA keys".to_string(),
            ));
        }

        *self.jwks_cache.write().await = Some(JwksCacheEntry {
            keys_by_kid,
            expires_at: Instant::now() + ttl,
        });

        tracing::debug!(ttl_secs = ttl.as_secs(), "Session JWKS cache refreshed");
        Ok(())
    }
}

fn base_validation(alg: Algorithm) -> Validation {
    let mut validation = Validation::new(alg);
    validation.set_required_spec_claims(&["exp", "sub"]);
    // Session tokens from the provider carry no audience.
    validation.validate_aud = false;
    validation.validate_nbf = true;
    validation.leeway = CLOCK_SKEW_SECS;
    validation
}

#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    alg: Option<String>,
    n: String,
    e: String,
    #[serde(rename = "use")]
    use_: Option<String>,
}

fn usable_keys(jwks: Jwks) -> HashMap<String, Arc<DecodingKey>> {
    let mut keys_by_kid = HashMap::new();

    for jwk in jwks.keys {
        if jwk.kty != "RSA" || jwk.kid.trim().is_empty() {
            continue;
        }
        if jwk.alg.as_deref().is_some_and(|alg| alg != "RS256") {
            continue;
        }
        if jwk.use_.as_deref().is_some_and(|u| u != "sig") {
            continue;
        }

        match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
            Ok(key) => {
                keys_by_kid.insert(jwk.kid, Arc::new(key));
            }
            Err(e) => {
                tracing::warn!(error = %e, kid = %jwk.kid, "Skipping invalid RSA JWKS key");
            }
        }
    }

    keys_by_kid
}

/// Token from an `Authorization: Bearer` header, if present and well formed.
pub fn extract_bearer_token(auth_header: Option<&HeaderValue>) -> Option<&str> {
    auth_header?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn cache_ttl_from_headers(headers: &reqwest::header::HeaderMap, fallback: Duration) -> Duration {
    headers
        .get(CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_cache_control_max_age)
        .map(Duration::from_secs)
        .unwrap_or(fallback)
}

fn parse_cache_control_max_age(value: &str) -> Option<u64> {
    value.split(',').find_map(|directive| {
        directive
            .trim()
            .strip_prefix("max-age=")
            .and_then(|raw| raw.trim_matches('"').parse::<u64>().ok())
    })
}
