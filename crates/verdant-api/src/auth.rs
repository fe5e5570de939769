//! Bearer-token authentication against the external auth provider.
//!
//! Verdant does not manage accounts itself. Handlers receive a bearer token
//! issued by the auth provider and verify it per request via
//! `GET {base}/auth/v1/user`; the provider's user id becomes the owner id on
//! plants and identification audit rows.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use verdant_core::{Error, Result};

use crate::{ApiError, AppState};

/// Authenticated caller identity.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Verifies bearer tokens and resolves them to a user identity.
#[async_trait]
pub trait AuthVerifier: Send + Sync {
    /// Verify a raw bearer token. Invalid or expired tokens fail with
    /// [`Error::Unauthorized`].
    async fn verify(&self, token: &str) -> Result<AuthUser>;
}

#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: Uuid,
    email: Option<String>,
}

/// Verifier backed by the auth provider's user-info endpoint.
pub struct HttpAuthVerifier {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthVerifier {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl AuthVerifier for HttpAuthVerifier {
    async fn verify(&self, token: &str) -> Result<AuthUser> {
        let url = format!("{}/auth/v1/user", self.base_url.trim_end_matches('/'));
        let response = self.client.get(&url).bearer_auth(token).send().await?;

        if !response.status().is_success() {
            debug!(
                subsystem = "api",
                component = "auth",
                status = %response.status(),
                "Token verification rejected"
            );
            return Err(Error::Unauthorized(
                "Invalid or expired token".to_string(),
            ));
        }

        let user: ProviderUser = response.json().await?;
        Ok(AuthUser {
            id: user.id,
            email: user.email,
        })
    }
}

/// Extracts and verifies the `Authorization: Bearer` header.
///
/// Handlers that take an `AuthUser` argument are authenticated; a missing or
/// invalid token short-circuits with 401 before the handler body runs.
#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, ApiError> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| {
                ApiError::Unauthorized("Missing Authorization bearer token".to_string())
            })?;

        Ok(state.auth.verify(token).await?)
    }
}
