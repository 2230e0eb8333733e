//! Caller identity: credentials carried by the request and the providers that
//! turn them into an [`Actor`].

pub mod jwt;
pub mod platform;

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use serde::Serialize;
use thiserror::Error;

use crate::types::ActorId;

pub use jwt::{generate_token, Claims, JwtIdentity};
pub use platform::PlatformIdentity;

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub id: ActorId,
    pub email: Option<String>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No session credentials presented")]
    MissingCredentials,

    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    /// The identity backend itself could not answer
    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Request-scoped session credentials, extracted once from the headers and
/// passed explicitly to whatever needs them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCredentials {
    pub bearer: Option<String>,
    pub cookie: Option<String>,
}

impl SessionCredentials {
    pub fn from_headers(headers: &HeaderMap, cookie_name: &str) -> Self {
        Self {
            bearer: bearer_token(headers),
            cookie: session_cookie(headers, cookie_name),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            bearer: Some(token.into()),
            cookie: None,
        }
    }

    /// Access token to verify; the Authorization header wins over the cookie
    pub fn token(&self) -> Option<&str> {
        self.bearer.as_deref().or(self.cookie.as_deref())
    }
}

/// Resolves the actor behind a set of session credentials
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, credentials: &SessionCredentials) -> Result<Actor, AuthError>;
}

/// Extract a JWT from `Authorization: Bearer <token>`
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// `(name, value)` pairs across all `Cookie` headers; a bare name has an empty value
fn cookie_pairs(headers: &HeaderMap) -> impl Iterator<Item = (&str, &str)> + '_ {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
}

/// Value of the named cookie, ignoring empty values
pub fn session_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    cookie_pairs(headers)
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Whether the named cookie was sent at all, whatever its value
pub fn has_cookie(headers: &HeaderMap, name: &str) -> bool {
    cookie_pairs(headers).any(|(key, _)| key == name)
}
