use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{Actor, AuthError, IdentityProvider, SessionCredentials};
use crate::config::platform_endpoint;
use crate::types::ActorId;

#[derive(Debug, Deserialize)]
struct PlatformUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Asks the hosted auth service who the bearer of a session token is
/// (`GET /auth/v1/user`)
#[derive(Clone)]
pub struct PlatformIdentity {
    client: reqwest::Client,
    user_endpoint: Url,
    anon_key: String,
}

impl PlatformIdentity {
    pub fn new(base_url: &Url, anon_key: impl Into<String>) -> Result<Self, url::ParseError> {
        Ok(Self {
            client: reqwest::Client::new(),
            user_endpoint: platform_endpoint(base_url, "auth/v1/user")?,
            anon_key: anon_key.into(),
        })
    }
}

#[async_trait]
impl IdentityProvider for PlatformIdentity {
    async fn resolve(&self, credentials: &SessionCredentials) -> Result<Actor, AuthError> {
        let token = credentials.token().ok_or(AuthError::MissingCredentials)?;

        let response = self
            .client
            .get(self.user_endpoint.clone())
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(AuthError::Unavailable(format!("auth service returned {}", status)));
        }
        // 401/403 and any other client error: the token was not accepted
        if !status.is_success() {
            return Err(AuthError::InvalidToken(format!("auth service returned {}", status)));
        }

        let user: PlatformUser = response
            .json()
            .await
            .map_err(|e| AuthError::Unavailable(format!("unreadable user payload: {}", e)))?;

        if user.id.trim().is_empty() {
            return Err(AuthError::InvalidToken("session has no user".to_string()));
        }

        Ok(Actor {
            id: ActorId::new(user.id),
            email: user.email,
        })
    }
}
