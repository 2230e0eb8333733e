use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::{Actor, AuthError, IdentityProvider, SessionCredentials};
use crate::types::ActorId;

/// Access token claims as issued by the hosted auth platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: impl Into<String>, email: Option<String>, audience: Option<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: sub.into(),
            email,
            role: Some("authenticated".to_string()),
            aud: audience,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Sign claims with the shared HS256 secret
pub fn generate_token(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::Unavailable("JWT secret not configured".to_string()));
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| AuthError::Unavailable(format!("JWT generation error: {}", e)))
}

/// Verifies platform access tokens locally; no network round trip
#[derive(Clone)]
pub struct JwtIdentity {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtIdentity {
    pub fn new(secret: &str, audience: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        Ok(token_data.claims)
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentity {
    async fn resolve(&self, credentials: &SessionCredentials) -> Result<Actor, AuthError> {
        let token = credentials.token().ok_or(AuthError::MissingCredentials)?;
        let claims = self.validate(token)?;

        if claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidToken("token has no subject".to_string()));
        }

        Ok(Actor {
            id: ActorId::new(claims.sub),
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    fn token_for(sub: &str, aud: Option<&str>, ttl: Duration) -> String {
        let claims = Claims::new(sub, Some("a@example.com".to_string()), aud.map(str::to_string), ttl);
        generate_token(&claims, SECRET).unwrap()
    }

    #[tokio::test]
    async fn resolves_subject_from_valid_token() {
        let identity = JwtIdentity::new(SECRET, Some("authenticated"));
        let token = token_for("user-1", Some("authenticated"), Duration::hours(1));

        let actor = identity.resolve(&SessionCredentials::bearer(token)).await.unwrap();
        assert_eq!(actor.id, ActorId::new("user-1"));
        assert_eq!(actor.email.as_deref(), Some("a@example.com"));
    }

    #[tokio::test]
    async fn missing_credentials_are_rejected() {
        let identity = JwtIdentity::new(SECRET, None);
        let result = identity.resolve(&SessionCredentials::default()).await;
        assert!(matches!(result, Err(AuthError::MissingCredentials)));
    }

    #[tokio::test]
    async fn expired_token_is_invalid() {
        let identity = JwtIdentity::new(SECRET, None);
        let token = token_for("user-1", None, Duration::hours(-2));
        let result = identity.resolve(&SessionCredentials::bearer(token)).await;
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn wrong_secret_or_audience_is_invalid() {
        let identity = JwtIdentity::new(SECRET, Some("authenticated"));

        let foreign = generate_token(
            &Claims::new("user-1", None, Some("authenticated".to_string()), Duration::hours(1)),
            "another-secret",
        )
        .unwrap();
        let result = identity.resolve(&SessionCredentials::bearer(foreign)).await;
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));

        let wrong_aud = token_for("user-1", Some("service"), Duration::hours(1));
        let result = identity.resolve(&SessionCredentials::bearer(wrong_aud)).await;
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn empty_subject_is_invalid() {
        let identity = JwtIdentity::new(SECRET, None);
        let token = token_for("", None, Duration::hours(1));
        let result = identity.resolve(&SessionCredentials::bearer(token)).await;
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn empty_secret_cannot_sign() {
        let claims = Claims::new("user-1", None, None, Duration::hours(1));
        assert!(generate_token(&claims, "").is_err());
    }
}
