use axum::http::HeaderMap;
use std::sync::Arc;

use crate::auth::{Actor, IdentityProvider, JwtIdentity, PlatformIdentity, SessionCredentials};
use crate::config::{AppConfig, BackendKind, IdentityMode, StorageBackend};
use crate::database::{MemoryStore, PgStore, Store};
use crate::error::ApiError;
use crate::storage::{MemoryStorage, ObjectStorage, PlatformStorage};
use crate::tenancy::TenancyGuard;

/// Shared handles every request handler works with
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub guard: TenancyGuard,
    pub identity: Arc<dyn IdentityProvider>,
    pub storage: Arc<dyn ObjectStorage>,
    pub session_cookie: String,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        identity: Arc<dyn IdentityProvider>,
        storage: Arc<dyn ObjectStorage>,
        session_cookie: impl Into<String>,
    ) -> Self {
        Self {
            guard: TenancyGuard::new(store.clone()),
            store,
            identity,
            storage,
            session_cookie: session_cookie.into(),
        }
    }

    /// Build the backends selected by configuration
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let store: Arc<dyn Store> = match config.backend {
            BackendKind::Memory => {
                tracing::warn!("Using in-memory store; data is lost on restart");
                Arc::new(MemoryStore::new())
            }
            BackendKind::Postgres => Arc::new(PgStore::connect(&config.database).await?),
        };

        let identity: Arc<dyn IdentityProvider> = match config.auth.mode {
            IdentityMode::Jwt => Arc::new(JwtIdentity::new(
                &config.auth.jwt_secret,
                config.auth.jwt_audience.as_deref(),
            )),
            IdentityMode::Platform => {
                let anon_key = config.platform.anon_key.clone().unwrap_or_default();
                Arc::new(PlatformIdentity::new(&config.platform_url()?, anon_key)?)
            }
        };

        let storage: Arc<dyn ObjectStorage> = match config.storage.backend {
            StorageBackend::Memory => Arc::new(MemoryStorage::new(
                config.storage.public_url.clone(),
                config.storage.bucket.clone(),
            )),
            StorageBackend::Platform => {
                let service_key = config.platform.service_role_key.clone().unwrap_or_default();
                Arc::new(PlatformStorage::new(
                    &config.platform_url()?,
                    config.storage.bucket.clone(),
                    service_key,
                )?)
            }
        };

        Ok(Self::new(store, identity, storage, config.auth.session_cookie.clone()))
    }

    /// Resolve the caller from the request's session credentials
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Actor, ApiError> {
        let credentials = SessionCredentials::from_headers(headers, &self.session_cookie);
        Ok(self.identity.resolve(&credentials).await?)
    }
}
