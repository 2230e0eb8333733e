use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub backend: BackendKind,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub platform: PlatformConfig,
    pub storage: StorageConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Where organizations, memberships and tenant-scoped rows live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendKind {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityMode {
    /// Verify platform-issued access tokens locally with the shared JWT secret
    Jwt,
    /// Ask the platform's auth endpoint who the bearer is
    Platform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageBackend {
    Memory,
    Platform,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub mode: IdentityMode,
    pub jwt_secret: String,
    pub jwt_audience: Option<String>,
    pub session_cookie: String,
}

/// Hosted backend-as-a-service endpoints and keys
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub service_role_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    pub public_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

const DEVELOPMENT_JWT_SECRET: &str = "development-only-jwt-secret-change-me";

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        match env::var("APP_BACKEND").as_deref() {
            Ok("memory") => self.backend = BackendKind::Memory,
            Ok("postgres") => self.backend = BackendKind::Postgres,
            _ => {}
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Auth overrides
        match env::var("AUTH_MODE").as_deref() {
            Ok("jwt") => self.auth.mode = IdentityMode::Jwt,
            Ok("platform") => self.auth.mode = IdentityMode::Platform,
            _ => {}
        }
        if let Ok(v) = env::var("SUPABASE_JWT_SECRET") {
            self.auth.jwt_secret = v;
        }
        if let Ok(v) = env::var("AUTH_JWT_AUDIENCE") {
            self.auth.jwt_audience = non_empty(v);
        }
        if let Ok(v) = env::var("AUTH_SESSION_COOKIE") {
            self.auth.session_cookie = v;
        }

        // Platform overrides
        if let Ok(v) = env::var("SUPABASE_URL") {
            self.platform.url = non_empty(v);
        }
        if let Ok(v) = env::var("SUPABASE_ANON_KEY") {
            self.platform.anon_key = non_empty(v);
        }
        if let Ok(v) = env::var("SUPABASE_SERVICE_ROLE_KEY") {
            self.platform.service_role_key = non_empty(v);
        }

        // Storage overrides
        match env::var("STORAGE_BACKEND").as_deref() {
            Ok("memory") => self.storage.backend = StorageBackend::Memory,
            Ok("platform") => self.storage.backend = StorageBackend::Platform,
            _ => {}
        }
        if let Ok(v) = env::var("STORAGE_BUCKET") {
            self.storage.bucket = v;
        }
        if let Ok(v) = env::var("STORAGE_PUBLIC_URL") {
            self.storage.public_url = v;
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        self
    }

    /// Reject combinations the server cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == BackendKind::Postgres && self.database.url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        match self.auth.mode {
            IdentityMode::Jwt if self.auth.jwt_secret.is_empty() => {
                return Err(ConfigError::Missing("SUPABASE_JWT_SECRET"));
            }
            IdentityMode::Platform => {
                self.platform_url()?;
                if self.platform.anon_key.is_none() {
                    return Err(ConfigError::Missing("SUPABASE_ANON_KEY"));
                }
            }
            _ => {}
        }

        if self.storage.backend == StorageBackend::Platform {
            self.platform_url()?;
            if self.platform.service_role_key.is_none() {
                return Err(ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY"));
            }
        }

        if self.storage.bucket.is_empty() {
            return Err(ConfigError::Invalid {
                key: "STORAGE_BUCKET",
                value: String::new(),
            });
        }

        Ok(())
    }

    /// Parsed platform base URL
    pub fn platform_url(&self) -> Result<url::Url, ConfigError> {
        let raw = self
            .platform
            .url
            .as_deref()
            .ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        url::Url::parse(raw).map_err(|_| ConfigError::Invalid {
            key: "SUPABASE_URL",
            value: raw.to_string(),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            backend: BackendKind::Memory,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            auth: AuthConfig {
                mode: IdentityMode::Jwt,
                jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
                jwt_audience: Some("authenticated".to_string()),
                session_cookie: "sb-access-token".to_string(),
            },
            platform: PlatformConfig::default(),
            storage: StorageConfig {
                backend: StorageBackend::Memory,
                bucket: "evidence".to_string(),
                public_url: "http://localhost:3000/storage/v1".to_string(),
            },
            security: SecurityConfig {
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            backend: BackendKind::Postgres,
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            auth: AuthConfig {
                mode: IdentityMode::Jwt,
                jwt_secret: String::new(),
                jwt_audience: Some("authenticated".to_string()),
                session_cookie: "sb-access-token".to_string(),
            },
            platform: PlatformConfig::default(),
            storage: StorageConfig {
                backend: StorageBackend::Platform,
                bucket: "evidence".to_string(),
                public_url: String::new(),
            },
            security: SecurityConfig {
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            backend: BackendKind::Postgres,
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            auth: AuthConfig {
                mode: IdentityMode::Jwt,
                jwt_secret: String::new(),
                jwt_audience: Some("authenticated".to_string()),
                session_cookie: "sb-access-token".to_string(),
            },
            platform: PlatformConfig::default(),
            storage: StorageConfig {
                backend: StorageBackend::Platform,
                bucket: "evidence".to_string(),
                public_url: String::new(),
            },
            security: SecurityConfig {
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }
}

/// Resolve `path` under the platform base URL, keeping any base path prefix
pub fn platform_endpoint(base: &url::Url, path: &str) -> Result<url::Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path.trim_start_matches('/'))
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.storage.bucket, "evidence");
        assert_eq!(config.auth.session_cookie, "sb-access-token");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_production_config_requires_backends() {
        let config = AppConfig::production();
        assert_eq!(config.backend, BackendKind::Postgres);
        assert_eq!(config.validate(), Err(ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn platform_storage_requires_service_role_key() {
        let mut config = AppConfig::development();
        config.storage.backend = StorageBackend::Platform;
        config.platform.url = Some("https://project.supabase.co".to_string());
        assert_eq!(
            config.validate(),
            Err(ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY"))
        );

        config.platform.service_role_key = Some("service-key".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn platform_endpoint_keeps_base_path() {
        let base = url::Url::parse("https://example.com/proxy").unwrap();
        let url = platform_endpoint(&base, "/auth/v1/user").unwrap();
        assert_eq!(url.as_str(), "https://example.com/proxy/auth/v1/user");

        let bare = url::Url::parse("https://project.supabase.co").unwrap();
        let url = platform_endpoint(&bare, "storage/v1/object").unwrap();
        assert_eq!(url.as_str(), "https://project.supabase.co/storage/v1/object");
    }

    #[test]
    fn platform_url_must_parse() {
        let mut config = AppConfig::development();
        config.auth.mode = IdentityMode::Platform;
        config.platform.url = Some("not a url".to_string());
        config.platform.anon_key = Some("anon".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { key: "SUPABASE_URL", .. })
        ));
    }
}
