#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use govern_api::auth::{generate_token, Claims, IdentityProvider, JwtIdentity};
use govern_api::config::AppConfig;
use govern_api::database::{MemoryStore, Store};
use govern_api::state::AppState;
use govern_api::storage::{MemoryStorage, ObjectStorage};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const AUDIENCE: &str = "authenticated";
pub const SESSION_COOKIE: &str = "sb-access-token";

/// Session token for `user`, signed the way the platform signs access tokens
pub fn token_for(user: &str) -> String {
    let claims = Claims::new(
        user,
        Some(format!("{}@example.com", user)),
        Some(AUDIENCE.to_string()),
        chrono::Duration::hours(1),
    );
    generate_token(&claims, TEST_SECRET).expect("failed to sign test token")
}

// ---------------------------------------------------------------------------
// In-process router over the memory backends
// ---------------------------------------------------------------------------

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub storage: Arc<MemoryStorage>,
    app: Router,
}

pub struct Reply {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: Value,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_identity(Arc::new(JwtIdentity::new(TEST_SECRET, Some(AUDIENCE))))
    }

    /// Same memory backends, sessions resolved by `identity`
    pub fn with_identity(identity: Arc<dyn IdentityProvider>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let storage = Arc::new(MemoryStorage::new(
            "http://localhost:3000/storage/v1",
            "evidence",
        ));
        let state = AppState::new(
            store.clone() as Arc<dyn Store>,
            identity,
            storage.clone() as Arc<dyn ObjectStorage>,
            SESSION_COOKIE,
        );
        let app = govern_api::app(state, &AppConfig::development().security);

        Self { store, storage, app }
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: &str) -> Reply {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn get(&self, path: &str, headers: &[(&str, &str)]) -> Reply {
        let mut builder = Request::builder().method("GET").uri(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> Reply {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        Reply {
            status,
            location,
            body,
        }
    }

    /// Create an organization as `token` and return its id
    pub async fn create_org(&self, token: &str, name: &str) -> String {
        let reply = self
            .post("/api/orgs", Some(token), &format!(r#"{{"name":"{}"}}"#, name))
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{:?}", reply.body);
        reply.body["org"]["id"].as_str().unwrap().to_string()
    }

    pub async fn create_system(&self, token: &str, org_id: &str) -> String {
        let reply = self
            .post(
                "/api/systems",
                Some(token),
                &format!(r#"{{"organizationId":"{}","name":"Credit scoring"}}"#, org_id),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{:?}", reply.body);
        reply.body["system"]["id"].as_str().unwrap().to_string()
    }

    pub async fn create_assessment(&self, token: &str, org_id: &str, system_id: &str) -> String {
        let reply = self
            .post(
                "/api/assessments",
                Some(token),
                &format!(
                    r#"{{"organizationId":"{}","systemId":"{}"}}"#,
                    org_id, system_id
                ),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{:?}", reply.body);
        reply.body["assessment"]["id"].as_str().unwrap().to_string()
    }
}

/// Check `path` against `org_<org>/ass_<assessment>/q_<question>/<millis>-<token8>-<filename>`
pub fn assert_evidence_path(path: &str, org: &str, assessment: &str, question: i64, filename: &str) {
    let parts: Vec<&str> = path.split('/').collect();
    assert_eq!(parts.len(), 4, "unexpected path {}", path);
    assert_eq!(parts[0], format!("org_{}", org));
    assert_eq!(parts[1], format!("ass_{}", assessment));
    assert_eq!(parts[2], format!("q_{}", question));

    let mut name = parts[3].splitn(3, '-');
    let millis = name.next().unwrap();
    let token = name.next().unwrap();
    let rest = name.next().unwrap();
    assert!(millis.parse::<i64>().is_ok(), "bad timestamp in {}", path);
    assert_eq!(token.len(), 8);
    assert!(token
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    assert_eq!(rest, filename);
}

// ---------------------------------------------------------------------------
// Spawned server binary
// ---------------------------------------------------------------------------

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Memory backends and a known secret, so no database or platform is needed
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_govern-api"));
        cmd.arg("serve")
            .env("APP_ENV", "development")
            .env("HOST", "127.0.0.1")
            .env("PORT", port.to_string())
            .env("APP_BACKEND", "memory")
            .env("STORAGE_BACKEND", "memory")
            .env("AUTH_MODE", "jwt")
            .env("SUPABASE_JWT_SECRET", TEST_SECRET)
            .env("AUTH_JWT_AUDIENCE", AUDIENCE)
            .env("AUTH_SESSION_COOKIE", SESSION_COOKIE)
            .env("SECURITY_CORS_ORIGINS", "*")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}
