// handlers/root.rs - GET /, GET /health

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Govern API",
            "version": version,
            "description": "AI governance assessments: organizations, systems, assessments and evidence",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "login": "/login (public)",
                "portal": "/portal/* (session required, redirects to /login)",
                "orgs": "POST /api/orgs (session)",
                "systems": "POST /api/systems (session, member)",
                "assessments": "POST /api/assessments (session, member)",
                "evidence": "POST /api/evidence/sign (session, member)",
                "whoami": "GET /api/auth/whoami (session)",
            }
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
