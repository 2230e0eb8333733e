pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod storage;
pub mod tenancy;
pub mod types;
pub mod validation;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::state::AppState;

/// Full application router
pub fn app(state: AppState, security: &SecurityConfig) -> Router {
    Router::new()
        // Public
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health))
        .route(middleware::LOGIN_PATH, get(handlers::pages::login))
        // Session-gated API
        .merge(api_routes())
        // Browser portal behind the boundary check
        .merge(portal_routes(state.clone()))
        // Global middleware
        .layer(cors_layer(security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/orgs", post(handlers::create_organization))
        .route("/api/systems", post(handlers::create_system))
        .route("/api/assessments", post(handlers::create_assessment))
        .route("/api/evidence/sign", post(handlers::sign_evidence_upload))
        .route("/api/auth/whoami", get(handlers::whoami))
}

fn portal_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/portal", get(handlers::pages::portal))
        .route("/portal/", get(handlers::pages::portal))
        .route("/portal/*rest", get(handlers::pages::portal))
        .route_layer(from_fn_with_state(state, middleware::portal_boundary))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
