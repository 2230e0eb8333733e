// handlers/whoami.rs - GET /api/auth/whoami

use axum::{extract::State, http::HeaderMap, response::Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// Identity the current session resolves to
pub async fn whoami(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let actor = state.authenticate(&headers).await?;
    Ok(Json(json!({ "user": actor })))
}
