// handlers/systems.rs - POST /api/systems

use axum::{body::Bytes, extract::State, http::HeaderMap, response::Json};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::NewSystem;
use crate::error::ApiError;
use crate::state::AppState;
use crate::types::OrganizationId;
use crate::validation::Payload;

#[derive(Debug)]
struct CreateSystemInput {
    organization_id: Uuid,
    name: String,
    risk_level: Option<String>,
    description: Option<String>,
    owner: Option<String>,
}

impl CreateSystemInput {
    fn parse(body: &[u8]) -> Result<Self, ApiError> {
        let mut payload = Payload::parse(body)?;
        let organization_id = payload.uuid(&["organizationId", "orgId"]);
        let name = payload.string(&["name"], 2);
        let risk_level = payload.optional_string(&["riskLevel"]);
        let description = payload.optional_string(&["description"]);
        let owner = payload.optional_string(&["owner"]);

        payload.finish(|| {
            Some(Self {
                organization_id: organization_id?,
                name: name?,
                risk_level,
                description,
                owner,
            })
        })
    }
}

pub async fn create_system(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let actor = state.authenticate(&headers).await?;
    let input = CreateSystemInput::parse(&body)?;

    let organization = OrganizationId::from(input.organization_id);
    state.guard.check(&actor.id, &organization).await.require()?;

    let system = state
        .store
        .create_system(NewSystem {
            org_id: input.organization_id,
            name: input.name,
            risk_level: input.risk_level,
            description: input.description,
            owner: input.owner,
        })
        .await?;

    tracing::info!("System {} created in organization {} by {}", system.id, organization, actor.id);

    Ok(Json(json!({ "system": system })))
}
