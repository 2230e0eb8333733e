// handlers/organizations.rs - POST /api/orgs

use axum::{body::Bytes, extract::State, http::HeaderMap, response::Json};
use serde_json::{json, Value};

use crate::database::models::NewOrganization;
use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::Payload;

#[derive(Debug)]
struct CreateOrganizationInput {
    name: String,
    sector: Option<String>,
    country: Option<String>,
}

impl CreateOrganizationInput {
    fn parse(body: &[u8]) -> Result<Self, ApiError> {
        let mut payload = Payload::parse(body)?;
        let name = payload.string(&["name"], 2);
        let sector = payload.optional_string(&["sector"]);
        let country = payload.optional_string(&["country"]);

        payload.finish(|| {
            Some(Self {
                name: name?,
                sector,
                country,
            })
        })
    }
}

/// Create an organization; the caller becomes its owner. Not guarded, since
/// there is no tenant yet to be a member of.
pub async fn create_organization(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let actor = state.authenticate(&headers).await?;
    let input = CreateOrganizationInput::parse(&body)?;

    let (org, membership) = state
        .store
        .create_organization(NewOrganization {
            name: input.name,
            sector: input.sector,
            country: input.country,
            created_by: actor.id.clone(),
        })
        .await?;

    tracing::info!(
        "Organization {} created by {} (role {})",
        org.id,
        actor.id,
        membership.role
    );

    Ok(Json(json!({ "org": org })))
}
