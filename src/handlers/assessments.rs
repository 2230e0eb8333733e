// handlers/assessments.rs - POST /api/assessments

use axum::{body::Bytes, extract::State, http::HeaderMap, response::Json};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::{NewAssessment, DEFAULT_FRAMEWORK};
use crate::error::ApiError;
use crate::state::AppState;
use crate::types::OrganizationId;
use crate::validation::{Payload, ValidationErrors};

#[derive(Debug)]
struct CreateAssessmentInput {
    organization_id: Uuid,
    system_id: Uuid,
    framework: String,
}

impl CreateAssessmentInput {
    fn parse(body: &[u8]) -> Result<Self, ApiError> {
        let mut payload = Payload::parse(body)?;
        let organization_id = payload.uuid(&["organizationId", "orgId"]);
        let system_id = payload.uuid(&["systemId"]);
        let framework = payload.optional_string(&["framework"]);

        payload.finish(|| {
            Some(Self {
                organization_id: organization_id?,
                system_id: system_id?,
                framework: framework.unwrap_or_else(|| DEFAULT_FRAMEWORK.to_string()),
            })
        })
    }
}

pub async fn create_assessment(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let actor = state.authenticate(&headers).await?;
    let input = CreateAssessmentInput::parse(&body)?;

    let organization = OrganizationId::from(input.organization_id);
    state.guard.check(&actor.id, &organization).await.require()?;

    // Only members get this far, so a mismatch reveals nothing to outsiders
    let owner = state.store.system_organization(input.system_id).await?;
    if owner.as_ref() != Some(&organization) {
        tracing::warn!(
            "System {} is not part of organization {}",
            input.system_id,
            organization
        );
        return Err(ApiError::validation_error(ValidationErrors::field(
            "systemId",
            "System does not belong to this organization",
        )));
    }

    let assessment = state
        .store
        .create_assessment(NewAssessment {
            org_id: input.organization_id,
            system_id: input.system_id,
            framework: input.framework,
            created_by: actor.id.clone(),
        })
        .await?;

    tracing::info!(
        "Assessment {} ({}) created for system {} by {}",
        assessment.id,
        assessment.framework,
        assessment.system_id,
        actor.id
    );

    Ok(Json(json!({ "assessment": assessment })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framework_defaults() {
        let input = CreateAssessmentInput::parse(
            br#"{"organizationId":"11111111-1111-4111-8111-111111111111","systemId":"22222222-2222-4222-8222-222222222222"}"#,
        )
        .unwrap();
        assert_eq!(input.framework, DEFAULT_FRAMEWORK);
    }

    #[test]
    fn system_id_is_required() {
        match CreateAssessmentInput::parse(br#"{"organizationId":"11111111-1111-4111-8111-111111111111"}"#) {
            Err(ApiError::ValidationError(errors)) => {
                assert_eq!(errors.field_errors["systemId"], vec!["Required"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
