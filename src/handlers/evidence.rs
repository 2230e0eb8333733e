// handlers/evidence.rs - POST /api/evidence/sign
//
// Signs a direct-to-storage upload for one answer of an assessment and
// records the evidence row. File bytes never pass through this service.

use axum::{body::Bytes, extract::State, http::HeaderMap, response::Json};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::NewEvidence;
use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::path::new_evidence_path;
use crate::validation::Payload;

#[derive(Debug)]
struct SignEvidenceInput {
    assessment_id: Uuid,
    question_id: i64,
    filename: String,
    mime: String,
}

impl SignEvidenceInput {
    fn parse(body: &[u8]) -> Result<Self, ApiError> {
        let mut payload = Payload::parse(body)?;
        let assessment_id = payload.uuid(&["assessmentId"]);
        let question_id = payload.positive_int(&["questionId"]);
        let filename = payload.string(&["filename"], 1);
        let mime = payload.string(&["mime"], 3);

        payload.finish(|| {
            Some(Self {
                assessment_id: assessment_id?,
                question_id: question_id?,
                filename: filename?,
                mime: mime?,
            })
        })
    }
}

pub async fn sign_evidence_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let actor = state.authenticate(&headers).await?;
    let input = SignEvidenceInput::parse(&body)?;

    // Unknown assessments answer exactly like foreign ones
    let organization = match state.store.assessment_organization(input.assessment_id).await? {
        Some(org) => org,
        None => {
            tracing::warn!(
                "Evidence requested by {} for unknown assessment {}",
                actor.id,
                input.assessment_id
            );
            return Err(ApiError::forbidden("forbidden"));
        }
    };

    state.guard.check(&actor.id, &organization).await.require()?;

    let org_id = organization.as_uuid().ok_or_else(|| {
        tracing::error!("Assessment {} has non-uuid organization {}", input.assessment_id, organization);
        ApiError::internal_server_error("An error occurred while processing your request")
    })?;

    let storage_path = new_evidence_path(
        &organization,
        input.assessment_id,
        input.question_id,
        &input.filename,
    );
    let signed = state.storage.create_signed_upload(&storage_path).await?;

    let evidence = state
        .store
        .record_evidence(NewEvidence {
            org_id,
            assessment_id: input.assessment_id,
            question_id: input.question_id,
            storage_path: storage_path.clone(),
            mime: input.mime,
            uploaded_by: actor.id.clone(),
        })
        .await?;

    tracing::info!(
        "Signed evidence upload {} for assessment {} question {}",
        evidence.id,
        input.assessment_id,
        input.question_id
    );

    Ok(Json(json!({
        "uploadUrl": signed.url,
        "token": signed.token,
        "storagePath": storage_path,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_request() {
        let input = SignEvidenceInput::parse(
            br#"{"assessmentId":"22222222-2222-4222-8222-222222222222","questionId":3,"filename":"report.pdf","mime":"application/pdf"}"#,
        )
        .unwrap();
        assert_eq!(input.question_id, 3);
        assert_eq!(input.filename, "report.pdf");
    }

    #[test]
    fn rejects_bad_question_and_mime() {
        match SignEvidenceInput::parse(
            br#"{"assessmentId":"22222222-2222-4222-8222-222222222222","questionId":0,"filename":"","mime":"x"}"#,
        ) {
            Err(ApiError::ValidationError(errors)) => {
                assert!(errors.field_errors.contains_key("questionId"));
                assert!(errors.field_errors.contains_key("filename"));
                assert!(errors.field_errors.contains_key("mime"));
                assert!(!errors.field_errors.contains_key("assessmentId"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
