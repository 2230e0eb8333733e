use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::ActorId;

/// Audit row for a signed evidence upload. The file bytes never pass through
/// this service; only the storage location is recorded.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Evidence {
    pub id: Uuid,
    pub org_id: Uuid,
    pub assessment_id: Uuid,
    pub question_id: i64,
    pub storage_path: String,
    pub mime: String,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEvidence {
    pub org_id: Uuid,
    pub assessment_id: Uuid,
    pub question_id: i64,
    pub storage_path: String,
    pub mime: String,
    pub uploaded_by: ActorId,
}
