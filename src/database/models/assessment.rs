use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::ActorId;

pub const DEFAULT_FRAMEWORK: &str = "NIST AI RMF 1.0";
pub const STATUS_DRAFT: &str = "draft";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Assessment {
    pub id: Uuid,
    pub org_id: Uuid,
    pub system_id: Uuid,
    pub framework: String,
    pub status: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// New assessments always start in the draft state
#[derive(Debug, Clone)]
pub struct NewAssessment {
    pub org_id: Uuid,
    pub system_id: Uuid,
    pub framework: String,
    pub created_by: ActorId,
}
