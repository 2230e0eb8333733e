use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An AI system under assessment, owned by one organization
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AiSystem {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub risk_level: Option<String>,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSystem {
    pub org_id: Uuid,
    pub name: String,
    pub risk_level: Option<String>,
    pub description: Option<String>,
    pub owner: Option<String>,
}
