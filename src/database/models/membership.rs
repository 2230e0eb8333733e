use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Role granted to the actor who creates an organization
pub const ROLE_OWNER: &str = "owner";

/// (actor, organization) -> role. The role is recorded but never interpreted:
/// any membership row authorizes every gated operation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Membership {
    pub user_id: String,
    pub org_id: Uuid,
    pub role: String,
    pub created_at: DateTime<Utc>,
}
