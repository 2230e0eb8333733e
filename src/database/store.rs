use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::models::{
    AiSystem, Assessment, Evidence, Membership, NewAssessment, NewEvidence, NewOrganization,
    NewSystem, Organization,
};
use crate::types::{ActorId, OrganizationId};

/// Errors from the backing store. Any of these means the lookup or write
/// itself failed, never that a row was absent.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Persistence seam for organizations, memberships and tenant-scoped rows.
///
/// Every method is a single round trip to the backing store. Nothing is cached
/// in-process, so membership is always read fresh.
#[async_trait]
pub trait Store: Send + Sync {
    /// Membership row for (actor, organization), if one exists
    async fn find_membership(
        &self,
        actor: &ActorId,
        organization: &OrganizationId,
    ) -> Result<Option<Membership>, StoreError>;

    /// Insert the organization and the creator's owner membership together
    async fn create_organization(
        &self,
        new: NewOrganization,
    ) -> Result<(Organization, Membership), StoreError>;

    async fn create_system(&self, new: NewSystem) -> Result<AiSystem, StoreError>;

    /// Owning organization of a system, `None` when the system does not exist
    async fn system_organization(
        &self,
        system_id: Uuid,
    ) -> Result<Option<OrganizationId>, StoreError>;

    async fn create_assessment(&self, new: NewAssessment) -> Result<Assessment, StoreError>;

    /// Owning organization of an assessment, `None` when it does not exist
    async fn assessment_organization(
        &self,
        assessment_id: Uuid,
    ) -> Result<Option<OrganizationId>, StoreError>;

    async fn record_evidence(&self, new: NewEvidence) -> Result<Evidence, StoreError>;

    /// Connectivity check for /health
    async fn ping(&self) -> Result<(), StoreError>;
}
