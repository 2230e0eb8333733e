use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::models::{
    AiSystem, Assessment, Evidence, Membership, NewAssessment, NewEvidence, NewOrganization,
    NewSystem, Organization, ROLE_OWNER, STATUS_DRAFT,
};
use super::store::{Store, StoreError};
use crate::config::DatabaseConfig;
use crate::types::{ActorId, OrganizationId};

/// Postgres-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Open a connection pool using the configured URL and sizing
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| StoreError::Unavailable("DATABASE_URL is not configured".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool (max {} connections)", config.max_connections);
        Ok(Self { pool })
    }

    /// Apply the bundled schema migrations
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_membership(
        &self,
        actor: &ActorId,
        organization: &OrganizationId,
    ) -> Result<Option<Membership>, StoreError> {
        // Compare the org id as text so a non-UUID identifier simply matches nothing
        let membership = sqlx::query_as::<_, Membership>(
            "SELECT user_id, org_id, role, created_at
             FROM members
             WHERE user_id = $1 AND org_id::text = $2",
        )
        .bind(actor.as_str())
        .bind(organization.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(membership)
    }

    async fn create_organization(
        &self,
        new: NewOrganization,
    ) -> Result<(Organization, Membership), StoreError> {
        let mut tx = self.pool.begin().await?;

        let organization = sqlx::query_as::<_, Organization>(
            "INSERT INTO organizations (id, name, sector, country, created_by, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, name, sector, country, created_by, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.sector)
        .bind(&new.country)
        .bind(new.created_by.as_str())
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        let membership = sqlx::query_as::<_, Membership>(
            "INSERT INTO members (user_id, org_id, role, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING user_id, org_id, role, created_at",
        )
        .bind(new.created_by.as_str())
        .bind(organization.id)
        .bind(ROLE_OWNER)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((organization, membership))
    }

    async fn create_system(&self, new: NewSystem) -> Result<AiSystem, StoreError> {
        let system = sqlx::query_as::<_, AiSystem>(
            "INSERT INTO systems (id, org_id, name, risk_level, description, owner, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id, org_id, name, risk_level, description, owner, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(new.org_id)
        .bind(&new.name)
        .bind(&new.risk_level)
        .bind(&new.description)
        .bind(&new.owner)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(system)
    }

    async fn system_organization(
        &self,
        system_id: Uuid,
    ) -> Result<Option<OrganizationId>, StoreError> {
        let org_id = sqlx::query_scalar::<_, Uuid>("SELECT org_id FROM systems WHERE id = $1")
            .bind(system_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(org_id.map(OrganizationId::from))
    }

    async fn create_assessment(&self, new: NewAssessment) -> Result<Assessment, StoreError> {
        let assessment = sqlx::query_as::<_, Assessment>(
            "INSERT INTO assessments (id, org_id, system_id, framework, status, created_by, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id, org_id, system_id, framework, status, created_by, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(new.org_id)
        .bind(new.system_id)
        .bind(&new.framework)
        .bind(STATUS_DRAFT)
        .bind(new.created_by.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(assessment)
    }

    async fn assessment_organization(
        &self,
        assessment_id: Uuid,
    ) -> Result<Option<OrganizationId>, StoreError> {
        let org_id =
            sqlx::query_scalar::<_, Uuid>("SELECT org_id FROM assessments WHERE id = $1")
                .bind(assessment_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(org_id.map(OrganizationId::from))
    }

    async fn record_evidence(&self, new: NewEvidence) -> Result<Evidence, StoreError> {
        let evidence = sqlx::query_as::<_, Evidence>(
            "INSERT INTO evidence (id, org_id, assessment_id, question_id, storage_path, mime, uploaded_by, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id, org_id, assessment_id, question_id, storage_path, mime, uploaded_by, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(new.org_id)
        .bind(new.assessment_id)
        .bind(new.question_id)
        .bind(&new.storage_path)
        .bind(&new.mime)
        .bind(new.uploaded_by.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(evidence)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
