use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{
    AiSystem, Assessment, Evidence, Membership, NewAssessment, NewEvidence, NewOrganization,
    NewSystem, Organization, ROLE_OWNER, STATUS_DRAFT,
};
use super::store::{Store, StoreError};
use crate::types::{ActorId, OrganizationId};

#[derive(Default)]
struct Tables {
    organizations: Vec<Organization>,
    memberships: Vec<Membership>,
    systems: Vec<AiSystem>,
    assessments: Vec<Assessment>,
    evidence: Vec<Evidence>,
}

/// In-process store for local development and tests.
///
/// Counts membership lookups and can be switched into an unavailable state,
/// so callers can observe whether (and how) the guard touched the store.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    membership_lookups: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of membership lookups served so far
    pub fn membership_lookups(&self) -> usize {
        self.membership_lookups.load(Ordering::SeqCst)
    }

    /// Make every subsequent call fail as if the database were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Provision a membership directly (used by seeding and tests)
    pub async fn add_membership(&self, actor: &ActorId, org_id: Uuid, role: &str) {
        let mut tables = self.tables.write().await;
        tables
            .memberships
            .retain(|m| !(m.user_id == actor.as_str() && m.org_id == org_id));
        tables.memberships.push(Membership {
            user_id: actor.as_str().to_string(),
            org_id,
            role: role.to_string(),
            created_at: Utc::now(),
        });
    }

    pub async fn memberships(&self) -> Vec<Membership> {
        self.tables.read().await.memberships.clone()
    }

    pub async fn organizations(&self) -> Vec<Organization> {
        self.tables.read().await.organizations.clone()
    }

    pub async fn assessments(&self) -> Vec<Assessment> {
        self.tables.read().await.assessments.clone()
    }

    pub async fn evidence(&self) -> Vec<Evidence> {
        self.tables.read().await.evidence.clone()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_membership(
        &self,
        actor: &ActorId,
        organization: &OrganizationId,
    ) -> Result<Option<Membership>, StoreError> {
        self.membership_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let tables = self.tables.read().await;
        Ok(tables
            .memberships
            .iter()
            .find(|m| {
                m.user_id == actor.as_str()
                    && OrganizationId::from(m.org_id).as_str() == organization.as_str()
            })
            .cloned())
    }

    async fn create_organization(
        &self,
        new: NewOrganization,
    ) -> Result<(Organization, Membership), StoreError> {
        self.check_available()?;

        let now = Utc::now();
        let organization = Organization {
            id: Uuid::new_v4(),
            name: new.name,
            sector: new.sector,
            country: new.country,
            created_by: new.created_by.as_str().to_string(),
            created_at: now,
        };
        let membership = Membership {
            user_id: new.created_by.as_str().to_string(),
            org_id: organization.id,
            role: ROLE_OWNER.to_string(),
            created_at: now,
        };

        // Single write lock: both rows appear together or not at all
        let mut tables = self.tables.write().await;
        tables.organizations.push(organization.clone());
        tables.memberships.push(membership.clone());

        Ok((organization, membership))
    }

    async fn create_system(&self, new: NewSystem) -> Result<AiSystem, StoreError> {
        self.check_available()?;

        let mut tables = self.tables.write().await;
        if !tables.organizations.iter().any(|o| o.id == new.org_id) {
            return Err(StoreError::QueryError(format!(
                "organization {} does not exist",
                new.org_id
            )));
        }

        let system = AiSystem {
            id: Uuid::new_v4(),
            org_id: new.org_id,
            name: new.name,
            risk_level: new.risk_level,
            description: new.description,
            owner: new.owner,
            created_at: Utc::now(),
        };
        tables.systems.push(system.clone());
        Ok(system)
    }

    async fn system_organization(
        &self,
        system_id: Uuid,
    ) -> Result<Option<OrganizationId>, StoreError> {
        self.check_available()?;

        let tables = self.tables.read().await;
        Ok(tables
            .systems
            .iter()
            .find(|s| s.id == system_id)
            .map(|s| OrganizationId::from(s.org_id)))
    }

    async fn create_assessment(&self, new: NewAssessment) -> Result<Assessment, StoreError> {
        self.check_available()?;

        let assessment = Assessment {
            id: Uuid::new_v4(),
            org_id: new.org_id,
            system_id: new.system_id,
            framework: new.framework,
            status: STATUS_DRAFT.to_string(),
            created_by: new.created_by.as_str().to_string(),
            created_at: Utc::now(),
        };

        self.tables.write().await.assessments.push(assessment.clone());
        Ok(assessment)
    }

    async fn assessment_organization(
        &self,
        assessment_id: Uuid,
    ) -> Result<Option<OrganizationId>, StoreError> {
        self.check_available()?;

        let tables = self.tables.read().await;
        Ok(tables
            .assessments
            .iter()
            .find(|a| a.id == assessment_id)
            .map(|a| OrganizationId::from(a.org_id)))
    }

    async fn record_evidence(&self, new: NewEvidence) -> Result<Evidence, StoreError> {
        self.check_available()?;

        let mut tables = self.tables.write().await;
        if tables.evidence.iter().any(|e| e.storage_path == new.storage_path) {
            return Err(StoreError::QueryError(format!(
                "duplicate storage path {}",
                new.storage_path
            )));
        }

        let evidence = Evidence {
            id: Uuid::new_v4(),
            org_id: new.org_id,
            assessment_id: new.assessment_id,
            question_id: new.question_id,
            storage_path: new.storage_path,
            mime: new.mime,
            uploaded_by: new.uploaded_by.as_str().to_string(),
            created_at: Utc::now(),
        };
        tables.evidence.push(evidence.clone());
        Ok(evidence)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }
}
