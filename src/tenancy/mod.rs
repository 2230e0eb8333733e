//! Tenancy guard: may this actor act within this organization?
//!
//! Every mutating entry point runs the same linear pipeline:
//! authenticate, validate the payload, resolve the target organization,
//! [`TenancyGuard::check`], then mutate. The check and the mutation are two
//! separate store operations; a membership revoked in between is not
//! detected. A store that supports it could fold both into one conditional
//! transaction.

use std::sync::Arc;

use crate::database::{Store, StoreError};
use crate::error::ApiError;
use crate::types::{ActorId, OrganizationId};

/// Outcome of a guard check. A failed lookup is a `Fault`, never `Forbidden`.
#[derive(Debug)]
pub enum Access {
    Authorized,
    Forbidden,
    Fault(StoreError),
}

impl Access {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Access::Authorized)
    }

    /// Map the decision onto the HTTP error taxonomy
    pub fn require(self) -> Result<(), ApiError> {
        match self {
            Access::Authorized => Ok(()),
            Access::Forbidden => Err(ApiError::forbidden("forbidden")),
            Access::Fault(err) => Err(err.into()),
        }
    }
}

/// Stateless membership check over a [`Store`]. Holds no cache.
#[derive(Clone)]
pub struct TenancyGuard {
    store: Arc<dyn Store>,
}

impl TenancyGuard {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// True iff a membership row exists for (actor, organization), whatever its role
    pub async fn is_member(
        &self,
        actor: &ActorId,
        organization: &OrganizationId,
    ) -> Result<bool, StoreError> {
        let membership = self.store.find_membership(actor, organization).await?;
        Ok(membership.is_some())
    }

    pub async fn check(&self, actor: &ActorId, organization: &OrganizationId) -> Access {
        match self.is_member(actor, organization).await {
            Ok(true) => {
                tracing::debug!("Actor {} authorized for organization {}", actor, organization);
                Access::Authorized
            }
            Ok(false) => {
                tracing::warn!("Actor {} is not a member of organization {}", actor, organization);
                Access::Forbidden
            }
            Err(err) => {
                tracing::error!(
                    "Membership lookup failed for actor {} in organization {}: {}",
                    actor,
                    organization,
                    err
                );
                Access::Fault(err)
            }
        }
    }
}
