pub mod assessment;
pub mod evidence;
pub mod membership;
pub mod organization;
pub mod system;

pub use assessment::{Assessment, NewAssessment, DEFAULT_FRAMEWORK, STATUS_DRAFT};
pub use evidence::{Evidence, NewEvidence};
pub use membership::{Membership, ROLE_OWNER};
pub use organization::{NewOrganization, Organization};
pub use system::{AiSystem, NewSystem};
