// handlers/mod.rs - HTTP entry points
//
// Every mutating handler follows the same order: authenticate, validate the
// body, resolve the target organization, run the tenancy guard, mutate.
// Bodies are taken as raw bytes so nothing is parsed for anonymous callers.

pub mod assessments;
pub mod evidence;
pub mod organizations;
pub mod pages;
pub mod root;
pub mod systems;
pub mod whoami;

pub use assessments::create_assessment;
pub use evidence::sign_evidence_upload;
pub use organizations::create_organization;
pub use systems::create_system;
pub use whoami::whoami;
