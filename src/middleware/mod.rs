pub mod portal;

pub use portal::{portal_boundary, LOGIN_PATH};
