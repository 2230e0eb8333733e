//! Object storage for evidence files. The service never sees file bytes: it
//! only asks the storage backend for a short-lived signed upload location.

pub mod memory;
pub mod path;
pub mod platform;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use memory::MemoryStorage;
pub use path::{evidence_path, sanitize_filename};
pub use platform::PlatformStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage request failed: {0}")]
    Request(String),

    #[error("Storage rejected signing request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected storage response: {0}")]
    InvalidResponse(String),
}

/// Signed upload location handed back to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedUpload {
    pub url: String,
    pub token: String,
    pub path: String,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Ask the backend for a signed URL allowing one direct upload to `path`
    async fn create_signed_upload(&self, path: &str) -> Result<SignedUpload, StorageError>;
}
