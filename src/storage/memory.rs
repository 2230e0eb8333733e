use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ObjectStorage, SignedUpload, StorageError};

/// Local signer for development and tests. Issues URLs under a configured
/// public storage root and remembers every upload it signed.
pub struct MemoryStorage {
    public_url: String,
    bucket: String,
    issued: RwLock<Vec<SignedUpload>>,
    unavailable: AtomicBool,
}

impl MemoryStorage {
    pub fn new(public_url: impl Into<String>, bucket: impl Into<String>) -> Self {
        let public_url: String = public_url.into();
        Self {
            public_url: public_url.trim_end_matches('/').to_string(),
            bucket: bucket.into(),
            issued: RwLock::new(Vec::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    pub async fn issued(&self) -> Vec<SignedUpload> {
        self.issued.read().await.clone()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn create_signed_upload(&self, path: &str) -> Result<SignedUpload, StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Request("storage offline".to_string()));
        }

        let token = Uuid::new_v4().simple().to_string();
        let signed = SignedUpload {
            url: format!(
                "{}/object/upload/sign/{}/{}?token={}",
                self.public_url, self.bucket, path, token
            ),
            token,
            path: path.to_string(),
        };

        self.issued.write().await.push(signed.clone());
        Ok(signed)
    }
}
