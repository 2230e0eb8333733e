use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{ObjectStorage, SignedUpload, StorageError};
use crate::config::platform_endpoint;

#[derive(Debug, Deserialize)]
struct SignResponse {
    url: String,
}

/// Signs uploads against the hosted storage API using the service-role key
#[derive(Clone)]
pub struct PlatformStorage {
    client: reqwest::Client,
    storage_base: Url,
    bucket: String,
    service_key: String,
}

impl PlatformStorage {
    pub fn new(
        base_url: &Url,
        bucket: impl Into<String>,
        service_key: impl Into<String>,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            client: reqwest::Client::new(),
            storage_base: platform_endpoint(base_url, "storage/v1")?,
            bucket: bucket.into(),
            service_key: service_key.into(),
        })
    }

    fn sign_endpoint(&self, path: &str) -> Result<Url, StorageError> {
        platform_endpoint(
            &self.storage_base,
            &format!("object/upload/sign/{}/{}", self.bucket, path),
        )
        .map_err(|e| StorageError::Request(format!("bad object path: {}", e)))
    }

    /// The storage API answers with a URL relative to the storage root
    fn absolute_url(&self, relative: &str) -> Result<Url, StorageError> {
        let root = self.storage_base.as_str().trim_end_matches('/');
        let joined = format!("{}/{}", root, relative.trim_start_matches('/'));
        Url::parse(&joined).map_err(|e| StorageError::InvalidResponse(format!("{}: {}", joined, e)))
    }
}

#[async_trait]
impl ObjectStorage for PlatformStorage {
    async fn create_signed_upload(&self, path: &str) -> Result<SignedUpload, StorageError> {
        let endpoint = self.sign_endpoint(path)?;

        let response = self
            .client
            .post(endpoint)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: SignResponse = response
            .json()
            .await
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;

        let url = self.absolute_url(&body.url)?;
        let token = url
            .query_pairs()
            .find(|(key, _)| key == "token")
            .map(|(_, value)| value.into_owned())
            .ok_or_else(|| StorageError::InvalidResponse("signed URL has no token".to_string()))?;

        Ok(SignedUpload {
            url: url.to_string(),
            token,
            path: path.to_string(),
        })
    }
}
