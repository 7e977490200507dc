//! Supabase Storage uploads.

use std::time::Duration;

use async_trait::async_trait;
use inbox_common::SupabaseConfig;
use inbox_core::{ObjectStorage, ProviderResult, StoredObject};
use tracing::{debug, instrument, warn};

use crate::error::{truncate_body, ProviderError, Upstream};

const UPLOAD_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct SupabaseStorage {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    service_key: String,
}

impl SupabaseStorage {
    pub fn new(config: &SupabaseConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            bucket: config.storage_bucket.clone(),
            service_key: config.service_role_key.clone(),
        })
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{path}", self.base_url, self.bucket)
    }

    /// URL served by the bucket's public CDN route
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{path}",
            self.base_url, self.bucket
        )
    }
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    #[instrument(skip(self, bytes), fields(bucket = %self.bucket, size = bytes.len()))]
    async fn upload(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> ProviderResult<StoredObject> {
        let path = path.trim_start_matches('/');

        let response = self
            .client
            .post(self.object_url(path))
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .header("x-upsert", "false")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| ProviderError::transport(Upstream::Storage, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, path, "storage upload rejected");
            return Err(ProviderError::Status {
                upstream: Upstream::Storage,
                status: status.as_u16(),
                body: truncate_body(&body),
            }
            .into());
        }

        debug!(path, "object uploaded");
        Ok(StoredObject {
            path: path.to_string(),
            public_url: self.public_url(path),
        })
    }
}
