use std::time::Duration;

use serde_json::Value;

use crate::store::{BlobStore, ImageUpload, StoredImage, ALLOWED_IMAGE_TYPES};
use crate::{BlobError, BlobResult};

/// Credentials and location of the remote media host.
#[derive(Debug, Clone)]
pub struct MediaHostConfig {
    /// API root, e.g. `https://api.media.example.com`
    pub endpoint: String,
    /// Account namespace uploads live under
    pub cloud: String,
    pub key: String,
    pub secret: String,
}

/// HTTP adapter for the media host.
///
/// Upload: `POST {endpoint}/{cloud}/image/upload` (multipart, field `file`)
/// → `{ "secure_url": …, "public_id": … }`.
/// Delete: `POST {endpoint}/{cloud}/image/destroy` (form field `public_id`).
pub struct MediaHostClient {
    http: reqwest::Client,
    config: MediaHostConfig,
}

impl MediaHostClient {
    pub fn new(config: MediaHostConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn api_url(&self, action: &str) -> String {
        format!(
            "{}/{}/image/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.cloud,
            action
        )
    }
}

#[async_trait::async_trait]
impl BlobStore for MediaHostClient {
    async fn upload(&self, image: ImageUpload) -> BlobResult<StoredImage> {
        if !ALLOWED_IMAGE_TYPES.contains(&image.content_type.as_str()) {
            return Err(BlobError::invalid(format!(
                "Unsupported image type: {}",
                image.content_type
            )));
        }

        let mut part = reqwest::multipart::Part::bytes(image.bytes.to_vec())
            .mime_str(&image.content_type)
            .map_err(BlobError::backend)?;
        if let Some(filename) = image.filename {
            part = part.file_name(filename);
        }
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(self.api_url("upload"))
            .basic_auth(&self.config.key, Some(&self.config.secret))
            .multipart(form)
            .timeout(Duration::from_secs(30))
            .send()
            .await
            .map_err(BlobError::backend)?;

        if !response.status().is_success() {
            return Err(BlobError::upload_failed(format!(
                "media host returned {}",
                response.status()
            )));
        }

        let body: Value = response.json().await.map_err(BlobError::backend)?;
        let url = body
            .get("secure_url")
            .and_then(|v| v.as_str())
            .ok_or_else(|| BlobError::upload_failed("response missing 'secure_url'"))?;
        let public_id = body
            .get("public_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| BlobError::upload_failed("response missing 'public_id'"))?;

        tracing::debug!(public_id, "image uploaded to media host");

        Ok(StoredImage {
            url: url.to_string(),
            public_id: public_id.to_string(),
        })
    }

    async fn delete(&self, public_id: &str) -> BlobResult<()> {
        let response = self
            .http
            .post(self.api_url("destroy"))
            .basic_auth(&self.config.key, Some(&self.config.secret))
            .form(&[("public_id", public_id)])
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| BlobError::delete_failed(public_id, e.to_string()))?;

        if !response.status().is_success() {
            return Err(BlobError::delete_failed(
                public_id,
                format!("media host returned {}", response.status()),
            ));
        }

        tracing::debug!(public_id, "image deleted from media host");
        Ok(())
    }
}
