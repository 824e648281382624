use std::collections::HashSet;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::store::{BlobStore, ImageUpload, StoredImage, ALLOWED_IMAGE_TYPES};
use crate::{BlobError, BlobResult};

#[derive(Default)]
struct MemoryInner {
    uploads: Vec<StoredImage>,
    delete_attempts: Vec<String>,
    fail_uploads: bool,
    failing_deletes: HashSet<String>,
}

/// In-memory [`BlobStore`].
///
/// Records every upload and every delete attempt, and can be told to fail
/// either path, which makes it the fixture for the best-effort and
/// cascade-isolation tests. URLs follow the hosted shape
/// `{base_url}/{public_id}.{ext}` so [`crate::public_id_from_url`] works
/// against them.
pub struct MemoryBlobStore {
    base_url: String,
    inner: Mutex<MemoryInner>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::with_base_url("https://media.invalid/vitrine")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            inner: Mutex::new(MemoryInner::default()),
        }
    }

    /// Make every subsequent upload fail.
    pub async fn fail_uploads(&self) {
        self.inner.lock().await.fail_uploads = true;
    }

    /// Make deletion of a specific public id fail.
    pub async fn fail_delete_of(&self, public_id: impl Into<String>) {
        self.inner.lock().await.failing_deletes.insert(public_id.into());
    }

    pub async fn uploads(&self) -> Vec<StoredImage> {
        self.inner.lock().await.uploads.clone()
    }

    /// Every delete call seen, failed ones included.
    pub async fn delete_attempts(&self) -> Vec<String> {
        self.inner.lock().await.delete_attempts.clone()
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "jpg",
    }
}

#[async_trait::async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, image: ImageUpload) -> BlobResult<StoredImage> {
        if !ALLOWED_IMAGE_TYPES.contains(&image.content_type.as_str()) {
            return Err(BlobError::invalid(format!(
                "Unsupported image type: {}",
                image.content_type
            )));
        }

        let mut inner = self.inner.lock().await;
        if inner.fail_uploads {
            return Err(BlobError::upload_failed("memory store set to fail"));
        }

        let public_id = Uuid::new_v4().simple().to_string();
        let stored = StoredImage {
            url: format!(
                "{}/{}.{}",
                self.base_url,
                public_id,
                extension_for(&image.content_type)
            ),
            public_id,
        };
        inner.uploads.push(stored.clone());
        Ok(stored)
    }

    async fn delete(&self, public_id: &str) -> BlobResult<()> {
        let mut inner = self.inner.lock().await;
        inner.delete_attempts.push(public_id.to_string());
        if inner.failing_deletes.contains(public_id) {
            return Err(BlobError::delete_failed(public_id, "memory store set to fail"));
        }
        inner.uploads.retain(|img| img.public_id != public_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::public_id_from_url;

    #[tokio::test]
    async fn uploaded_urls_satisfy_the_id_contract() {
        let store = MemoryBlobStore::new();
        let stored = store
            .upload(ImageUpload::new("image/png", vec![1, 2, 3]))
            .await
            .unwrap();
        assert_eq!(
            public_id_from_url(&stored.url),
            Some(stored.public_id.as_str())
        );
    }

    #[tokio::test]
    async fn failed_deletes_are_still_recorded_as_attempts() {
        let store = MemoryBlobStore::new();
        let stored = store
            .upload(ImageUpload::new("image/jpeg", vec![0u8; 4]))
            .await
            .unwrap();
        store.fail_delete_of(stored.public_id.clone()).await;

        assert!(store.delete(&stored.public_id).await.is_err());
        assert_eq!(store.delete_attempts().await, vec![stored.public_id]);
    }

    #[tokio::test]
    async fn rejects_non_image_content_types() {
        let store = MemoryBlobStore::new();
        let err = store
            .upload(ImageUpload::new("text/plain", vec![0u8; 4]))
            .await
            .unwrap_err();
        assert!(matches!(err, BlobError::Invalid { .. }));
    }
}
