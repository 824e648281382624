use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::BlobResult;

/// Raster image types the media host accepts.
pub const ALLOWED_IMAGE_TYPES: &[&str] =
    &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Upper bound on attached images per create/update call.
pub const MAX_IMAGES_PER_REQUEST: usize = 5;

/// An image submitted for upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: Option<String>,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ImageUpload {
    pub fn new(content_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: None,
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// A hosted image: the permanent retrievable URL plus the host-assigned
/// public id used for deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredImage {
    pub url: String,
    pub public_id: String,
}

/// Core blob storage operations - must be implemented by all backends.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store image bytes, returning the hosted URL and public id.
    async fn upload(&self, image: ImageUpload) -> BlobResult<StoredImage>;

    /// Delete a hosted image by its public id.
    async fn delete(&self, public_id: &str) -> BlobResult<()>;
}

/// Derive a public id from a hosted URL.
///
/// Contract: the host serves uploads at `…/<public_id>.<ext>`, so the id
/// is the substring of the final path segment between the last slash and
/// the last dot. Returns `None` when the URL does not satisfy that shape
/// (no extension, empty segment). This is a contract with the host's
/// upload naming, not a general-purpose URL parser.
pub fn public_id_from_url(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next()?;
    let dot = segment.rfind('.')?;
    let id = &segment[..dot];
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_id_from_hosted_url() {
        let url = "https://media.example.com/vitrine/image/upload/v17/q1w2e3r4.jpg";
        assert_eq!(public_id_from_url(url), Some("q1w2e3r4"));
    }

    #[test]
    fn strips_query_and_fragment() {
        let url = "https://media.example.com/vitrine/abc123.png?w=640#top";
        assert_eq!(public_id_from_url(url), Some("abc123"));
    }

    #[test]
    fn keeps_inner_dots() {
        assert_eq!(
            public_id_from_url("https://host/x/archive.v2.webp"),
            Some("archive.v2")
        );
    }

    #[test]
    fn rejects_urls_outside_the_contract() {
        assert_eq!(public_id_from_url("https://host/no-extension"), None);
        assert_eq!(public_id_from_url("https://host/dir/.gitkeep"), None);
        assert_eq!(public_id_from_url(""), None);
    }
}
