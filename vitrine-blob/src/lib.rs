//! vitrine-blob: blob storage for the vitrine backend.
//!
//! Services never talk to the media host directly; they hold a
//! [`BlobStore`] and work with hosted URLs:
//!
//! ```text
//! ┌─────────────────┐
//! │   Your Service  │  ← business logic only
//! ├─────────────────┤
//! │   BlobStore     │  ← upload bytes → URL, delete by public id
//! ├─────────────────┤
//! │  MediaHostClient│  ← remote media host HTTP API
//! └─────────────────┘
//! ```
//!
//! Records persist the hosted URL only. At delete time the public id is
//! re-derived from the URL via [`public_id_from_url`], a documented
//! contract on the host's upload naming, not a general-purpose parser.

mod error;
mod media_host;
mod memory;
pub mod store;

pub use error::{BlobError, BlobResult};
pub use media_host::{MediaHostClient, MediaHostConfig};
pub use memory::MemoryBlobStore;
pub use store::{
    public_id_from_url, BlobStore, ImageUpload, StoredImage, ALLOWED_IMAGE_TYPES,
    MAX_IMAGES_PER_REQUEST,
};
