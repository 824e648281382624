use thiserror::Error;

/// Result type for blob operations
pub type BlobResult<T> = Result<T, BlobError>;

/// Errors that can occur during blob operations
#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Invalid request: {message}")]
    Invalid { message: String },

    #[error("Upload failed: {reason}")]
    UploadFailed { reason: String },

    #[error("Delete failed for '{id}': {reason}")]
    DeleteFailed { id: String, reason: String },

    #[error("Media host error: {source}")]
    Backend {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl BlobError {
    /// Create a backend error from any error type
    pub fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            source: Box::new(error),
        }
    }

    /// Create an invalid request error
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create an upload failed error
    pub fn upload_failed<S: Into<String>>(reason: S) -> Self {
        Self::UploadFailed {
            reason: reason.into(),
        }
    }

    /// Create a delete failed error
    pub fn delete_failed<I: Into<String>, S: Into<String>>(id: I, reason: S) -> Self {
        Self::DeleteFailed {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
