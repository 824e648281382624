//! # Errors
//!
//! Structured, Feathers-style errors for the vitrine backend.
//! Core goals:
//! - consistent status codes + class names
//! - can be carried through anyhow::Error across service seams
//! - transport-agnostic (the axum crate decides how to serialize)

use std::fmt;

use anyhow::Error as AnyError;

/// A convenience result type for core APIs.
pub type ApiResult<T> = std::result::Result<T, AnyError>;

/// Error class names + status codes. Only the kinds this system can
/// actually produce are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,    // 400
    NotFound,      // 404
    Unprocessable, // 422
    GeneralError,  // 500
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Unprocessable => 422,
            ErrorKind::GeneralError => 500,
        }
    }

    /// Error `name` (e.g. "NotFound")
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Unprocessable => "Unprocessable",
            ErrorKind::GeneralError => "GeneralError",
        }
    }

    /// Error `className` (kebab-cased)
    pub fn class_name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad-request",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Unprocessable => "unprocessable",
            ErrorKind::GeneralError => "general-error",
        }
    }
}

/// A structured error that can live inside `anyhow::Error`.
///
/// Fields mirror the wire payload:
/// - name
/// - message
/// - code (HTTP status)
/// - class_name
/// - errors (optional field-level detail)
#[derive(Debug)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
    pub errors: Option<serde_json::Value>,
    pub source: Option<AnyError>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            errors: None,
            source: None,
        }
    }

    pub fn with_errors(mut self, errors: serde_json::Value) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn with_source(mut self, source: AnyError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    /// Convert into `anyhow::Error` so it flows through service seams.
    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    /// Turn any error into an ApiError:
    /// - if it's already an ApiError, keep it (lossless)
    /// - otherwise wrap as GeneralError
    pub fn normalize(err: AnyError) -> ApiError {
        match err.downcast::<ApiError>() {
            Ok(api) => api,
            Err(other) => {
                ApiError::new(ErrorKind::GeneralError, other.to_string()).with_source(other)
            }
        }
    }

    /// A version safe to return to clients:
    /// - keep kind/message/code/class_name/errors
    /// - drop the inner `source`
    pub fn sanitize_for_client(&self) -> ApiError {
        ApiError {
            kind: self.kind,
            message: self.message.clone(),
            errors: self.errors.clone(),
            source: None,
        }
    }

    /// Wire payload.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;

        let mut base = json!({
            "name": self.name(),
            "message": self.message,
            "code": self.code(),
            "className": self.class_name(),
        });

        if let Some(e) = &self.errors {
            base["errors"] = e.clone();
        }
        base
    }

    // ---- Constructors ----

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, msg)
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, msg)
    }
    pub fn unprocessable(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unprocessable, msg)
    }
    pub fn general_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::GeneralError, msg)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.code(), self.message)
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}
