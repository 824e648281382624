use axum::{body::Body, extract::Request, http::StatusCode, response::Response, Json};
use base64::Engine;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use tower::{Layer, Service};
use vitrine_core::errors::ApiError;

/// Configuration for multipart to JSON conversion.
#[derive(Debug, Clone)]
pub struct MultipartConfig {
    /// Maximum size of a single file in bytes
    pub max_file_size: usize,
    /// Maximum total request size in bytes
    pub max_total_size: usize,
    /// Maximum number of files per file field (None = unlimited)
    pub max_files_per_field: Option<usize>,
    /// Allowed content types for files (empty = all allowed)
    pub allowed_content_types: HashSet<String>,
    /// Field names to treat as files (empty = auto-detect by filename)
    pub file_fields: HashSet<String>,
}

impl Default for MultipartConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,  // 10MB
            max_total_size: 50 * 1024 * 1024, // 50MB
            max_files_per_field: None,
            allowed_content_types: HashSet::new(),
            file_fields: HashSet::new(),
        }
    }
}

impl MultipartConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_file_size(mut self, size: usize) -> Self {
        self.max_file_size = size;
        self
    }

    pub fn max_files_per_field(mut self, count: usize) -> Self {
        self.max_files_per_field = Some(count);
        self
    }

    /// Add allowed content type for files
    pub fn allow_content_type(mut self, content_type: &str) -> Self {
        self.allowed_content_types.insert(content_type.to_string());
        self
    }

    /// Add field name to treat as file
    pub fn file_field(mut self, field_name: &str) -> Self {
        self.file_fields.insert(field_name.to_string());
        self
    }
}

/// Middleware that converts multipart/form-data requests to JSON.
///
/// Text fields become JSON strings. File fields become
/// `{filename, contentType, size, data}` objects (base64 payload) and are
/// always collected into an array under their field name, so a repeated
/// `images` field arrives at the service as `images: [..]` no matter how
/// many parts were sent. Non-multipart requests pass through untouched.
#[derive(Clone)]
pub struct MultipartToJson {
    config: MultipartConfig,
}

impl MultipartToJson {
    pub fn new() -> Self {
        Self {
            config: MultipartConfig::default(),
        }
    }

    pub fn with_config(config: MultipartConfig) -> Self {
        Self { config }
    }
}

impl Default for MultipartToJson {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Layer<S> for MultipartToJson {
    type Service = MultipartToJsonService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MultipartToJsonService {
            inner,
            config: self.config.clone(),
        }
    }
}

#[derive(Clone)]
pub struct MultipartToJsonService<S> {
    inner: S,
    config: MultipartConfig,
}

impl<S> Service<Request<Body>> for MultipartToJsonService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();
        let config = self.config.clone();

        Box::pin(async move {
            let content_type = req
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");

            if !content_type.starts_with("multipart/form-data") {
                return inner.call(req).await;
            }

            match convert_multipart_to_json(req, &config).await {
                Ok(json_req) => inner.call(json_req).await,
                Err(message) => {
                    tracing::debug!(%message, "rejected multipart body");
                    let payload = ApiError::bad_request(message).to_json();
                    Ok(bad_request_response(payload))
                }
            }
        })
    }
}

fn bad_request_response(payload: Value) -> Response {
    use axum::response::IntoResponse;
    (StatusCode::BAD_REQUEST, Json(payload)).into_response()
}

async fn convert_multipart_to_json(
    req: Request<Body>,
    config: &MultipartConfig,
) -> Result<Request<Body>, String> {
    // Keep the original parts: method, uri and the routing extensions must
    // survive the body swap or path captures disappear downstream.
    let (mut parts, body) = req.into_parts();

    let content_type = parts
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let boundary = content_type
        .split("boundary=")
        .nth(1)
        .ok_or("Missing boundary in multipart content-type")?;
    let boundary = boundary.to_string();

    let body_bytes = axum::body::to_bytes(body, config.max_total_size)
        .await
        .map_err(|e| format!("Failed to read request body: {e}"))?;

    let mut multipart = multer::Multipart::new(
        futures::stream::once(async { Ok::<bytes::Bytes, multer::Error>(body_bytes) }),
        boundary,
    );

    let mut fields = Map::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Failed to parse multipart data: {e}"))?
    {
        let name = field.name().unwrap_or("unknown").to_string();
        let content_type = field.content_type().map(|ct| ct.to_string());
        let filename = field.file_name().map(|f| f.to_string());

        let is_file_field = if config.file_fields.is_empty() {
            filename.is_some()
        } else {
            config.file_fields.contains(&name)
        };

        if is_file_field {
            let data = field
                .bytes()
                .await
                .map_err(|e| format!("Failed to read file field '{name}': {e}"))?;

            if data.len() > config.max_file_size {
                return Err(format!(
                    "File '{name}' exceeds maximum size of {} bytes",
                    config.max_file_size
                ));
            }

            if !config.allowed_content_types.is_empty() {
                let ct = content_type.as_deref().unwrap_or("application/octet-stream");
                if !config.allowed_content_types.contains(ct) {
                    return Err(format!("Content type '{ct}' not allowed for file '{name}'"));
                }
            }

            let encoded = base64::engine::general_purpose::STANDARD.encode(&data);
            let entry = json!({
                "filename": filename,
                "contentType": content_type,
                "size": data.len(),
                "data": encoded,
            });

            let bucket = fields
                .entry(name.clone())
                .or_insert_with(|| Value::Array(Vec::new()));
            match bucket {
                Value::Array(items) => {
                    if let Some(max) = config.max_files_per_field {
                        if items.len() >= max {
                            return Err(format!(
                                "Field '{name}' accepts at most {max} files"
                            ));
                        }
                    }
                    items.push(entry);
                }
                // A text part already claimed this name; repeated mixed
                // fields are a malformed request.
                _ => return Err(format!("Field '{name}' mixes text and file parts")),
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| format!("Failed to read text field '{name}': {e}"))?;
            fields.insert(name, Value::String(value));
        }
    }

    let json_bytes = serde_json::to_vec(&Value::Object(fields))
        .map_err(|e| format!("Failed to encode converted body: {e}"))?;

    parts.headers.insert(
        "content-type",
        axum::http::HeaderValue::from_static("application/json"),
    );
    parts.headers.remove("content-length");
    if let Ok(len) = axum::http::HeaderValue::from_str(&json_bytes.len().to_string()) {
        parts.headers.insert("content-length", len);
    }

    Ok(Request::from_parts(parts, Body::from(json_bytes)))
}
