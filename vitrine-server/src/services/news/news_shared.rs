use std::cmp::Ordering;

use anyhow::Result;
use base64::Engine;
use chrono::DateTime;
use serde_json::{Map, Value};
use vitrine_axum::middlewares::multipart::MultipartConfig;
use vitrine_axum::RestOptions;
use vitrine_blob::{ImageUpload, ALLOWED_IMAGE_TYPES, MAX_IMAGES_PER_REQUEST};
use vitrine_core::errors::ApiError;
use vitrine_core::{ServiceCapabilities, ServiceMethodKind};

pub const COLLECTION: &str = "news";

pub fn capabilities() -> ServiceCapabilities {
    ServiceCapabilities::from_methods(vec![
        ServiceMethodKind::Find,
        ServiceMethodKind::Create,
        ServiceMethodKind::Update,
        ServiceMethodKind::Remove,
    ])
}

pub fn rest_options() -> RestOptions {
    RestOptions::new()
        .removed_text("News item deleted")
        .with_content_range()
        .with_multipart(multipart_config())
}

fn multipart_config() -> MultipartConfig {
    let mut config = MultipartConfig::new()
        .file_field("images")
        .max_files_per_field(MAX_IMAGES_PER_REQUEST);
    for content_type in ALLOWED_IMAGE_TYPES {
        config = config.allow_content_type(content_type);
    }
    config
}

/// Pull the uploaded images out of a submitted body.
///
/// The multipart layer delivers file parts as
/// `{filename, contentType, size, data}` objects under `images`; anything
/// else under that key (client-supplied URLs, stray strings) is dropped;
/// the stored `images` sequence only ever holds URLs minted by the blob
/// store.
pub fn take_uploads(obj: &mut Map<String, Value>) -> Result<Vec<ImageUpload>> {
    let entries = match obj.remove("images") {
        Some(Value::Array(items)) => items,
        Some(Value::Object(single)) => vec![Value::Object(single)],
        Some(_) | None => return Ok(Vec::new()),
    };

    if entries.len() > MAX_IMAGES_PER_REQUEST {
        return Err(ApiError::bad_request(format!(
            "At most {MAX_IMAGES_PER_REQUEST} images per request"
        ))
        .into_anyhow());
    }

    let mut uploads = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(map) = entry.as_object() else {
            continue;
        };
        let Some(data) = map.get("data").and_then(|v| v.as_str()) else {
            continue;
        };

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|_| ApiError::bad_request("Invalid image payload").into_anyhow())?;

        let content_type = map
            .get("contentType")
            .and_then(|v| v.as_str())
            .unwrap_or("application/octet-stream")
            .to_string();

        let mut upload = ImageUpload::new(content_type, bytes);
        if let Some(name) = map.get("filename").and_then(|v| v.as_str()) {
            upload = upload.with_filename(name);
        }
        uploads.push(upload);
    }

    Ok(uploads)
}

/// Non-increasing by `date`; records without a parseable date sort last.
pub fn sort_newest_first(items: &mut [Value]) {
    let parsed = |v: &Value| {
        v.get("date")
            .and_then(|d| d.as_str())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    };

    items.sort_by(|a, b| match (parsed(a), parsed(b)) {
        (Some(da), Some(db)) => db.cmp(&da),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn take_uploads_decodes_file_entries_in_order() {
        let mut obj = json!({
            "title": "T",
            "images": [
                {"filename": "a.png", "contentType": "image/png", "data": "AAEC"},
                {"contentType": "image/jpeg", "data": "AwQF"},
            ],
        })
        .as_object()
        .cloned()
        .unwrap();

        let uploads = take_uploads(&mut obj).unwrap();
        assert_eq!(uploads.len(), 2);
        assert_eq!(uploads[0].filename.as_deref(), Some("a.png"));
        assert_eq!(uploads[0].bytes.as_ref(), &[0, 1, 2]);
        assert_eq!(uploads[1].content_type, "image/jpeg");
        assert!(obj.get("images").is_none());
    }

    #[test]
    fn take_uploads_drops_client_supplied_urls() {
        let mut obj = json!({"images": ["https://media.invalid/x.jpg"]})
            .as_object()
            .cloned()
            .unwrap();
        assert!(take_uploads(&mut obj).unwrap().is_empty());
    }

    #[test]
    fn take_uploads_caps_the_batch() {
        let entry = json!({"contentType": "image/png", "data": "AAEC"});
        let mut obj = json!({"images": vec![entry; 6]})
            .as_object()
            .cloned()
            .unwrap();
        assert!(take_uploads(&mut obj).is_err());
    }

    #[test]
    fn sorting_is_newest_first_with_dateless_records_last() {
        let mut items = vec![
            json!({"title": "old", "date": "2024-01-01T00:00:00Z"}),
            json!({"title": "dateless"}),
            json!({"title": "new", "date": "2025-06-01T00:00:00Z"}),
        ];
        sort_newest_first(&mut items);
        assert_eq!(items[0]["title"], "new");
        assert_eq!(items[1]["title"], "old");
        assert_eq!(items[2]["title"], "dateless");
    }
}
