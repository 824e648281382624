use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use vitrine_axum::params::{FromRestParams, RestParams};
use vitrine_blob::BlobStore;

pub mod adapters;
pub mod contacts;
pub mod news;

use adapters::mailer_adapter::Notifier;
use adapters::record_store::RecordStore;

/// Request params handed to services by the REST layer.
#[derive(Debug, Clone, Default)]
pub struct SiteParams {
    pub query: HashMap<String, String>,
}

impl FromRestParams for SiteParams {
    fn from_rest_params(params: RestParams) -> Self {
        Self {
            query: params.query,
        }
    }
}

/// The process-lifetime collaborators, built once at startup and injected
/// into services.
pub struct Adapters {
    pub records: Arc<dyn RecordStore>,
    pub images: Arc<dyn BlobStore>,
    pub notifier: Arc<dyn Notifier>,
}

/// Rename the store's internal `_id` key to the public `id` field.
/// Responses never carry the raw internal key.
pub fn normalize_id(record: Value) -> Value {
    let mut obj = record.as_object().cloned().unwrap_or_default();
    if let Some(id) = obj.remove("_id") {
        obj.insert("id".to_string(), id);
    }
    Value::Object(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_moves_internal_id() {
        let out = normalize_id(json!({"_id": "contacts:1", "email": "a@b.com"}));
        assert_eq!(out["id"], "contacts:1");
        assert!(out.get("_id").is_none());
        assert_eq!(out["email"], "a@b.com");
    }

    #[test]
    fn normalize_leaves_records_without_internal_id_alone() {
        let out = normalize_id(json!({"title": "T"}));
        assert!(out.get("id").is_none());
        assert_eq!(out["title"], "T");
    }
}
