use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use vitrine_blob::{public_id_from_url, BlobStore};
use vitrine_core::errors::ApiError;
use vitrine_core::{CrudService, ServiceCapabilities};

use crate::services::adapters::record_store::RecordStore;
use crate::services::{normalize_id, SiteParams};

use super::news_shared::{self, COLLECTION};

pub struct NewsService {
    records: Arc<dyn RecordStore>,
    images: Arc<dyn BlobStore>,
}

impl NewsService {
    pub fn new(records: Arc<dyn RecordStore>, images: Arc<dyn BlobStore>) -> Self {
        Self { records, images }
    }

    /// Upload submitted images in order, collecting the hosted URLs.
    /// Any upload failure aborts the whole request.
    async fn upload_all(
        &self,
        uploads: Vec<vitrine_blob::ImageUpload>,
    ) -> Result<Vec<Value>> {
        let mut urls = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let stored = self.images.upload(upload).await?;
            urls.push(Value::String(stored.url));
        }
        Ok(urls)
    }
}

#[async_trait]
impl CrudService<Value, SiteParams> for NewsService {
    fn capabilities(&self) -> ServiceCapabilities {
        news_shared::capabilities()
    }

    async fn create(&self, data: Value, _params: SiteParams) -> Result<Value> {
        let mut obj = data.as_object().cloned().unwrap_or_default();
        let uploads = news_shared::take_uploads(&mut obj)?;

        let urls = self.upload_all(uploads).await?;
        obj.insert("images".to_string(), Value::Array(urls));
        obj.entry("date")
            .or_insert_with(|| json!(Utc::now().to_rfc3339()));

        let stored = self.records.insert(COLLECTION, Value::Object(obj)).await?;
        Ok(normalize_id(stored))
    }

    async fn find(&self, _params: SiteParams) -> Result<Vec<Value>> {
        let mut items: Vec<Value> = self
            .records
            .find_all(COLLECTION)
            .await?
            .into_iter()
            .map(normalize_id)
            .collect();
        news_shared::sort_newest_first(&mut items);
        Ok(items)
    }

    async fn update(&self, id: &str, data: Value, _params: SiteParams) -> Result<Value> {
        let Some(existing) = self.records.find_by_id(COLLECTION, id).await? else {
            return Err(ApiError::not_found(format!("News item not found: {id}")).into_anyhow());
        };

        let mut submitted = data.as_object().cloned().unwrap_or_default();
        let uploads = news_shared::take_uploads(&mut submitted)?;
        let new_urls = self.upload_all(uploads).await?;

        // Additive merge: submitted fields overwrite, the image sequence
        // only ever grows at the end.
        let mut merged = existing.as_object().cloned().unwrap_or_default();
        for (key, value) in submitted {
            if key == "id" || key == "_id" {
                continue;
            }
            merged.insert(key, value);
        }

        let mut images = merged
            .get("images")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        images.extend(new_urls);
        merged.insert("images".to_string(), Value::Array(images));

        let updated = self
            .records
            .replace(COLLECTION, id, Value::Object(merged))
            .await?
            .ok_or_else(|| {
                ApiError::not_found(format!("News item not found: {id}")).into_anyhow()
            })?;

        Ok(normalize_id(updated))
    }

    async fn remove(&self, id: &str, _params: SiteParams) -> Result<Value> {
        let Some(existing) = self.records.find_by_id(COLLECTION, id).await? else {
            return Ok(json!({ "id": id }));
        };

        // Cascade: every hosted image gets a delete attempt before the
        // record goes. One failed deletion never stops the others or the
        // record removal.
        let urls: Vec<String> = existing
            .get("images")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        for url in &urls {
            match public_id_from_url(url) {
                Some(public_id) => {
                    if let Err(err) = self.images.delete(public_id).await {
                        tracing::warn!(%url, error = %err, "image delete failed, continuing");
                    }
                }
                None => {
                    tracing::warn!(%url, "image url outside the host naming contract, skipping");
                }
            }
        }

        let removed = self.records.remove(COLLECTION, id).await?;
        Ok(removed
            .map(normalize_id)
            .unwrap_or_else(|| json!({ "id": id })))
    }
}
