use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use vitrine_core::errors::ApiError;
use vitrine_core::{CrudService, ServiceCapabilities};

use crate::services::adapters::mailer_adapter::Notifier;
use crate::services::adapters::record_store::RecordStore;
use crate::services::{normalize_id, SiteParams};

use super::contacts_shared::{self, COLLECTION, NOTIFY_SUBJECT};

pub struct ContactsService {
    records: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
}

impl ContactsService {
    pub fn new(records: Arc<dyn RecordStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { records, notifier }
    }
}

#[async_trait]
impl CrudService<Value, SiteParams> for ContactsService {
    fn capabilities(&self) -> ServiceCapabilities {
        contacts_shared::capabilities()
    }

    async fn create(&self, data: Value, _params: SiteParams) -> Result<Value> {
        let stored = self.records.insert(COLLECTION, data).await?;

        // The write above alone decides this request; the notification
        // outcome goes to the log and nowhere else.
        let body = contacts_shared::notification_body(&stored);
        if let Err(err) = self.notifier.notify(NOTIFY_SUBJECT, &body).await {
            tracing::warn!(error = %err, "contact notification failed");
        }

        Ok(normalize_id(stored))
    }

    async fn find(&self, _params: SiteParams) -> Result<Vec<Value>> {
        let all = self.records.find_all(COLLECTION).await?;
        Ok(all.into_iter().map(normalize_id).collect())
    }

    async fn update(&self, id: &str, data: Value, _params: SiteParams) -> Result<Value> {
        match self.records.replace(COLLECTION, id, data).await? {
            Some(updated) => Ok(normalize_id(updated)),
            None => Err(ApiError::not_found(format!("Contact not found: {id}")).into_anyhow()),
        }
    }

    async fn remove(&self, id: &str, _params: SiteParams) -> Result<Value> {
        // Idempotent from the caller's perspective: confirmation either way.
        match self.records.remove(COLLECTION, id).await? {
            Some(removed) => Ok(normalize_id(removed)),
            None => Ok(json!({ "id": id })),
        }
    }
}
