use std::sync::Arc;

use anyhow::{bail, Result};
use vitrine_blob::{BlobStore, MediaHostClient, MediaHostConfig, MemoryBlobStore};
use vitrine_core::ConfigSnapshot;

use crate::services::adapters::mailer_adapter::{HttpMailer, LogNotifier, MailConfig, Notifier};
use crate::services::adapters::record_store::{MemoryStore, RecordStore, SledStore};
use crate::services::Adapters;

/// `VITRINE__HTTP__PORT=8080` → `http.port`
pub const ENV_PREFIX: &str = "VITRINE__";

/// Construct the process-lifetime adapters from config.
///
/// The record store backend is required to come up; the two side channels
/// degrade to local stand-ins when unconfigured, so a development process
/// still serves every route.
pub fn adapters_from_config(config: &ConfigSnapshot) -> Result<Adapters> {
    let records = record_store(config)?;
    let images = blob_store(config);
    let notifier = notifier(config);
    Ok(Adapters {
        records,
        images,
        notifier,
    })
}

fn record_store(config: &ConfigSnapshot) -> Result<Arc<dyn RecordStore>> {
    match config.get("store.backend").unwrap_or("memory") {
        "memory" => Ok(Arc::new(MemoryStore::new())),
        "sled" => {
            let path = config.get("store.path").unwrap_or("data/records");
            let store = SledStore::open(path)?;
            tracing::info!(path, "opened sled record store");
            Ok(Arc::new(store))
        }
        other => bail!("Unknown store.backend: {other}"),
    }
}

fn blob_store(config: &ConfigSnapshot) -> Arc<dyn BlobStore> {
    let endpoint = config.get_string("media.endpoint");
    let cloud = config.get_string("media.cloud");
    let key = config.get_string("media.key");
    let secret = config.get_string("media.secret");

    match (endpoint, cloud, key, secret) {
        (Some(endpoint), Some(cloud), Some(key), Some(secret)) => {
            Arc::new(MediaHostClient::new(MediaHostConfig {
                endpoint,
                cloud,
                key,
                secret,
            }))
        }
        _ => {
            tracing::warn!("media host not configured; images are kept in memory");
            Arc::new(MemoryBlobStore::new())
        }
    }
}

fn notifier(config: &ConfigSnapshot) -> Arc<dyn Notifier> {
    let endpoint = config.get_string("mail.endpoint");
    let user = config.get_string("mail.user");
    let password = config.get_string("mail.password");
    let to = config.get_string("mail.to");

    match (endpoint, user, password, to) {
        (Some(endpoint), Some(user), Some(password), Some(to)) => {
            Arc::new(HttpMailer::new(MailConfig {
                endpoint,
                user,
                password,
                to,
            }))
        }
        _ => {
            tracing::warn!("mail transport not configured; notifications are logged only");
            Arc::new(LogNotifier)
        }
    }
}
