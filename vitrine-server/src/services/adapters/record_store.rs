use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Document persistence seam. Records are schema-flexible JSON objects;
/// the store assigns an immutable `_id` on insert and treats it as the
/// only identity.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a new record. Assigns `_id` and returns the stored document.
    async fn insert(&self, collection: &str, data: Value) -> Result<Value>;

    /// All records in a collection, unordered.
    async fn find_all(&self, collection: &str) -> Result<Vec<Value>>;

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    /// Whole-document overwrite. `_id` is preserved. `None` if the id does
    /// not match any record.
    async fn replace(&self, collection: &str, id: &str, data: Value) -> Result<Option<Value>>;

    /// Remove by id, returning the removed document if one existed.
    async fn remove(&self, collection: &str, id: &str) -> Result<Option<Value>>;
}

fn with_assigned_id(collection: &str, data: Value) -> (String, Value) {
    let mut obj = data.as_object().cloned().unwrap_or_default();
    obj.remove("id");
    let id = format!("{}:{}", collection, Uuid::new_v4());
    obj.insert("_id".to_string(), Value::String(id.clone()));
    (id, Value::Object(obj))
}

fn with_pinned_id(id: &str, data: Value) -> Value {
    let mut obj = data.as_object().cloned().unwrap_or_default();
    obj.remove("id");
    obj.insert("_id".to_string(), Value::String(id.to_string()));
    Value::Object(obj)
}

/// In-memory record store.
pub struct MemoryStore {
    collections: RwLock<HashMap<String, HashMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, collection: &str, data: Value) -> Result<Value> {
        let (id, value) = with_assigned_id(collection, data);
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id, value.clone());
        Ok(value)
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Value>> {
        let collections = self.collections.read().await;
        let map = collections.get(collection);
        Ok(map.into_iter().flat_map(|m| m.values()).cloned().collect())
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|m| m.get(id))
            .cloned())
    }

    async fn replace(&self, collection: &str, id: &str, data: Value) -> Result<Option<Value>> {
        let mut collections = self.collections.write().await;
        let map = collections.entry(collection.to_string()).or_default();
        if !map.contains_key(id) {
            return Ok(None);
        }
        let value = with_pinned_id(id, data);
        map.insert(id.to_string(), value.clone());
        Ok(Some(value))
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .and_then(|m| m.remove(id)))
    }
}

/// Sled-backed record store: one tree per collection, documents stored as
/// JSON bytes under their `_id`.
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open(path: &str) -> Result<Self> {
        Ok(Self {
            db: sled::open(path)?,
        })
    }

    fn tree(&self, collection: &str) -> Result<sled::Tree> {
        Ok(self.db.open_tree(collection)?)
    }
}

#[async_trait]
impl RecordStore for SledStore {
    async fn insert(&self, collection: &str, data: Value) -> Result<Value> {
        let tree = self.tree(collection)?;
        let (id, value) = with_assigned_id(collection, data);
        tree.insert(id.as_bytes(), serde_json::to_vec(&value)?)?;
        Ok(value)
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Value>> {
        let tree = self.tree(collection)?;
        let mut out = Vec::new();
        for item in tree.iter() {
            let (_key, bytes) = item?;
            out.push(serde_json::from_slice(&bytes)?);
        }
        Ok(out)
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let tree = self.tree(collection)?;
        match tree.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn replace(&self, collection: &str, id: &str, data: Value) -> Result<Option<Value>> {
        let tree = self.tree(collection)?;
        if tree.get(id.as_bytes())?.is_none() {
            return Ok(None);
        }
        let value = with_pinned_id(id, data);
        tree.insert(id.as_bytes(), serde_json::to_vec(&value)?)?;
        Ok(Some(value))
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let tree = self.tree(collection)?;
        match tree.remove(id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn insert_assigns_an_internal_id() {
        let store = MemoryStore::new();
        let stored = store
            .insert("contacts", json!({"email": "a@b.com"}))
            .await
            .unwrap();
        let id = stored["_id"].as_str().unwrap();
        assert!(id.starts_with("contacts:"));
        assert_eq!(stored["email"], "a@b.com");
    }

    #[tokio::test]
    async fn replace_preserves_identity_and_drops_absent_fields() {
        let store = MemoryStore::new();
        let stored = store
            .insert("contacts", json!({"email": "a@b.com", "country": "X"}))
            .await
            .unwrap();
        let id = stored["_id"].as_str().unwrap();

        let updated = store
            .replace("contacts", id, json!({"email": "new@b.com"}))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["_id"], stored["_id"]);
        assert_eq!(updated["email"], "new@b.com");
        assert!(updated.get("country").is_none());
    }

    #[tokio::test]
    async fn replace_and_remove_of_unknown_ids_report_none() {
        let store = MemoryStore::new();
        assert!(store
            .replace("contacts", "contacts:missing", json!({}))
            .await
            .unwrap()
            .is_none());
        assert!(store
            .remove("contacts", "contacts:missing")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn sled_round_trips_documents() {
        let path = std::env::temp_dir().join(format!("vitrine-sled-{}", uuid::Uuid::new_v4()));
        let store = SledStore::open(path.to_str().unwrap()).unwrap();

        let stored = store
            .insert("news", json!({"title": "T", "images": []}))
            .await
            .unwrap();
        let id = stored["_id"].as_str().unwrap();

        assert_eq!(store.find_all("news").await.unwrap().len(), 1);
        assert_eq!(
            store.find_by_id("news", id).await.unwrap().unwrap()["title"],
            "T"
        );

        let removed = store.remove("news", id).await.unwrap().unwrap();
        assert_eq!(removed["title"], "T");
        assert!(store.find_all("news").await.unwrap().is_empty());

        drop(store);
        let _ = std::fs::remove_dir_all(path);
    }
}
