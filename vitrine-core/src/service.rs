use anyhow::{anyhow, Result};
use async_trait::async_trait;

/// Standard service methods: find, create, update, remove.
///
/// `get` is deliberately absent from the public surface: nothing in this
/// system exposes fetch-by-id over the wire; services that need to read a
/// single record do so through their store adapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceMethodKind {
    Find,
    Create,
    Update,
    Remove,
}

/// Capabilities describe which methods a service wants to expose to the
/// outside world. The REST adapter uses this to mount only allowed routes.
#[derive(Debug, Clone)]
pub struct ServiceCapabilities {
    pub allowed_methods: Vec<ServiceMethodKind>,
}

impl ServiceCapabilities {
    /// Everything this system's services can expose.
    pub fn standard_crud() -> Self {
        use ServiceMethodKind::*;
        Self {
            allowed_methods: vec![Find, Create, Update, Remove],
        }
    }

    /// Helper for building from a list.
    pub fn from_methods(methods: Vec<ServiceMethodKind>) -> Self {
        Self {
            allowed_methods: methods,
        }
    }

    pub fn allows(&self, method: &ServiceMethodKind) -> bool {
        self.allowed_methods.contains(method)
    }
}

/// Core CRUD service trait:
///
/// - `find`   → list many
/// - `create` → create one
/// - `update` → full replace by id
/// - `remove` → delete by id
///
/// All methods have default implementations that return
/// "Method not implemented", so a service can override only
/// what it actually supports.
#[async_trait]
pub trait CrudService<R, P = ()>: Send + Sync
where
    R: Send + 'static,
    P: Send + 'static,
{
    /// Describe which methods this service wants to expose.
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::standard_crud()
    }

    /// Find many records (optionally filtered by params).
    async fn find(&self, _params: P) -> Result<Vec<R>> {
        Err(anyhow!("Method not implemented: find"))
    }

    /// Create a new record.
    async fn create(&self, _data: R, _params: P) -> Result<R> {
        Err(anyhow!("Method not implemented: create"))
    }

    /// Fully replace an existing record. `id` is required.
    async fn update(&self, _id: &str, _data: R, _params: P) -> Result<R> {
        Err(anyhow!("Method not implemented: update"))
    }

    /// Remove an existing record by id.
    async fn remove(&self, _id: &str, _params: P) -> Result<R> {
        Err(anyhow!("Method not implemented: remove"))
    }
}
