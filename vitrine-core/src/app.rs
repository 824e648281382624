use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use anyhow::Result;

use crate::config::{Config, ConfigSnapshot};
use crate::service::CrudService;

struct AppInner<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    registry: RwLock<HashMap<String, Arc<dyn CrudService<R, P>>>>,
    config: RwLock<Config>,
}

/// App is the central application container.
///
/// Transport-agnostic. Holds:
/// - service registry
/// - config
///
/// Adapters (store, blob host, notifier) are constructed once at startup
/// and injected into services before registration; App never holds them
/// directly and nothing here is rebuilt per request.
pub struct App<R, P = ()>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    inner: Arc<AppInner<R, P>>,
}

impl<R, P> Default for App<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R, P> Clone for App<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, P> App<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(AppInner {
                registry: RwLock::new(HashMap::new()),
                config: RwLock::new(Config::new()),
            }),
        }
    }

    pub fn register_service<S>(&self, name: S, service: Arc<dyn CrudService<R, P>>)
    where
        S: Into<String>,
    {
        self.inner
            .registry
            .write()
            .unwrap()
            .insert(name.into(), service);
    }

    /// `app.service("contacts")`
    pub fn service(&self, name: &str) -> Result<ServiceHandle<R, P>> {
        let svc = self
            .inner
            .registry
            .read()
            .unwrap()
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("Service not found: {name}"))?
            .clone();

        Ok(ServiceHandle {
            name: name.to_string(),
            service: svc,
        })
    }

    /// `app.set(key, value)`
    pub fn set<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.inner.config.write().unwrap().set(key, value);
    }

    /// `app.get(key)`
    pub fn get(&self, key: &str) -> Option<String> {
        let cfg = self.inner.config.read().unwrap();
        cfg.get(key).map(|v| v.to_string())
    }

    /// Overlay `PREFIX__SECTION__KEY` environment variables onto config.
    pub fn load_env(&self, prefix: &str) {
        self.inner.config.write().unwrap().load_env(prefix);
    }

    pub fn config_snapshot(&self) -> ConfigSnapshot {
        let cfg = self.inner.config.read().unwrap();
        cfg.snapshot()
    }
}

/// A named handle to a registered service.
pub struct ServiceHandle<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    name: String,
    service: Arc<dyn CrudService<R, P>>,
}

impl<R, P> ServiceHandle<R, P>
where
    R: Send + 'static,
    P: Send + Clone + 'static,
{
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inner(&self) -> &Arc<dyn CrudService<R, P>> {
        &self.service
    }

    pub async fn find(&self, params: P) -> Result<Vec<R>> {
        self.service.find(params).await
    }

    pub async fn create(&self, data: R, params: P) -> Result<R> {
        self.service.create(data, params).await
    }

    pub async fn update(&self, id: &str, data: R, params: P) -> Result<R> {
        self.service.update(id, data, params).await
    }

    pub async fn remove(&self, id: &str, params: P) -> Result<R> {
        self.service.remove(id, params).await
    }
}
