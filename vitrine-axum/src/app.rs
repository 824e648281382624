use std::sync::Arc;

use axum::handler::Handler;
use axum::routing::get;
use axum::Router;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower_http::trace::TraceLayer;
use vitrine_core::{App, CrudService};

use crate::params::FromRestParams;
use crate::rest::{self, RestOptions};

pub struct AxumApp<R, P = ()>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    pub app: Arc<App<R, P>>,
    pub router: Router<()>,
}

impl<R, P> Clone for AxumApp<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            app: Arc::clone(&self.app),
            router: self.router.clone(),
        }
    }
}

impl<R, P> AxumApp<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    pub fn new(app: App<R, P>) -> Self {
        Self {
            app: Arc::new(app),
            router: Router::new(),
        }
    }

    pub fn use_router(mut self, path: &str, router: Router<()>) -> Self {
        self.router = self.router.nest(path, router);
        self
    }

    /// Mount a bare handler, e.g. a liveness probe.
    pub fn service<H, T>(mut self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()> + Clone + Send + Sync + 'static,
        T: 'static,
    {
        self.router = self.router.route(path, get(handler));
        self
    }

    /// Register a CRUD service and mount its REST routes under `path`.
    pub fn use_service(
        self,
        path: &'static str,
        service: Arc<dyn CrudService<R, P>>,
        options: RestOptions,
    ) -> Self
    where
        R: Serialize + DeserializeOwned,
        P: FromRestParams,
    {
        let name = path.trim_start_matches('/');
        let capabilities = service.capabilities();
        self.app.register_service(name, service);

        let service_name = Arc::new(name.to_string());
        let router = rest::service_router(
            Arc::clone(&service_name),
            Arc::clone(&self.app),
            &capabilities,
            options,
        );

        self.use_router(path, router)
    }

    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        let router = self.router.layer(TraceLayer::new_for_http());
        axum::serve(listener, router).await?;
        Ok(())
    }
}
