use std::sync::Arc;

use vitrine_core::App;

pub struct HttpState<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    pub app: Arc<App<R, P>>,
}

impl<R, P> Clone for HttpState<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            app: Arc::clone(&self.app),
        }
    }
}

impl<R, P> HttpState<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    pub fn new(app: App<R, P>) -> Self {
        Self { app: Arc::new(app) }
    }
}
