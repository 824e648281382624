use serde_json::Value;
use vitrine_core::App;

use crate::services::SiteParams;

/// Base app: defaults first, then environment overrides.
pub(crate) fn base_app() -> App<Value, SiteParams> {
    let app: App<Value, SiteParams> = App::new();
    app.set("http.host", "127.0.0.1");
    app.set("http.port", "5000");
    app.set("store.backend", "memory");
    app.load_env(crate::config::ENV_PREFIX);
    app
}
