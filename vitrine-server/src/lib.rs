mod app;
pub mod config;
pub mod services;

use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;
use tower_http::cors::CorsLayer;
use vitrine_axum::AxumApp;
use vitrine_core::App;

use crate::services::contacts::{contacts_shared, ContactsService};
use crate::services::news::{news_shared, NewsService};
use crate::services::{Adapters, SiteParams};

/// Build the app from environment configuration.
pub fn build() -> Result<AxumApp<Value, SiteParams>> {
    let app = app::base_app();
    let adapters = config::adapters_from_config(&app.config_snapshot())?;
    Ok(build_with(app, adapters))
}

/// Wire adapters and services onto an app. Adapters are constructed once,
/// injected here, and live for the process lifetime.
pub fn build_with(app: App<Value, SiteParams>, adapters: Adapters) -> AxumApp<Value, SiteParams> {
    let contacts = ContactsService::new(
        Arc::clone(&adapters.records),
        Arc::clone(&adapters.notifier),
    );
    let news = NewsService::new(Arc::clone(&adapters.records), Arc::clone(&adapters.images));

    let mut ax = AxumApp::new(app)
        .use_service(
            "/api/contacts",
            Arc::new(contacts),
            contacts_shared::rest_options(),
        )
        .use_service("/api/news", Arc::new(news), news_shared::rest_options())
        .service("/", || async { "vitrine backend is up" });

    // The site frontend is served from another origin, as the original
    // deployment was.
    ax.router = ax.router.layer(CorsLayer::permissive());
    ax
}
