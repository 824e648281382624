use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    extract::{OriginalUri, Path, Query, State},
    http::header::CONTENT_RANGE,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{MethodFilter, MethodRouter},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use vitrine_core::errors::ApiError;
use vitrine_core::{App, ServiceCapabilities, ServiceMethodKind};

use crate::{
    middlewares::multipart::{MultipartConfig, MultipartToJson},
    params::{FromRestParams, RestParams},
    HttpError, HttpState,
};

/// How a mounted service answers create/remove calls.
///
/// The intake surface mixes JSON bodies with fixed plain-text
/// confirmations, so the reply shape is a mount option rather than
/// something services know about.
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    /// Serialize the service result as JSON (200).
    Record,
    /// A fixed plain-text confirmation with an explicit status.
    Confirmation {
        status: u16,
        body: &'static str,
    },
}

impl Reply {
    fn render<R: Serialize>(&self, record: R) -> Response {
        match self {
            Reply::Record => Json(record).into_response(),
            Reply::Confirmation { status, body } => {
                let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::OK);
                (status, *body).into_response()
            }
        }
    }
}

/// Per-mount options for [`service_router`].
#[derive(Debug, Clone, Default)]
pub struct RestOptions {
    pub created: Option<Reply>,
    pub removed: Option<Reply>,
    pub content_range: bool,
    pub multipart: Option<MultipartConfig>,
}

impl RestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created_text(mut self, status: u16, body: &'static str) -> Self {
        self.created = Some(Reply::Confirmation { status, body });
        self
    }

    pub fn removed_text(mut self, body: &'static str) -> Self {
        self.removed = Some(Reply::Confirmation { status: 200, body });
        self
    }

    pub fn with_content_range(mut self) -> Self {
        self.content_range = true;
        self
    }

    pub fn with_multipart(mut self, config: MultipartConfig) -> Self {
        self.multipart = Some(config);
        self
    }
}

fn map_json_rejection(rejection: JsonRejection) -> HttpError {
    ApiError::bad_request("Failed to parse the request body as JSON")
        .with_errors(json!({"_schema": [rejection.to_string()]}))
        .into_anyhow()
        .into()
}

fn content_range_value(count: usize) -> HeaderValue {
    let value = if count == 0 {
        "items */0".to_string()
    } else {
        format!("items 0-{}/{}", count - 1, count)
    };
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("items */0"))
}

/// Build a REST router for a registered service. Only the methods in
/// `capabilities` are mounted:
///
/// - `GET /`      → find
/// - `POST /`     → create
/// - `PUT /{id}`  → update
/// - `DELETE /{id}` → remove
pub fn service_router<R, P>(
    service_name: Arc<String>,
    app: Arc<App<R, P>>,
    capabilities: &ServiceCapabilities,
    options: RestOptions,
) -> Router<()>
where
    R: Serialize + DeserializeOwned + Send + Sync + 'static,
    P: FromRestParams + Send + Sync + Clone + 'static,
{
    let state = HttpState { app };

    let mut collection: MethodRouter<HttpState<R, P>> = MethodRouter::new();

    if capabilities.allows(&ServiceMethodKind::Find) {
        let service_name = Arc::clone(&service_name);
        let content_range = options.content_range;
        collection = collection.on(MethodFilter::GET, {
            move |State(state): State<HttpState<R, P>>,
                  headers: HeaderMap,
                  Query(query): Query<std::collections::HashMap<String, String>>,
                  OriginalUri(uri): OriginalUri| async move {
                let params = RestParams::from_parts(&headers, query, "GET", &uri);
                let params = P::from_rest_params(params);

                let svc = state.app.service(&service_name)?;
                let res = svc.find(params).await?;

                let count = res.len();
                let mut response = Json(res).into_response();
                if content_range {
                    response
                        .headers_mut()
                        .insert(CONTENT_RANGE, content_range_value(count));
                }
                Ok::<_, HttpError>(response)
            }
        });
    }

    if capabilities.allows(&ServiceMethodKind::Create) {
        let service_name = Arc::clone(&service_name);
        let reply = options.created.unwrap_or(Reply::Record);
        collection = collection.on(MethodFilter::POST, {
            move |State(state): State<HttpState<R, P>>,
                  headers: HeaderMap,
                  Query(query): Query<std::collections::HashMap<String, String>>,
                  OriginalUri(uri): OriginalUri,
                  data: Result<Json<R>, JsonRejection>| async move {
                let Json(data) = data.map_err(map_json_rejection)?;

                let params = RestParams::from_parts(&headers, query, "POST", &uri);
                let params = P::from_rest_params(params);

                let svc = state.app.service(&service_name)?;
                let res = svc.create(data, params).await?;
                Ok::<_, HttpError>(reply.render(res))
            }
        });
    }

    let mut item: MethodRouter<HttpState<R, P>> = MethodRouter::new();

    if capabilities.allows(&ServiceMethodKind::Update) {
        let service_name = Arc::clone(&service_name);
        item = item.on(MethodFilter::PUT, {
            move |State(state): State<HttpState<R, P>>,
                  headers: HeaderMap,
                  Query(query): Query<std::collections::HashMap<String, String>>,
                  OriginalUri(uri): OriginalUri,
                  Path(id): Path<String>,
                  data: Result<Json<R>, JsonRejection>| async move {
                let Json(data) = data.map_err(map_json_rejection)?;

                let params = RestParams::from_parts(&headers, query, "PUT", &uri);
                let params = P::from_rest_params(params);

                let svc = state.app.service(&service_name)?;
                let res = svc.update(&id, data, params).await?;
                Ok::<_, HttpError>(Json(res))
            }
        });
    }

    if capabilities.allows(&ServiceMethodKind::Remove) {
        let service_name = Arc::clone(&service_name);
        let reply = options.removed.unwrap_or(Reply::Record);
        item = item.on(MethodFilter::DELETE, {
            move |State(state): State<HttpState<R, P>>,
                  headers: HeaderMap,
                  Query(query): Query<std::collections::HashMap<String, String>>,
                  OriginalUri(uri): OriginalUri,
                  Path(id): Path<String>| async move {
                let params = RestParams::from_parts(&headers, query, "DELETE", &uri);
                let params = P::from_rest_params(params);

                let svc = state.app.service(&service_name)?;
                let res = svc.remove(&id, params).await?;
                Ok::<_, HttpError>(reply.render(res))
            }
        });
    }

    let mut router = Router::new()
        .route("/", collection)
        .route("/{id}", item);

    if let Some(config) = options.multipart {
        router = router.layer(MultipartToJson::with_config(config));
    }

    router.with_state(state)
}
