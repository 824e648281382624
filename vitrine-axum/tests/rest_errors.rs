use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use vitrine_axum::{AxumApp, RestOptions};
use vitrine_core::errors::ApiError;
use vitrine_core::{App, CrudService, ServiceCapabilities, ServiceMethodKind};

struct UnprocessableOnCreate;

#[async_trait::async_trait]
impl CrudService<Value, ()> for UnprocessableOnCreate {
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::from_methods(vec![ServiceMethodKind::Create])
    }

    async fn create(&self, _data: Value, _params: ()) -> anyhow::Result<Value> {
        Err(ApiError::unprocessable("Invalid")
            .with_errors(json!({"title": ["required"]}))
            .into_anyhow())
    }
}

struct BoomOnCreate;

#[async_trait::async_trait]
impl CrudService<Value, ()> for BoomOnCreate {
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::from_methods(vec![ServiceMethodKind::Create])
    }

    async fn create(&self, _data: Value, _params: ()) -> anyhow::Result<Value> {
        Err(anyhow::anyhow!("boom"))
    }
}

fn mount(service: Arc<dyn CrudService<Value, ()>>) -> AxumApp<Value, ()> {
    let app: App<Value, ()> = App::new();
    AxumApp::new(app).use_service("/posts", service, RestOptions::new())
}

async fn json_body(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn malformed_json_returns_bad_request_shape() {
    let ax = mount(Arc::new(BoomOnCreate));

    let res = ax
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/posts")
                .header("content-type", "application/json")
                .body(Body::from("{\"title\":\"x\""))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 400);
    let body = json_body(res).await;
    assert_eq!(body["name"], "BadRequest");
    assert_eq!(body["code"], 400);
    assert_eq!(body["className"], "bad-request");
    assert!(body.get("errors").is_some());
}

#[tokio::test]
async fn api_error_preserves_status_and_shape() {
    let ax = mount(Arc::new(UnprocessableOnCreate));

    let res = ax
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/posts")
                .header("content-type", "application/json")
                .body(Body::from("{\"title\":\"ok\"}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 422);
    let body = json_body(res).await;
    assert_eq!(body["name"], "Unprocessable");
    assert_eq!(body["code"], 422);
    assert_eq!(body["className"], "unprocessable");
    assert_eq!(body["errors"], json!({"title": ["required"]}));
}

#[tokio::test]
async fn plain_errors_map_to_an_opaque_general_error() {
    let ax = mount(Arc::new(BoomOnCreate));

    let res = ax
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/posts")
                .header("content-type", "application/json")
                .body(Body::from("{\"title\":\"ok\"}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 500);
    let body = json_body(res).await;
    assert_eq!(body["name"], "GeneralError");
    assert_eq!(body["code"], 500);
    assert_eq!(body["className"], "general-error");
    // Internal detail stays in the log, not the payload.
    assert_eq!(body["message"], "Server error");
}

#[tokio::test]
async fn methods_outside_capabilities_are_not_mounted() {
    let ax = mount(Arc::new(BoomOnCreate));

    let res = ax
        .router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/posts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 405);
}
