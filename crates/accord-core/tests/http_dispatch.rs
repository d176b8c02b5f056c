//! Dispatching raw HTTP requests through a built app.

use std::sync::Arc;

use accord_contract::{Contract, Schema};
use accord_core::TypedRouter;
use accord_docs::DocsRegistry;
use accord_middleware::{ApiRequest, ValidationConfig};
use bytes::Bytes;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};

async fn search(request: ApiRequest) -> Value {
    let q = request.query()["q"].as_str().unwrap_or_default().to_string();
    let limit = request.query()["limit"].clone();
    json!({"results": [q], "limit": limit})
}

fn app(config: ValidationConfig) -> accord_core::App {
    TypedRouter::with_registry(Arc::new(DocsRegistry::new()))
        .validation_config(config)
        .get_with(
            "/search",
            Contract::builder()
                .query(Schema::object([
                    ("q", Schema::string().min_length(3)),
                    ("limit", Schema::integer().coerce().default(json!(10))),
                ]))
                .response(Schema::object([
                    ("results", Schema::array(Schema::string())),
                    ("limit", Schema::integer()),
                ])),
            search,
        )
        .build()
        .unwrap()
}

async fn body_json(response: http::Response<http_body_util::Full<Bytes>>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn query_is_coerced_and_defaulted() {
    let app = app(ValidationConfig::default());

    let request = Request::builder()
        .method(Method::GET)
        .uri("/search?q=rust&limit=5")
        .body(Bytes::new())
        .unwrap();
    let response = app.call(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"results": ["rust"], "limit": 5})
    );

    let request = Request::builder()
        .uri("/search?q=rust")
        .body(Bytes::new())
        .unwrap();
    let response = app.call(request).await;
    assert_eq!(body_json(response).await["limit"], 10);
}

#[tokio::test]
async fn short_query_is_rejected_with_error_tree() {
    let app = app(ValidationConfig::default());

    let request = Request::builder()
        .uri("/search?q=ab")
        .body(Bytes::new())
        .unwrap();
    let response = app.call(request).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Query validation failed");
    assert_eq!(body["type"], "query");
    assert!(body["detail"]["properties"]["q"]["errors"][0]
        .as_str()
        .unwrap()
        .contains("at least 3"));
}

#[tokio::test]
async fn injected_formatter_shapes_errors() {
    let config = ValidationConfig::default().with_error_formatter(|ctx| {
        json!({"failed": ctx.kind.as_str(), "route": format!("{} {}", ctx.method, ctx.path)})
    });
    let app = app(config);

    let request = Request::builder().uri("/search").body(Bytes::new()).unwrap();
    let response = app.call(request).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await,
        json!({"failed": "query", "route": "GET /search"})
    );
}
