//! Contract routes end to end through the facade.

use std::sync::Arc;

use accord::prelude::*;
use accord_test::TestClient;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Deserialize)]
struct NewOrder {
    sku: String,
    quantity: u32,
}

#[derive(Serialize)]
struct Order {
    id: u64,
    sku: String,
    quantity: u32,
}

async fn place_order(input: NewOrder, _request: ApiRequest) -> Result<Order, (StatusCode, Value)> {
    if input.sku == "discontinued" {
        return Err((StatusCode::CONFLICT, json!({"error": "SKU discontinued"})));
    }
    Ok(Order {
        id: 7,
        sku: input.sku,
        quantity: input.quantity,
    })
}

async fn drifting(_request: ApiRequest) -> Value {
    json!({"id": "not-a-number"})
}

fn order_schema() -> Schema {
    Schema::object([
        ("id", Schema::integer()),
        ("sku", Schema::string()),
        ("quantity", Schema::integer()),
    ])
}

fn client() -> (TestClient, Arc<DocsRegistry>) {
    let registry = Arc::new(DocsRegistry::new());
    let app = TypedRouter::with_registry(Arc::clone(&registry))
        .validation_config(ValidationConfig::default())
        .docs(DocsMount::titled("Orders"))
        .post_with(
            "/orders",
            Contract::builder()
                .request(Schema::object([
                    ("sku", Schema::string().min_length(1)),
                    ("quantity", Schema::integer().minimum(1.0).default(json!(1))),
                ]))
                .response(order_schema())
                .tag("Orders"),
            typed(place_order),
        )
        .get_with(
            "/drift",
            Contract::builder().response(Schema::object([("id", Schema::integer())])),
            drifting,
        )
        .build()
        .unwrap();
    (TestClient::new(app), registry)
}

#[tokio::test]
async fn body_defaults_reach_typed_handler() {
    let (client, _) = client();
    client
        .post("/orders")
        .json(&json!({"sku": "A-1"}))
        .send()
        .await
        .assert_status(StatusCode::OK)
        .assert_json_eq(&json!({"id": 7, "sku": "A-1", "quantity": 1}));
}

#[tokio::test]
async fn invalid_body_gets_error_tree() {
    let (client, _) = client();
    let response = client
        .post("/orders")
        .json(&json!({"sku": "", "quantity": 0}))
        .send()
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.json_value().unwrap();
    assert_eq!(body["error"], "Request validation failed");
    assert!(body["detail"]["properties"]["sku"]["errors"].is_array());
    assert!(body["detail"]["properties"]["quantity"]["errors"].is_array());
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let (client, _) = client();
    let response = client
        .post("/orders")
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn skipped_status_passes_guard() {
    let (client, _) = client();
    client
        .post("/orders")
        .json(&json!({"sku": "discontinued", "quantity": 2}))
        .send()
        .await
        .assert_status(StatusCode::CONFLICT)
        .assert_json_field("error", &json!("SKU discontinued"));
}

#[tokio::test]
async fn response_drift_is_caught() {
    let (client, _) = client();
    let response = client.get("/drift").send().await;
    response
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_json_field("type", &json!("response"));
}

#[tokio::test]
async fn routes_are_documented() {
    let (client, registry) = client();
    assert_eq!(registry.len(), 2);

    let document = client.get("/docs/openapi.json").send().await;
    document.assert_status(StatusCode::OK);
    let document = document.json_value().unwrap();
    assert_eq!(document["info"]["title"], "Orders");
    assert_eq!(document["paths"]["/orders"]["post"]["tags"], json!(["Orders"]));
    assert_eq!(
        document["paths"]["/drift"]["get"]["summary"],
        "GET /drift"
    );

    let page = client.get("/docs").send().await;
    page.assert_status(StatusCode::OK);
    assert!(page.text().unwrap().contains("/docs/openapi.json"));
}
