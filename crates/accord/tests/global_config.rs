//! Process-wide validation configuration.
//!
//! Every test here mutates global state, so they serialize on a lock and
//! restore the defaults before releasing it.

use std::sync::Arc;

use accord::prelude::*;
use accord_test::TestClient;
use parking_lot::Mutex;
use serde_json::{json, Value};

static GLOBAL_CONFIG: Mutex<()> = Mutex::new(());

async fn wrong_shape(_request: ApiRequest) -> Value {
    json!({"count": "three"})
}

fn client() -> TestClient {
    // no pinned config: stages read the global snapshot per request
    let app = TypedRouter::with_registry(Arc::new(DocsRegistry::new()))
        .get_with(
            "/stats",
            Contract::builder()
                .query(Schema::object([("window", Schema::string().min_length(2))]))
                .response(Schema::object([("count", Schema::integer())])),
            wrong_shape,
        )
        .build()
        .unwrap();
    TestClient::new(app)
}

#[test]
fn formatter_applies_to_existing_routes() {
    let _guard = GLOBAL_CONFIG.lock();
    reset_config();
    let client = client();

    configure(ConfigPatch::new().format_error(|ctx| {
        json!({"code": "VALIDATION", "where": ctx.kind.as_str(), "issues": ctx.issues.len()})
    }));

    let response = tokio_test::block_on(client.get("/stats?window=x").send());
    response
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
        .assert_json_eq(&json!({"code": "VALIDATION", "where": "query", "issues": 1}));

    reset_config();
    let response = tokio_test::block_on(client.get("/stats?window=x").send());
    response.assert_json_field("error", &json!("Query validation failed"));
}

#[test]
fn response_validation_can_be_switched_off() {
    let _guard = GLOBAL_CONFIG.lock();
    reset_config();
    let client = client();

    let response = tokio_test::block_on(client.get("/stats?window=1h").send());
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    configure(ConfigPatch::new().validate_responses(false));
    let response = tokio_test::block_on(client.get("/stats?window=1h").send());
    response
        .assert_status(StatusCode::OK)
        .assert_json_eq(&json!({"count": "three"}));

    reset_config();
}

#[test]
fn patches_merge() {
    let _guard = GLOBAL_CONFIG.lock();
    reset_config();

    configure(ConfigPatch::new().validate_responses(false));
    configure(ConfigPatch::new().skip_response_validation_for_status([418]));

    let config = accord::middleware::current_config();
    assert!(!config.validate_responses());
    assert_eq!(config.skipped_statuses().iter().copied().collect::<Vec<_>>(), vec![418]);

    reset_config();
    assert!(accord::middleware::current_config().validate_responses());
}
