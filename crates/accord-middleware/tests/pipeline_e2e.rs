//! End-to-end pipeline tests.
//!
//! Builds the full validation chain for a `PUT /users/{id}` route and drives
//! requests through it:
//!
//! 1. Params - `id` must be an integer
//! 2. Query - `notify` is an optional boolean
//! 3. Headers - `x-tenant` is required
//! 4. Body - a user object
//! 5. Response guard - the updated user, or a 404 message

use std::collections::BTreeMap;
use std::sync::Arc;

use accord_contract::{Schema, SharedSchema};
use accord_middleware::{
    validate_body, validate_headers, validate_params, validate_query, validate_response,
    ApiRequest, BoxFuture, ConfigSource, FnMiddleware, MiddlewareContext, Next, Pipeline, Reply,
    Stage, ValidatedHeaders, ValidationConfig,
};
use http::{Method, StatusCode};
use parking_lot::Mutex;
use serde_json::{json, Value};

fn config() -> ConfigSource {
    ConfigSource::from(ValidationConfig::default())
}

fn user() -> Schema {
    Schema::object([
        ("name", Schema::string().min_length(1)),
        ("email", Schema::string().email()),
    ])
}

fn pipeline() -> Pipeline {
    let responses: BTreeMap<u16, SharedSchema> = [
        (
            200,
            SharedSchema::from(Schema::object([
                ("id", Schema::integer()),
                ("name", Schema::string()),
                ("email", Schema::string()),
            ])),
        ),
        (404, SharedSchema::from(Schema::object([("message", Schema::string())]))),
    ]
    .into_iter()
    .collect();

    // added out of order on purpose
    Pipeline::builder()
        .stage(Stage::ResponseGuard, validate_response(responses).with_config(config()))
        .stage(Stage::Body, validate_body(user()).with_config(config()))
        .stage(
            Stage::Headers,
            validate_headers(Schema::object([("x-tenant", Schema::string())]).passthrough())
                .with_config(config()),
        )
        .stage(
            Stage::Query,
            validate_query(Schema::object([(
                "notify",
                Schema::boolean().coerce().default(false),
            )]))
            .with_config(config()),
        )
        .stage(
            Stage::Params,
            validate_params(Schema::object([("id", Schema::integer().coerce())]))
                .with_config(config()),
        )
        .build()
}

type Seen = Arc<Mutex<Option<ApiRequest>>>;

async fn run(pipeline: &Pipeline, request: ApiRequest, reply: Reply) -> (Reply, Option<ApiRequest>) {
    let seen: Seen = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&seen);
    let reply = pipeline
        .process(MiddlewareContext::new(), request, move |_ctx, req| {
            *slot.lock() = Some(req);
            Box::pin(async move { reply })
        })
        .await;
    let seen = seen.lock().take();
    (reply, seen)
}

fn update(id: &str, uri: &str, body: Value) -> ApiRequest {
    ApiRequest::new(Method::PUT, uri.parse().unwrap())
        .with_params([("id", id)])
        .with_header("x-tenant", "acme")
        .with_json(body)
}

fn updated() -> Reply {
    Reply::json(json!({"id": 7, "name": "Ann", "email": "ann@example.com"}))
}

#[tokio::test]
async fn test_stages_run_in_fixed_order() {
    assert_eq!(
        pipeline().stage_names(),
        [
            "params-validator",
            "query-validator",
            "headers-validator",
            "body-validator",
            "response-guard",
        ]
    );
}

#[tokio::test]
async fn test_valid_request_reaches_handler_with_coerced_values() {
    let request = update(
        "7",
        "/users/7?notify=true",
        json!({"name": "Ann", "email": "ann@example.com"}),
    );

    let (reply, seen) = run(&pipeline(), request, updated()).await;

    assert_eq!(reply.status(), StatusCode::OK);
    let seen = seen.expect("handler should run");
    assert_eq!(seen.params(), &json!({"id": 7}));
    assert_eq!(seen.query(), &json!({"notify": true}));
    assert_eq!(
        seen.extensions().get::<ValidatedHeaders>().map(|h| &h.0["x-tenant"]),
        Some(&json!("acme"))
    );
}

#[tokio::test]
async fn test_params_failure_short_circuits_before_body() {
    // both params and body are invalid; only params is reported
    let request = update("seven", "/users/seven", json!({"name": ""}));

    let (reply, seen) = run(&pipeline(), request, updated()).await;

    assert!(seen.is_none());
    assert_eq!(reply.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(reply.json_body().unwrap()["type"], "params");
}

#[tokio::test]
async fn test_missing_header_is_rejected() {
    let request = ApiRequest::new(Method::PUT, "/users/7".parse().unwrap())
        .with_params([("id", "7")])
        .with_json(json!({"name": "Ann", "email": "ann@example.com"}));

    let (reply, _) = run(&pipeline(), request, updated()).await;

    assert_eq!(reply.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = reply.json_body().unwrap();
    assert_eq!(body["type"], "headers");
    assert_eq!(body["detail"]["properties"]["x-tenant"]["errors"][0], "Required");
}

#[tokio::test]
async fn test_invalid_body_error_is_not_revalidated_by_guard() {
    let request = update("7", "/users/7", json!({"name": "Ann", "email": "not-an-email"}));

    let (reply, seen) = run(&pipeline(), request, updated()).await;

    assert!(seen.is_none());
    assert_eq!(reply.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = reply.json_body().unwrap();
    assert_eq!(body["type"], "request");
    assert_eq!(body["detail"]["properties"]["email"]["errors"][0], "Invalid email");
}

#[tokio::test]
async fn test_guard_selects_schema_by_status() {
    let valid = json!({"name": "Ann", "email": "ann@example.com"});

    let missing = Reply::json(json!({"message": "no such user"})).with_status(StatusCode::NOT_FOUND);
    let (reply, _) = run(&pipeline(), update("7", "/users/7", valid.clone()), missing).await;
    assert_eq!(reply.status(), StatusCode::NOT_FOUND);

    let leaky = Reply::json(json!({"id": 7, "name": "Ann"}));
    let (reply, _) = run(&pipeline(), update("7", "/users/7", valid.clone()), leaky).await;
    assert_eq!(reply.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.json_body().unwrap()["type"], "response");

    let conflict = Reply::json(json!({"reason": "stale"})).with_status(StatusCode::CONFLICT);
    let (reply, _) = run(&pipeline(), update("7", "/users/7", valid), conflict).await;
    assert_eq!(reply.status(), StatusCode::CONFLICT);
    assert_eq!(reply.json_body(), Some(&json!({"reason": "stale"})));
}

fn stamp<'a>(
    ctx: &'a mut MiddlewareContext,
    request: ApiRequest,
    next: Next<'a>,
) -> BoxFuture<'a, Reply> {
    Box::pin(async move {
        let mut reply = next.run(ctx, request).await;
        if let Some(Value::Object(mut body)) = reply.json_body().cloned() {
            body.insert("internal".into(), json!(true));
            reply.set_json_body(Value::Object(body));
        }
        reply
    })
}

#[tokio::test]
async fn test_custom_stage_output_is_checked_by_guard() {
    let pipeline = Pipeline::builder()
        .custom(FnMiddleware::new("stamp", stamp))
        .stage(
            Stage::ResponseGuard,
            validate_response(Schema::object([("id", Schema::integer())])).with_config(config()),
        )
        .build();
    assert_eq!(pipeline.stages(), [Stage::ResponseGuard, Stage::Custom]);

    let request = ApiRequest::new(Method::GET, "/users/7".parse().unwrap());
    let (reply, _) = run(&pipeline, request, Reply::json(json!({"id": 7}))).await;

    // unknown keys added after the handler are stripped by the guard
    assert_eq!(reply.json_body(), Some(&json!({"id": 7})));
}
