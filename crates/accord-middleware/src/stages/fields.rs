//! Request field validators.
//!
//! One validator per request facet. On success the validated value is
//! written back (path parameters, query and body are replaced; headers are
//! stored as a [`ValidatedHeaders`] extension) and the chain continues. On
//! failure the error flag is set and a 422 reply built by the configured
//! formatter ends the chain.

use accord_contract::{Issue, IssueCode, Issues, SharedSchema, Validate};
use http::Method;
use serde_json::Value;

use crate::config::{ConfigSource, ValidationConfig};
use crate::context::MiddlewareContext;
use crate::error::{ErrorContext, ValidationKind};
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::pipeline::Stage;
use crate::types::{ApiRequest, Reply, ValidatedHeaders};

/// The request facet a [`FieldValidator`] checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    /// Path parameters.
    Params,
    /// Query string.
    Query,
    /// Headers.
    Headers,
    /// JSON body.
    Body,
}

impl Facet {
    /// The validation kind reported on failure.
    pub fn kind(self) -> ValidationKind {
        match self {
            Self::Params => ValidationKind::Params,
            Self::Query => ValidationKind::Query,
            Self::Headers => ValidationKind::Headers,
            Self::Body => ValidationKind::Request,
        }
    }

    /// The pipeline position of validators for this facet.
    pub fn stage(self) -> Stage {
        match self {
            Self::Params => Stage::Params,
            Self::Query => Stage::Query,
            Self::Headers => Stage::Headers,
            Self::Body => Stage::Body,
        }
    }

    fn stage_name(self) -> &'static str {
        match self {
            Self::Params => "params-validator",
            Self::Query => "query-validator",
            Self::Headers => "headers-validator",
            Self::Body => "body-validator",
        }
    }
}

/// Validates one request facet against a schema.
#[derive(Debug, Clone)]
pub struct FieldValidator {
    facet: Facet,
    schema: SharedSchema,
    config: ConfigSource,
}

impl FieldValidator {
    /// Creates a validator reading the process-wide configuration.
    pub fn new(facet: Facet, schema: impl Into<SharedSchema>) -> Self {
        Self {
            facet,
            schema: schema.into(),
            config: ConfigSource::Global,
        }
    }

    /// Uses `config` instead of the process-wide configuration.
    #[must_use]
    pub fn with_config(mut self, config: ConfigSource) -> Self {
        self.config = config;
        self
    }

    /// The validated facet.
    pub fn facet(&self) -> Facet {
        self.facet
    }

    fn check(&self, request: &ApiRequest) -> Result<Value, Issues> {
        match self.facet {
            Facet::Params => self.schema.safe_parse(request.params()),
            Facet::Query => self.schema.safe_parse(request.query()),
            Facet::Headers => self.schema.safe_parse(&request.header_object()),
            Facet::Body => match request.body_error() {
                Some(err) => Err(Issues::single(Issue::new(
                    IssueCode::InvalidJson,
                    format!("Malformed JSON body: {err}"),
                ))),
                None => self.schema.safe_parse(request.body()),
            },
        }
    }

    fn apply(&self, request: &mut ApiRequest, value: Value) {
        match self.facet {
            Facet::Params => request.set_params(value),
            Facet::Query => request.set_query(value),
            Facet::Headers => {
                request.extensions_mut().insert(ValidatedHeaders(value));
            }
            Facet::Body => request.set_body(value),
        }
    }
}

impl Middleware for FieldValidator {
    fn name(&self) -> &'static str {
        self.facet.stage_name()
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        mut request: ApiRequest,
        next: Next<'a>,
    ) -> BoxFuture<'a, Reply> {
        Box::pin(async move {
            match self.check(&request) {
                Ok(value) => {
                    self.apply(&mut request, value);
                    tracing::trace!(
                        request_id = %ctx.request_id(),
                        stage = self.name(),
                        "validation passed"
                    );
                    next.run(ctx, request).await
                }
                Err(issues) => {
                    ctx.mark_validation_failed();
                    let config = self.config.load();
                    tracing::debug!(
                        request_id = %ctx.request_id(),
                        method = %request.method(),
                        path = request.path(),
                        kind = %self.facet.kind(),
                        issues = %issues,
                        "request rejected"
                    );
                    rejection(
                        &config,
                        self.facet.kind(),
                        request.method(),
                        request.path(),
                        &issues,
                    )
                }
            }
        })
    }
}

/// Builds the reply for a failed validation.
pub(crate) fn rejection(
    config: &ValidationConfig,
    kind: ValidationKind,
    method: &Method,
    path: &str,
    issues: &Issues,
) -> Reply {
    let body = config.format_error(&ErrorContext {
        kind,
        method,
        path,
        issues,
    });
    Reply::json(body).with_status(kind.status())
}

/// Validates path parameters.
pub fn validate_params(schema: impl Into<SharedSchema>) -> FieldValidator {
    FieldValidator::new(Facet::Params, schema)
}

/// Validates the query string.
pub fn validate_query(schema: impl Into<SharedSchema>) -> FieldValidator {
    FieldValidator::new(Facet::Query, schema)
}

/// Validates headers. Header names are lowercase.
pub fn validate_headers(schema: impl Into<SharedSchema>) -> FieldValidator {
    FieldValidator::new(Facet::Headers, schema)
}

/// Validates the JSON body.
pub fn validate_body(schema: impl Into<SharedSchema>) -> FieldValidator {
    FieldValidator::new(Facet::Body, schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_contract::Schema;
    use http::StatusCode;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;

    struct Outcome {
        reply: Reply,
        flagged: bool,
        seen: Option<ApiRequest>,
    }

    async fn drive(validator: FieldValidator, request: ApiRequest) -> Outcome {
        let validator = validator.with_config(ConfigSource::from(ValidationConfig::default()));
        let seen = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&seen);
        let mut ctx = MiddlewareContext::new();

        let next = Next::handler(move |_ctx, req| {
            *slot.lock() = Some(req);
            Box::pin(async { Reply::json(json!({"ok": true})) })
        });
        let reply = Next::new(&validator, next).run(&mut ctx, request).await;

        let seen = seen.lock().take();
        Outcome {
            reply,
            flagged: ctx.validation_failed(),
            seen,
        }
    }

    fn get(uri: &str) -> ApiRequest {
        ApiRequest::new(Method::GET, uri.parse().unwrap())
    }

    fn user_schema() -> Schema {
        Schema::object([
            ("name", Schema::string()),
            ("age", Schema::number().coerce()),
        ])
    }

    #[tokio::test]
    async fn test_body_is_replaced_with_coerced_value() {
        let request = ApiRequest::new(Method::POST, "/users".parse().unwrap())
            .with_json(json!({"name": "mike", "age": "25", "extra": 1}));

        let outcome = drive(validate_body(user_schema()), request).await;

        assert_eq!(outcome.reply.status(), StatusCode::OK);
        assert!(!outcome.flagged);
        assert_eq!(
            outcome.seen.unwrap().body(),
            &json!({"name": "mike", "age": 25})
        );
    }

    #[tokio::test]
    async fn test_invalid_body_is_rejected_before_handler() {
        let request = ApiRequest::new(Method::POST, "/users".parse().unwrap())
            .with_json(json!({"name": "mike", "age": "x"}));

        let outcome = drive(validate_body(user_schema()), request).await;

        assert_eq!(outcome.reply.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(outcome.flagged);
        assert!(outcome.seen.is_none());

        let body = outcome.reply.json_body().unwrap();
        assert_eq!(body["error"], "Request validation failed");
        assert_eq!(body["type"], "request");
        assert_eq!(
            body["detail"]["properties"]["age"]["errors"][0],
            "Expected number, received string"
        );
    }

    #[tokio::test]
    async fn test_malformed_json_is_reported() {
        let request = ApiRequest::new(Method::POST, "/users".parse().unwrap())
            .with_raw_body("{\"name\":");

        let outcome = drive(validate_body(user_schema()), request).await;

        assert_eq!(outcome.reply.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let message = outcome.reply.json_body().unwrap()["detail"]["errors"][0]
            .as_str()
            .unwrap()
            .to_string();
        assert!(message.starts_with("Malformed JSON body"), "{message}");
    }

    #[tokio::test]
    async fn test_short_query_is_rejected() {
        let validator = validate_query(Schema::object([("q", Schema::string().min_length(3))]));

        let outcome = drive(validator, get("/search?q=ab")).await;

        assert_eq!(outcome.reply.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(outcome.seen.is_none());
        assert_eq!(outcome.reply.json_body().unwrap()["type"], "query");
    }

    #[tokio::test]
    async fn test_query_is_replaced_with_defaults_and_coercion() {
        let validator = validate_query(Schema::object([
            ("q", Schema::string()),
            ("page", Schema::integer().coerce().default(1)),
            ("tags", Schema::array(Schema::string()).coerce().optional()),
        ]));

        let outcome = drive(validator, get("/search?q=rust&tags=web")).await;

        assert_eq!(
            outcome.seen.unwrap().query(),
            &json!({"q": "rust", "page": 1, "tags": ["web"]})
        );
    }

    #[tokio::test]
    async fn test_params_coercion_and_rejection() {
        let schema: SharedSchema = Arc::new(Schema::object([("id", Schema::integer().coerce())]));

        let ok = drive(
            validate_params(Arc::clone(&schema)),
            get("/users/42").with_params([("id", "42")]),
        )
        .await;
        assert_eq!(ok.seen.unwrap().params(), &json!({"id": 42}));

        let bad = drive(validate_params(schema), get("/users/abc").with_params([("id", "abc")])).await;
        assert_eq!(bad.reply.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(bad.reply.json_body().unwrap()["type"], "params");
    }

    #[tokio::test]
    async fn test_headers_are_validated_and_recorded() {
        let validator = || {
            validate_headers(
                Schema::object([("x-api-key", Schema::string().min_length(1))]).passthrough(),
            )
        };

        let ok = drive(validator(), get("/admin").with_header("X-Api-Key", "secret")).await;
        let seen = ok.seen.unwrap();
        let validated = seen.extensions().get::<ValidatedHeaders>().unwrap();
        assert_eq!(validated.0["x-api-key"], "secret");
        assert_eq!(seen.headers()["x-api-key"], "secret");

        let missing = drive(validator(), get("/admin")).await;
        assert_eq!(missing.reply.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(missing.reply.json_body().unwrap()["type"], "headers");
    }

    #[tokio::test]
    async fn test_configured_formatter_is_used() {
        let config = ValidationConfig::default().with_error_formatter(|ctx| {
            json!({"message": format!("{} {} failed {}", ctx.method, ctx.path, ctx.kind)})
        });
        let validator = validate_query(Schema::object([("q", Schema::string())]))
            .with_config(ConfigSource::from(config));

        let mut ctx = MiddlewareContext::new();
        let next = Next::handler(|_ctx, _req| Box::pin(async { Reply::default() }));
        let reply = Next::new(&validator, next).run(&mut ctx, get("/search")).await;

        assert_eq!(
            reply.json_body(),
            Some(&json!({"message": "GET /search failed query"}))
        );
    }
}
