//! Contract-aware route registration.
//!
//! [`TypedRouter`] is the route interceptor. Every registration method
//! comes in two flavours:
//!
//! - plain (`get`, `post`, ..., `route`): the handler is registered as is,
//!   without validation and without documentation;
//! - contract-bound (`get_with`, `post_with`, ..., `route_with`): the
//!   contract is turned into a validation [`Pipeline`] in front of the
//!   handler and the route is recorded in the [`DocsRegistry`].
//!
//! ```text
//! params → query → headers → body → response guard → [layers] → handler
//! ```
//!
//! A contract that fails to build is reported with `tracing::warn!` and the
//! route falls back to plain registration, so one bad contract does not
//! stop the service. With [`TypedRouter::strict`] the failures are also
//! collected and [`TypedRouter::build`] refuses to produce an [`App`].

use std::sync::Arc;

use accord_contract::{Contract, ContractError, IntoContract};
use accord_docs::{DocsMount, DocsRegistry, OpenApiGenerator, SwaggerUi};
use accord_middleware::{
    validate_body, validate_headers, validate_params, validate_query, validate_response,
    ApiRequest, BoxedMiddleware, ConfigSource, Pipeline, Reply, Stage, ValidationConfig,
};
use accord_router::Router;
use http::{Method, StatusCode};
use serde_json::json;

use crate::app::{App, Endpoint};
use crate::error::{MalformedRoute, RouterError, RouterResult};
use crate::handler::{BoxedHandler, Handler};

/// Methods registered by [`TypedRouter::any`] and [`TypedRouter::any_with`].
pub const ANY_METHODS: [Method; 7] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::HEAD,
    Method::OPTIONS,
];

/// Tag used when a path has no first segment to derive one from.
pub const DEFAULT_TAG: &str = "Default";

struct Registration {
    methods: Vec<Method>,
    path: String,
    contract: Option<Arc<Contract>>,
    layers: Vec<BoxedMiddleware>,
    handler: BoxedHandler,
}

/// Route registration with contract validation and documentation.
///
/// # Example
///
/// ```rust
/// use accord_contract::{Contract, Schema};
/// use accord_core::TypedRouter;
/// use accord_middleware::ApiRequest;
/// use serde_json::{json, Value};
///
/// async fn get_user(request: ApiRequest) -> Value {
///     json!({"id": request.param("id").cloned(), "name": "Ada"})
/// }
///
/// let app = TypedRouter::new()
///     .get_with(
///         "/users/{id}",
///         Contract::builder()
///             .params(Schema::object([("id", Schema::string())]))
///             .response(Schema::object([
///                 ("id", Schema::string()),
///                 ("name", Schema::string()),
///             ])),
///         get_user,
///     )
///     .build()
///     .unwrap();
///
/// assert_eq!(app.route_count(), 1);
/// ```
pub struct TypedRouter {
    registrations: Vec<Registration>,
    registry: Arc<DocsRegistry>,
    config: ConfigSource,
    strict: bool,
    malformed: Vec<MalformedRoute>,
    docs: Option<DocsMount>,
}

impl Default for TypedRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl TypedRouter {
    /// Creates a router documenting into [`DocsRegistry::global`] and
    /// validating with the process-wide configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(DocsRegistry::global())
    }

    /// Creates a router documenting into `registry`.
    #[must_use]
    pub fn with_registry(registry: Arc<DocsRegistry>) -> Self {
        Self {
            registrations: Vec::new(),
            registry,
            config: ConfigSource::Global,
            strict: false,
            malformed: Vec::new(),
            docs: None,
        }
    }

    /// Validates every route with `config` instead of the process-wide
    /// configuration.
    #[must_use]
    pub fn validation_config(mut self, config: ValidationConfig) -> Self {
        self.config = ConfigSource::from(config);
        self
    }

    /// Makes [`build`](Self::build) fail when any contract was malformed.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Serves the OpenAPI document and the Swagger UI page.
    #[must_use]
    pub fn docs(mut self, mount: DocsMount) -> Self {
        self.docs = Some(mount);
        self
    }

    /// Registers a plain GET route.
    #[must_use]
    pub fn get<H: Handler>(self, path: &str, handler: H) -> Self {
        self.route(Method::GET, path, handler)
    }

    /// Registers a plain POST route.
    #[must_use]
    pub fn post<H: Handler>(self, path: &str, handler: H) -> Self {
        self.route(Method::POST, path, handler)
    }

    /// Registers a plain PUT route.
    #[must_use]
    pub fn put<H: Handler>(self, path: &str, handler: H) -> Self {
        self.route(Method::PUT, path, handler)
    }

    /// Registers a plain PATCH route.
    #[must_use]
    pub fn patch<H: Handler>(self, path: &str, handler: H) -> Self {
        self.route(Method::PATCH, path, handler)
    }

    /// Registers a plain DELETE route.
    #[must_use]
    pub fn delete<H: Handler>(self, path: &str, handler: H) -> Self {
        self.route(Method::DELETE, path, handler)
    }

    /// Registers a plain HEAD route.
    #[must_use]
    pub fn head<H: Handler>(self, path: &str, handler: H) -> Self {
        self.route(Method::HEAD, path, handler)
    }

    /// Registers a plain OPTIONS route.
    #[must_use]
    pub fn options<H: Handler>(self, path: &str, handler: H) -> Self {
        self.route(Method::OPTIONS, path, handler)
    }

    /// Registers a plain route for every method in [`ANY_METHODS`].
    #[must_use]
    pub fn any<H: Handler>(mut self, path: &str, handler: H) -> Self {
        self.push_plain(ANY_METHODS.to_vec(), path, Vec::new(), Arc::new(handler));
        self
    }

    /// Registers a plain route.
    #[must_use]
    pub fn route<H: Handler>(mut self, method: Method, path: &str, handler: H) -> Self {
        self.push_plain(vec![method], path, Vec::new(), Arc::new(handler));
        self
    }

    /// Registers a GET route bound to a contract.
    #[must_use]
    pub fn get_with<C: IntoContract, H: Handler>(
        self,
        path: &str,
        contract: C,
        handler: H,
    ) -> Self {
        self.route_with(Method::GET, path, contract, handler)
    }

    /// Registers a POST route bound to a contract.
    #[must_use]
    pub fn post_with<C: IntoContract, H: Handler>(
        self,
        path: &str,
        contract: C,
        handler: H,
    ) -> Self {
        self.route_with(Method::POST, path, contract, handler)
    }

    /// Registers a PUT route bound to a contract.
    #[must_use]
    pub fn put_with<C: IntoContract, H: Handler>(
        self,
        path: &str,
        contract: C,
        handler: H,
    ) -> Self {
        self.route_with(Method::PUT, path, contract, handler)
    }

    /// Registers a PATCH route bound to a contract.
    #[must_use]
    pub fn patch_with<C: IntoContract, H: Handler>(
        self,
        path: &str,
        contract: C,
        handler: H,
    ) -> Self {
        self.route_with(Method::PATCH, path, contract, handler)
    }

    /// Registers a DELETE route bound to a contract.
    #[must_use]
    pub fn delete_with<C: IntoContract, H: Handler>(
        self,
        path: &str,
        contract: C,
        handler: H,
    ) -> Self {
        self.route_with(Method::DELETE, path, contract, handler)
    }

    /// Registers a HEAD route bound to a contract.
    #[must_use]
    pub fn head_with<C: IntoContract, H: Handler>(
        self,
        path: &str,
        contract: C,
        handler: H,
    ) -> Self {
        self.route_with(Method::HEAD, path, contract, handler)
    }

    /// Registers an OPTIONS route bound to a contract.
    #[must_use]
    pub fn options_with<C: IntoContract, H: Handler>(
        self,
        path: &str,
        contract: C,
        handler: H,
    ) -> Self {
        self.route_with(Method::OPTIONS, path, contract, handler)
    }

    /// Registers a contract-bound route for every method in
    /// [`ANY_METHODS`]. Each method gets its own pipeline and its own
    /// documented operation.
    #[must_use]
    pub fn any_with<C: IntoContract, H: Handler>(
        mut self,
        path: &str,
        contract: C,
        handler: H,
    ) -> Self {
        self.push_contract(
            ANY_METHODS.to_vec(),
            path,
            contract.into_contract(),
            Vec::new(),
            Arc::new(handler),
        );
        self
    }

    /// Registers a route bound to a contract.
    #[must_use]
    pub fn route_with<C: IntoContract, H: Handler>(
        self,
        method: Method,
        path: &str,
        contract: C,
        handler: H,
    ) -> Self {
        self.route_layered(method, path, contract, Vec::new(), handler)
    }

    /// Registers a route bound to a contract with extra middleware.
    ///
    /// `layers` run after the response guard, in order, so the guard checks
    /// whatever reply they produce. They are kept even when the contract is
    /// malformed.
    #[must_use]
    pub fn route_layered<C: IntoContract, H: Handler>(
        mut self,
        method: Method,
        path: &str,
        contract: C,
        layers: Vec<BoxedMiddleware>,
        handler: H,
    ) -> Self {
        self.push_contract(
            vec![method],
            path,
            contract.into_contract(),
            layers,
            Arc::new(handler),
        );
        self
    }

    fn push_plain(
        &mut self,
        methods: Vec<Method>,
        path: &str,
        layers: Vec<BoxedMiddleware>,
        handler: BoxedHandler,
    ) {
        self.registrations.push(Registration {
            methods,
            path: path.to_string(),
            contract: None,
            layers,
            handler,
        });
    }

    fn push_contract(
        &mut self,
        methods: Vec<Method>,
        path: &str,
        contract: Result<Contract, ContractError>,
        layers: Vec<BoxedMiddleware>,
        handler: BoxedHandler,
    ) {
        match contract {
            Ok(contract) => self.registrations.push(Registration {
                methods,
                path: path.to_string(),
                contract: Some(Arc::new(contract)),
                layers,
                handler,
            }),
            Err(error) => {
                let route = MalformedRoute {
                    methods: methods.clone(),
                    path: path.to_string(),
                    error,
                };
                tracing::warn!(
                    route = %route,
                    "invalid or missing contract; route registered without validation"
                );
                self.malformed.push(route);
                self.push_plain(methods, path, layers, handler);
            }
        }
    }

    /// Builds the application.
    ///
    /// Contract-bound routes are compiled into pipelines and recorded in the
    /// documentation registry. When the same method and path are registered
    /// twice the first registration is kept.
    pub fn build(self) -> RouterResult<App> {
        if self.strict && !self.malformed.is_empty() {
            return Err(RouterError::MalformedContracts(self.malformed));
        }

        let mut routes = Router::new();
        for registration in &self.registrations {
            for method in &registration.methods {
                let endpoint = match &registration.contract {
                    Some(contract) => Endpoint {
                        pipeline: Arc::new(self.contract_pipeline(
                            method,
                            contract,
                            &registration.layers,
                        )),
                        handler: Arc::clone(&registration.handler),
                    },
                    None => Endpoint {
                        pipeline: Arc::new(layered_pipeline(&registration.layers)),
                        handler: Arc::clone(&registration.handler),
                    },
                };

                if !routes.insert(method, &registration.path, endpoint) {
                    tracing::warn!(
                        %method,
                        path = %registration.path,
                        "route already registered; keeping the first"
                    );
                    continue;
                }

                if let Some(contract) = &registration.contract {
                    let tags = route_tags(contract, &registration.path);
                    self.registry.register_path(
                        registration.path.clone(),
                        method.clone(),
                        Arc::clone(contract),
                        tags,
                    );
                    tracing::info!(%method, path = %registration.path, "registered contract route");
                } else {
                    tracing::debug!(%method, path = %registration.path, "registered plain route");
                }
            }
        }

        if let Some(mount) = &self.docs {
            self.mount_docs(&mut routes, mount);
        }

        tracing::info!(routes = routes.len(), "router built");
        Ok(App::new(routes, self.registry))
    }

    fn contract_pipeline(
        &self,
        method: &Method,
        contract: &Contract,
        layers: &[BoxedMiddleware],
    ) -> Pipeline {
        let mut builder = Pipeline::builder();
        if let Some(schema) = contract.params() {
            builder = builder.stage(
                Stage::Params,
                validate_params(Arc::clone(schema)).with_config(self.config.clone()),
            );
        }
        if let Some(schema) = contract.query() {
            builder = builder.stage(
                Stage::Query,
                validate_query(Arc::clone(schema)).with_config(self.config.clone()),
            );
        }
        if let Some(schema) = contract.headers() {
            builder = builder.stage(
                Stage::Headers,
                validate_headers(Arc::clone(schema)).with_config(self.config.clone()),
            );
        }
        if let Some(schema) = contract.request() {
            if carries_body(method) {
                builder = builder.stage(
                    Stage::Body,
                    validate_body(Arc::clone(schema)).with_config(self.config.clone()),
                );
            }
        }
        builder = builder.stage(
            Stage::ResponseGuard,
            validate_response(contract).with_config(self.config.clone()),
        );
        for layer in layers {
            builder = builder.boxed_stage(Stage::Custom, Arc::clone(layer));
        }
        builder.build()
    }

    fn mount_docs(&self, routes: &mut Router<Endpoint>, mount: &DocsMount) {
        let mut generator = OpenApiGenerator::new();
        if let Some(title) = &mount.title {
            generator = generator.title(title.clone());
        }
        if let Some(version) = &mount.version {
            generator = generator.version(version.clone());
        }

        let registry = Arc::clone(&self.registry);
        let document = move |_request: ApiRequest| {
            let reply = match registry.generate_with(&generator) {
                Ok(document) => match serde_json::to_value(&document) {
                    Ok(value) => Reply::json(value),
                    Err(err) => document_failure(&err),
                },
                Err(err) => document_failure(&err),
            };
            std::future::ready(reply)
        };

        let html = SwaggerUi::for_mount(mount).html();
        let page = move |_request: ApiRequest| std::future::ready(Reply::html(html.clone()));

        for (path, handler) in [
            (&mount.json_path, Arc::new(document) as BoxedHandler),
            (&mount.ui_path, Arc::new(page) as BoxedHandler),
        ] {
            let endpoint = Endpoint {
                pipeline: Arc::new(Pipeline::empty()),
                handler,
            };
            if routes.insert(&Method::GET, path, endpoint) {
                tracing::info!(path = %path, "serving API documentation");
            } else {
                tracing::warn!(path = %path, "documentation path already routed");
            }
        }
    }
}

impl std::fmt::Debug for TypedRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedRouter")
            .field("registrations", &self.registrations.len())
            .field("strict", &self.strict)
            .field("malformed", &self.malformed)
            .field("docs", &self.docs)
            .finish_non_exhaustive()
    }
}

fn layered_pipeline(layers: &[BoxedMiddleware]) -> Pipeline {
    layers
        .iter()
        .fold(Pipeline::builder(), |builder, layer| {
            builder.boxed_stage(Stage::Custom, Arc::clone(layer))
        })
        .build()
}

fn document_failure(err: &dyn std::error::Error) -> Reply {
    tracing::error!(error = %err, "failed to generate OpenAPI document");
    Reply::json(json!({
        "error": "Internal server error",
        "detail": "failed to generate API documentation",
    }))
    .with_status(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Whether requests with `method` conventionally carry a body.
#[must_use]
pub fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

fn route_tags(contract: &Contract, path: &str) -> Vec<String> {
    if contract.tags().is_empty() {
        vec![default_tag(path)]
    } else {
        contract.tags().to_vec()
    }
}

/// Tag derived from a path: its first segment, capitalized.
///
/// ```rust
/// use accord_core::default_tag;
///
/// assert_eq!(default_tag("/users/{id}"), "Users");
/// assert_eq!(default_tag("/"), "Default");
/// ```
#[must_use]
pub fn default_tag(path: &str) -> String {
    let Some(segment) = path.split('/').find(|s| !s.is_empty()) else {
        return DEFAULT_TAG.to_string();
    };
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => DEFAULT_TAG.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_contract::Schema;
    use accord_middleware::{BoxFuture, FnMiddleware, MiddlewareContext, Next};
    use serde_json::Value;

    fn isolated() -> TypedRouter {
        TypedRouter::with_registry(Arc::new(DocsRegistry::new()))
            .validation_config(ValidationConfig::default())
    }

    fn user_contract() -> accord_contract::ContractBuilder {
        Contract::builder()
            .params(Schema::object([("id", Schema::integer().coerce())]))
            .query(Schema::object([("verbose", Schema::boolean().coerce().optional())]))
            .headers(Schema::object([("x-api-key", Schema::string())]))
            .request(Schema::object([("name", Schema::string())]))
            .response(Schema::object([("id", Schema::integer()), ("name", Schema::string())]))
    }

    async fn echo_user(request: ApiRequest) -> Value {
        json!({"id": request.param("id").cloned(), "name": request.body()["name"].clone()})
    }

    async fn ok(_request: ApiRequest) -> Value {
        json!({"ok": true})
    }

    #[test]
    fn test_default_tag() {
        assert_eq!(default_tag("/users"), "Users");
        assert_eq!(default_tag("/orders/{id}/items"), "Orders");
        assert_eq!(default_tag("/"), "Default");
        assert_eq!(default_tag(""), "Default");
    }

    #[test]
    fn test_carries_body() {
        assert!(carries_body(&Method::POST));
        assert!(carries_body(&Method::PATCH));
        assert!(!carries_body(&Method::GET));
        assert!(!carries_body(&Method::DELETE));
    }

    #[test]
    fn test_stage_order() {
        let app = isolated()
            .put_with("/users/{id}", user_contract(), echo_user)
            .build()
            .unwrap();
        let pipeline = app.pipeline(&Method::PUT, "/users/1").unwrap();
        assert_eq!(
            pipeline.stages(),
            vec![
                Stage::Params,
                Stage::Query,
                Stage::Headers,
                Stage::Body,
                Stage::ResponseGuard
            ]
        );
    }

    #[test]
    fn test_bodyless_method_skips_body_stage() {
        let app = isolated()
            .get_with("/users/{id}", user_contract(), echo_user)
            .build()
            .unwrap();
        let stages = app.pipeline(&Method::GET, "/users/1").unwrap().stages();
        assert!(!stages.contains(&Stage::Body));
        assert_eq!(stages.last(), Some(&Stage::ResponseGuard));
    }

    #[test]
    fn test_response_only_contract_has_guard_only() {
        let app = isolated()
            .get_with("/health", Contract::builder().response(Schema::any()), ok)
            .build()
            .unwrap();
        assert_eq!(
            app.pipeline(&Method::GET, "/health").unwrap().stages(),
            vec![Stage::ResponseGuard]
        );
    }

    #[tokio::test]
    async fn test_coerced_params_reach_handler() {
        let app = isolated()
            .put_with("/users/{id}", user_contract(), echo_user)
            .build()
            .unwrap();
        let request = ApiRequest::new(Method::PUT, "/users/42".parse().unwrap())
            .with_header("x-api-key", "k")
            .with_json(json!({"name": "Ada"}));
        let reply = app.handle(request).await;
        assert_eq!(reply.status(), StatusCode::OK);
        assert_eq!(reply.json_body(), Some(&json!({"id": 42, "name": "Ada"})));
    }

    #[tokio::test]
    async fn test_invalid_params_rejected_before_body() {
        let app = isolated()
            .put_with("/users/{id}", user_contract(), echo_user)
            .build()
            .unwrap();
        let request = ApiRequest::new(Method::PUT, "/users/abc".parse().unwrap())
            .with_raw_body("{broken");
        let reply = app.handle(request).await;
        assert_eq!(reply.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(reply.json_body().unwrap()["type"], "params");
    }

    #[tokio::test]
    async fn test_contract_routes_are_documented_with_default_tag() {
        let registry = Arc::new(DocsRegistry::new());
        let app = TypedRouter::with_registry(Arc::clone(&registry))
            .put_with("/users/{id}", user_contract(), echo_user)
            .get("/plain", ok)
            .build()
            .unwrap();

        let definitions = app.registry().definitions();
        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].method, Method::PUT);
        assert_eq!(definitions[0].path, "/users/{id}");
        assert_eq!(definitions[0].tags, vec!["Users"]);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_explicit_tags_win() {
        let app = isolated()
            .get_with(
                "/users",
                Contract::builder().response(Schema::any()).tag("Accounts"),
                ok,
            )
            .build()
            .unwrap();
        assert_eq!(app.registry().definitions()[0].tags, vec!["Accounts"]);
    }

    #[tokio::test]
    async fn test_malformed_contract_degrades_to_plain_route() {
        let app = isolated()
            .post_with(
                "/users",
                Contract::builder().request(Schema::object([("name", Schema::string())])),
                echo_user,
            )
            .build()
            .unwrap();

        assert!(app.registry().is_empty());
        assert!(app.pipeline(&Method::POST, "/users").unwrap().is_empty());

        // no body validation: the handler sees whatever was sent
        let request =
            ApiRequest::new(Method::POST, "/users".parse().unwrap()).with_json(json!({"name": 1}));
        let reply = app.handle(request).await;
        assert_eq!(reply.status(), StatusCode::OK);
        assert_eq!(reply.json_body().unwrap()["name"], 1);
    }

    #[test]
    fn test_strict_mode_rejects_malformed_contracts() {
        let err = isolated()
            .strict(true)
            .get_with("/a", Contract::builder(), ok)
            .post_with(
                "/b",
                Contract::builder()
                    .request(Schema::string().min_length(5).max_length(1))
                    .response(Schema::any()),
                ok,
            )
            .get_with("/c", Contract::builder().response(Schema::any()), ok)
            .build()
            .unwrap_err();

        let routes = err.malformed_routes();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].path, "/a");
        assert_eq!(routes[0].error, ContractError::MissingResponse);
        assert_eq!(routes[1].methods, vec![Method::POST]);
        assert!(matches!(
            routes[1].error,
            ContractError::InvalidSchema { ref field, .. } if field == "request"
        ));
    }

    #[tokio::test]
    async fn test_any_with_registers_every_method() {
        let app = isolated()
            .any_with("/ping", Contract::builder().response(Schema::any()), ok)
            .build()
            .unwrap();

        assert_eq!(app.route_count(), ANY_METHODS.len());
        assert_eq!(app.registry().len(), ANY_METHODS.len());
        for method in &ANY_METHODS {
            assert!(app.pipeline(method, "/ping").is_some(), "{method}");
        }
        let reply = app
            .handle(ApiRequest::new(Method::DELETE, "/ping".parse().unwrap()))
            .await;
        assert_eq!(reply.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_duplicate_registration_keeps_first() {
        async fn second(_request: ApiRequest) -> Value {
            json!({"ok": false})
        }
        let app = isolated()
            .get_with("/dup", Contract::builder().response(Schema::any()).tag("First"), ok)
            .get_with("/dup", Contract::builder().response(Schema::any()).tag("Second"), second)
            .build()
            .unwrap();

        let reply = app
            .handle(ApiRequest::new(Method::GET, "/dup".parse().unwrap()))
            .await;
        assert_eq!(reply.json_body(), Some(&json!({"ok": true})));
        let definitions = app.registry().definitions();
        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].tags, vec!["First"]);
    }

    fn stamp<'a>(
        ctx: &'a mut MiddlewareContext,
        request: ApiRequest,
        next: Next<'a>,
    ) -> BoxFuture<'a, Reply> {
        Box::pin(async move {
            let mut reply = next.run(ctx, request).await;
            if let Some(Value::Object(mut body)) = reply.json_body().cloned() {
                body.insert("stamped".to_string(), Value::Bool(true));
                reply.set_json_body(Value::Object(body));
            }
            reply
        })
    }

    #[tokio::test]
    async fn test_layers_run_inside_response_guard() {
        let app = isolated()
            .route_layered(
                Method::GET,
                "/layered",
                Contract::builder().response(Schema::object([("ok", Schema::boolean())])),
                vec![Arc::new(FnMiddleware::new("stamp", stamp)) as BoxedMiddleware],
                ok,
            )
            .build()
            .unwrap();

        assert_eq!(
            app.pipeline(&Method::GET, "/layered").unwrap().stage_names(),
            vec!["response-guard", "stamp"]
        );
        let reply = app
            .handle(ApiRequest::new(Method::GET, "/layered".parse().unwrap()))
            .await;
        // unknown keys are stripped by the guard
        assert_eq!(reply.json_body(), Some(&json!({"ok": true})));
    }

    #[tokio::test]
    async fn test_not_found_and_method_not_allowed() {
        let app = isolated().get("/users", ok).post("/users", ok).build().unwrap();

        let reply = app
            .handle(ApiRequest::new(Method::GET, "/missing".parse().unwrap()))
            .await;
        assert_eq!(reply.status(), StatusCode::NOT_FOUND);
        assert_eq!(reply.json_body().unwrap()["path"], "/missing");

        let reply = app
            .handle(ApiRequest::new(Method::DELETE, "/users".parse().unwrap()))
            .await;
        assert_eq!(reply.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(reply.headers()[http::header::ALLOW], "GET, POST");
    }

    #[tokio::test]
    async fn test_docs_endpoints() {
        let app = isolated()
            .get_with("/users", Contract::builder().response(Schema::any()), ok)
            .docs(DocsMount::titled("Users API"))
            .build()
            .unwrap();

        let reply = app
            .handle(ApiRequest::new(Method::GET, "/docs/openapi.json".parse().unwrap()))
            .await;
        assert_eq!(reply.status(), StatusCode::OK);
        let document = reply.json_body().unwrap();
        assert_eq!(document["openapi"], "3.1.0");
        assert_eq!(document["info"]["title"], "Users API");
        assert!(document["paths"]["/users"]["get"].is_object());
        assert!(document["paths"].get("/docs").is_none());

        let reply = app
            .handle(ApiRequest::new(Method::GET, "/docs".parse().unwrap()))
            .await;
        let response = reply.into_http();
        assert_eq!(
            response.headers()[http::header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn test_request_id_is_attached() {
        async fn read_id(request: ApiRequest) -> Value {
            json!({"has_id": request.extensions().get::<accord_middleware::RequestId>().is_some()})
        }
        let app = isolated().get("/id", read_id).build().unwrap();
        let reply = app
            .handle(ApiRequest::new(Method::GET, "/id".parse().unwrap()))
            .await;
        assert_eq!(reply.json_body(), Some(&json!({"has_id": true})));
    }
}
