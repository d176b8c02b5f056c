//! Request dispatch.

use std::sync::Arc;

use accord_docs::DocsRegistry;
use accord_middleware::{ApiRequest, MiddlewareContext, Pipeline, Reply, RequestId, Response};
use accord_router::{Match, Params, Router};
use bytes::Bytes;
use http::header::{HeaderValue, ALLOW};
use http::{Method, StatusCode};
use serde_json::{json, Map, Value};

use crate::handler::BoxedHandler;

/// A registered route: its validation pipeline and handler.
#[derive(Clone)]
pub(crate) struct Endpoint {
    pub(crate) pipeline: Arc<Pipeline>,
    pub(crate) handler: BoxedHandler,
}

impl Endpoint {
    async fn dispatch(&self, ctx: MiddlewareContext, request: ApiRequest) -> Reply {
        let handler = Arc::clone(&self.handler);
        self.pipeline
            .process(ctx, request, move |_ctx, request| handler.handle(request))
            .await
    }
}

/// A built application, ready to serve requests.
///
/// Cloning is cheap; clones share the same routes.
#[derive(Clone)]
pub struct App {
    inner: Arc<AppInner>,
}

struct AppInner {
    routes: Router<Endpoint>,
    registry: Arc<DocsRegistry>,
}

impl App {
    pub(crate) fn new(routes: Router<Endpoint>, registry: Arc<DocsRegistry>) -> Self {
        Self {
            inner: Arc::new(AppInner { routes, registry }),
        }
    }

    /// Routes a request through its pipeline and handler.
    ///
    /// Unknown paths get `404 Not Found`; known paths requested with an
    /// unregistered method get `405 Method Not Allowed` with an `Allow`
    /// header. A [`RequestId`] extension is added when the request has none.
    pub async fn handle(&self, mut request: ApiRequest) -> Reply {
        let request_id = match request.extensions().get::<RequestId>() {
            Some(id) => *id,
            None => {
                let id = RequestId::new();
                request.extensions_mut().insert(id);
                id
            }
        };
        let method = request.method().clone();
        let path = request.path().to_string();

        match self.inner.routes.at(&method, &path) {
            Match::Found { value, params } => {
                request.set_params(params_object(&params));
                let ctx = MiddlewareContext::with_request_id(request_id);
                let reply = value.dispatch(ctx, request).await;
                tracing::debug!(
                    request_id = %request_id,
                    %method,
                    path = %path,
                    status = reply.status().as_u16(),
                    "request handled"
                );
                reply
            }
            Match::MethodNotAllowed { allowed } => {
                tracing::debug!(request_id = %request_id, %method, path = %path, "method not allowed");
                method_not_allowed(&allowed)
            }
            Match::NotFound => {
                tracing::debug!(request_id = %request_id, %method, path = %path, "no route");
                Reply::json(json!({"error": "Not found", "path": path}))
                    .with_status(StatusCode::NOT_FOUND)
            }
        }
    }

    /// Handles an HTTP request with a collected body.
    pub async fn call(&self, request: http::Request<Bytes>) -> Response {
        self.handle(ApiRequest::from_http(request)).await.into_http()
    }

    /// The pipeline serving `method` on `path`, if routed.
    #[must_use]
    pub fn pipeline(&self, method: &Method, path: &str) -> Option<&Pipeline> {
        self.inner
            .routes
            .at(method, path)
            .value()
            .map(|endpoint| endpoint.pipeline.as_ref())
    }

    /// The registry this app documents its routes in.
    #[must_use]
    pub fn registry(&self) -> &Arc<DocsRegistry> {
        &self.inner.registry
    }

    /// Number of registered method/path pairs.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.inner.routes.len()
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("routes", &self.inner.routes.len())
            .finish_non_exhaustive()
    }
}

fn params_object(params: &Params) -> Value {
    Value::Object(
        params
            .iter()
            .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
            .collect::<Map<String, Value>>(),
    )
}

fn method_not_allowed(allowed: &[Method]) -> Reply {
    let allow = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let mut reply = Reply::json(json!({"error": "Method not allowed", "allowed": allow}))
        .with_status(StatusCode::METHOD_NOT_ALLOWED);
    if let Ok(value) = HeaderValue::from_str(&allow) {
        reply.headers_mut().insert(ALLOW, value);
    }
    reply
}
