//! Request handlers.
//!
//! Any async function taking an [`ApiRequest`] and returning something that
//! implements [`IntoReply`] is a [`Handler`]:
//!
//! ```rust
//! use accord_core::Handler;
//! use accord_middleware::ApiRequest;
//! use serde_json::{json, Value};
//!
//! async fn health(_request: ApiRequest) -> Value {
//!     json!({"status": "ok"})
//! }
//!
//! fn assert_handler<H: Handler>(_: H) {}
//! assert_handler(health);
//! ```
//!
//! [`typed`] adapts a function working on serde types instead. Its input is
//! decoded from the request body after the body validator has run, so it
//! sees coerced and defaulted values.

use std::future::Future;
use std::sync::Arc;

use accord_middleware::{ApiRequest, BoxFuture, IntoReply, Json, Reply};
use http::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

/// Terminal step of a route.
pub trait Handler: Send + Sync + 'static {
    /// Handles one request.
    fn handle(&self, request: ApiRequest) -> BoxFuture<'static, Reply>;
}

impl<F, Fut, R> Handler for F
where
    F: Fn(ApiRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoReply,
{
    fn handle(&self, request: ApiRequest) -> BoxFuture<'static, Reply> {
        let fut = self(request);
        Box::pin(async move { fut.await.into_reply() })
    }
}

/// A shared, type-erased handler.
pub type BoxedHandler = Arc<dyn Handler>;

/// Adapts a handler working on typed input and output.
///
/// `Req` is decoded from the validated request body (`null` when the route
/// has no body, so `()` or `Option<T>` fit body-less routes). `Ok` values
/// are sent as `200 OK` JSON; `Err` values are converted with
/// [`IntoReply`].
///
/// A body that fails to decode into `Req` means the handler type and the
/// route's request schema disagree. That is a server bug, reported as
/// `500 Internal Server Error`.
///
/// # Example
///
/// ```rust
/// use accord_core::{typed, Handler};
/// use accord_middleware::ApiRequest;
/// use http::StatusCode;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Deserialize)]
/// struct CreateUser {
///     name: String,
/// }
///
/// #[derive(Serialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// async fn create_user(input: CreateUser, _request: ApiRequest) -> Result<User, StatusCode> {
///     Ok(User { id: 1, name: input.name })
/// }
///
/// fn assert_handler<H: Handler>(_: H) {}
/// assert_handler(typed(create_user));
/// ```
pub fn typed<Req, Res, E, F, Fut>(
    handler: F,
) -> impl Fn(ApiRequest) -> BoxFuture<'static, Reply> + Send + Sync + 'static
where
    Req: DeserializeOwned + Send + 'static,
    Res: Serialize + Send + 'static,
    E: IntoReply + Send + 'static,
    F: Fn(Req, ApiRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Res, E>> + Send + 'static,
{
    move |request: ApiRequest| -> BoxFuture<'static, Reply> {
        let input = match request.json::<Req>() {
            Ok(input) => input,
            Err(err) => {
                tracing::error!(
                    method = %request.method(),
                    path = request.path(),
                    error = %err,
                    "validated body does not decode into handler input"
                );
                return Box::pin(std::future::ready(input_mismatch()));
            }
        };
        let fut = handler(input, request);
        Box::pin(async move {
            match fut.await {
                Ok(output) => Json(output).into_reply(),
                Err(err) => err.into_reply(),
            }
        })
    }
}

fn input_mismatch() -> Reply {
    Reply::json(json!({
        "error": "Internal server error",
        "detail": "request body does not match handler input",
    }))
    .with_status(StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use serde::Deserialize;
    use serde_json::Value;

    #[derive(Debug, Deserialize)]
    struct Greet {
        name: String,
        #[serde(default)]
        times: u32,
    }

    #[derive(Debug, Serialize)]
    struct Greeting {
        message: String,
    }

    async fn greet(input: Greet, _request: ApiRequest) -> Result<Greeting, StatusCode> {
        if input.name.is_empty() {
            return Err(StatusCode::BAD_REQUEST);
        }
        Ok(Greeting {
            message: format!("hello {} x{}", input.name, input.times),
        })
    }

    fn post(body: Value) -> ApiRequest {
        ApiRequest::new(Method::POST, "/greet".parse().unwrap()).with_json(body)
    }

    #[tokio::test]
    async fn test_plain_function_handler() {
        async fn echo(request: ApiRequest) -> Value {
            request.body().clone()
        }

        let reply = echo.handle(post(json!({"a": 1}))).await;
        assert_eq!(reply.status(), StatusCode::OK);
        assert_eq!(reply.json_body(), Some(&json!({"a": 1})));
    }

    #[tokio::test]
    async fn test_closure_handler_with_status() {
        let handler = |_request: ApiRequest| async { (StatusCode::CREATED, json!({"id": 7})) };
        let reply = handler.handle(post(Value::Null)).await;
        assert_eq!(reply.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_typed_handler_ok() {
        let handler = typed(greet);
        let reply = handler.handle(post(json!({"name": "ada", "times": 2}))).await;
        assert_eq!(reply.status(), StatusCode::OK);
        assert_eq!(reply.json_body(), Some(&json!({"message": "hello ada x2"})));
    }

    #[tokio::test]
    async fn test_typed_handler_error_converts() {
        let reply = typed(greet).handle(post(json!({"name": ""}))).await;
        assert_eq!(reply.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_typed_handler_input_mismatch_is_500() {
        let reply = typed(greet).handle(post(json!({"name": 5}))).await;
        assert_eq!(reply.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            reply.json_body().unwrap()["detail"],
            "request body does not match handler input"
        );
    }

    #[tokio::test]
    async fn test_typed_unit_input_for_bodyless_route() {
        async fn list(_: (), _request: ApiRequest) -> Result<Vec<u32>, StatusCode> {
            Ok(vec![1, 2])
        }
        let request = ApiRequest::new(Method::GET, "/items".parse().unwrap());
        let reply = typed(list).handle(request).await;
        assert_eq!(reply.json_body(), Some(&json!([1, 2])));
    }
}
