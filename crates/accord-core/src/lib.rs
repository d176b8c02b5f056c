//! # Accord Core
//!
//! Contract-aware routing for the Accord framework.
//!
//! [`TypedRouter`] registers routes. A route registered with a contract gets
//! a validation pipeline (params, query, headers, body, response guard) and
//! an entry in the documentation registry; a plain route is passed through
//! untouched. [`TypedRouter::build`] produces an [`App`] that dispatches
//! requests.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use accord_contract::{Contract, Schema};
//! use accord_core::{typed, TypedRouter};
//! use accord_docs::DocsRegistry;
//! use accord_middleware::ApiRequest;
//! use http::{Method, StatusCode};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! struct NewTodo {
//!     title: String,
//! }
//!
//! #[derive(Serialize)]
//! struct Todo {
//!     id: u64,
//!     title: String,
//! }
//!
//! async fn create(input: NewTodo, _request: ApiRequest) -> Result<Todo, StatusCode> {
//!     Ok(Todo { id: 1, title: input.title })
//! }
//!
//! # tokio_test::block_on(async {
//! let app = TypedRouter::with_registry(Arc::new(DocsRegistry::new()))
//!     .post_with(
//!         "/todos",
//!         Contract::builder()
//!             .request(Schema::object([("title", Schema::string().min_length(1))]))
//!             .response(Schema::object([
//!                 ("id", Schema::integer()),
//!                 ("title", Schema::string()),
//!             ])),
//!         typed(create),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let request = ApiRequest::new(Method::POST, "/todos".parse().unwrap())
//!     .with_json(serde_json::json!({"title": ""}));
//! let reply = app.handle(request).await;
//! assert_eq!(reply.status(), StatusCode::UNPROCESSABLE_ENTITY);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/accord-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod error;
mod handler;
mod router;

pub use app::App;
pub use error::{MalformedRoute, RouterError, RouterResult};
pub use handler::{typed, BoxedHandler, Handler};
pub use router::{carries_body, default_tag, TypedRouter, ANY_METHODS, DEFAULT_TAG};
