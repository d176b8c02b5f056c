//! Path router for Accord.
//!
//! Routes are stored in a segment tree keyed by path template, with one
//! value per HTTP method at each leaf. A lookup distinguishes three
//! outcomes so the caller can answer 404 and 405 correctly.
//!
//! # Features
//!
//! - **Path Parameters**: `{name}` captures one segment (`/users/{id}`)
//! - **Wildcards**: `*name` captures the rest of the path (`/files/*path`)
//! - **Method Dispatch**: [`Match::MethodNotAllowed`] carries the allowed methods
//! - **Stable Registration**: the first value registered for a method and template wins
//!
//! # Example
//!
//! ```rust
//! use accord_router::{Match, Router};
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.insert(&Method::GET, "/orgs/{org}/users/{id}", "getOrgUser");
//!
//! let Match::Found { value, params } = router.at(&Method::GET, "/orgs/acme/users/7") else {
//!     unreachable!();
//! };
//! assert_eq!(*value, "getOrgUser");
//! assert_eq!(params.get("org"), Some("acme"));
//! ```
//!
//! # Architecture
//!
//! ```text
//!                    (root)
//!                      │
//!              ┌───────┴───────┐
//!              │               │
//!            "users"        "files"
//!              │               │
//!        ┌─────┴─────┐       "*path"
//!        │           │
//!       (leaf)    "{id}"
//!   [GET,POST]      │
//!                 (leaf)
//!              [GET,DELETE]
//! ```

#![doc(html_root_url = "https://docs.rs/accord-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod method_router;
mod node;
mod params;
mod router;

pub use method_router::MethodRouter;
pub use params::Params;
pub use router::{Match, Router};
