//! # Accord Test
//!
//! In-memory HTTP testing for Accord applications. A [`TestClient`] wraps a
//! built [`accord_core::App`] and sends requests straight into it, so tests
//! exercise routing, every validation stage and the handler without binding
//! a port.
//!
//! ```rust,ignore
//! let client = TestClient::new(app);
//!
//! let response = client
//!     .post("/users")
//!     .json(&json!({"name": "Alice", "email": "alice@example.com"}))
//!     .send()
//!     .await;
//!
//! response.assert_status(StatusCode::CREATED);
//! ```

#![doc(html_root_url = "https://docs.rs/accord-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod response;

pub use client::{TestClient, TestRequest};
pub use error::TestError;
pub use response::TestResponse;
