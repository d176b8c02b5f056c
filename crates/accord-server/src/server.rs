//! HTTP server.
//!
//! Accepts TCP connections, speaks HTTP/1.1 through Hyper, collects request
//! bodies up to a size limit and hands each request to an [`App`].

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use accord_core::App;
use accord_middleware::Response;
use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Request, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use serde_json::json;
use tokio::net::{TcpListener, TcpStream};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Serves an [`App`] over HTTP.
///
/// ```rust,no_run
/// use std::sync::Arc;
///
/// use accord_core::TypedRouter;
/// use accord_docs::DocsRegistry;
/// use accord_middleware::ApiRequest;
/// use accord_server::{Server, ServerConfig};
/// use serde_json::json;
///
/// # async fn run() -> Result<(), accord_server::ServerError> {
/// let app = TypedRouter::with_registry(Arc::new(DocsRegistry::new()))
///     .get("/ping", |_request: ApiRequest| async { json!({"pong": true}) })
///     .build()
///     .expect("valid routes");
///
/// let config = ServerConfig::builder().http_addr("127.0.0.1:8080").build();
/// Server::new(config, app).run().await
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Server {
    config: Arc<ServerConfig>,
    app: App,
}

impl Server {
    /// Creates a server for `app`.
    #[must_use]
    pub fn new(config: ServerConfig, app: App) -> Self {
        Self {
            config: Arc::new(config),
            app,
        }
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the application being served.
    #[must_use]
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Runs until Ctrl-C or SIGTERM.
    pub async fn run(self) -> ServerResult<()> {
        let shutdown = ShutdownSignal::with_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Binds the configured address and runs until `shutdown` fires.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> ServerResult<()> {
        let addr = self
            .config
            .socket_addr()
            .map_err(|source| ServerError::InvalidAddress {
                addr: self.config.http_addr().to_string(),
                source,
            })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.to_string(),
                source,
            })?;

        self.serve(listener, shutdown).await
    }

    /// Serves connections from an already bound listener.
    ///
    /// After `shutdown` fires, no new connections are accepted and open ones
    /// are asked to finish, for at most the configured shutdown timeout.
    pub async fn serve(self, listener: TcpListener, shutdown: ShutdownSignal) -> ServerResult<()> {
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, routes = self.app.route_count(), "server listening");

        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            let server = self.clone();
                            let token = tracker.acquire();
                            let shutdown = shutdown.clone();

                            tokio::spawn(async move {
                                if let Err(err) = server.handle_connection(stream, remote_addr, shutdown).await {
                                    tracing::debug!(remote = %remote_addr, error = %err, "connection error");
                                }
                                drop(token);
                            });
                        }
                        Err(err) => {
                            tracing::error!(error = %err, "failed to accept connection");
                        }
                    }
                }

                () = shutdown.recv() => {
                    tracing::info!("shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        let shutdown_timeout = self.config.shutdown_timeout();
        tracing::info!(
            active = tracker.active_connections(),
            timeout_ms = u64::try_from(shutdown_timeout.as_millis()).unwrap_or(u64::MAX),
            "waiting for connections to close"
        );

        tokio::select! {
            () = tracker.wait_for_idle() => {
                tracing::info!("all connections closed");
            }
            () = tokio::time::sleep(shutdown_timeout) => {
                tracing::warn!(
                    active = tracker.active_connections(),
                    "shutdown timeout reached with connections still open"
                );
            }
        }

        tracing::info!("server stopped");
        Ok(())
    }

    async fn handle_connection(
        self,
        stream: TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = self.clone();

        let service = service_fn(move |request: Request<Incoming>| {
            let server = server.clone();
            async move { Ok::<_, Infallible>(server.handle_request(request).await) }
        });

        let mut builder = http1::Builder::new();
        builder.keep_alive(self.config.keep_alive());
        let connection = builder.serve_connection(io, service);
        tokio::pin!(connection);

        tokio::select! {
            result = connection.as_mut() => result,
            () = shutdown.recv() => {
                tracing::debug!(remote = %remote_addr, "finishing connection for shutdown");
                connection.as_mut().graceful_shutdown();
                connection.await
            }
        }
    }

    async fn handle_request(&self, request: Request<Incoming>) -> Response {
        let (parts, body) = request.into_parts();
        let timeout = self.config.request_timeout();
        let limited = Limited::new(body, self.config.max_body_size());

        let bytes = match tokio::time::timeout(timeout, limited.collect()).await {
            Ok(Ok(collected)) => collected.to_bytes(),
            Ok(Err(err)) if err.downcast_ref::<LengthLimitError>().is_some() => {
                tracing::debug!(
                    method = %parts.method,
                    path = parts.uri.path(),
                    limit = self.config.max_body_size(),
                    "request body too large"
                );
                return error_response(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "Request body too large",
                );
            }
            Ok(Err(err)) => {
                tracing::debug!(error = %err, "failed to read request body");
                return error_response(StatusCode::BAD_REQUEST, "Failed to read request body");
            }
            Err(_) => {
                tracing::warn!(method = %parts.method, path = parts.uri.path(), "request body timed out");
                return error_response(StatusCode::REQUEST_TIMEOUT, "Request body timed out");
            }
        };

        let method = parts.method.clone();
        let path = parts.uri.path().to_string();
        let request = Request::from_parts(parts, bytes);

        match tokio::time::timeout(timeout, self.app.call(request)).await {
            Ok(response) => response,
            Err(_) => {
                tracing::warn!(%method, path = %path, "handler timed out");
                error_response(StatusCode::GATEWAY_TIMEOUT, "Handler timed out")
            }
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    let body = json!({"error": message}).to_string();
    let mut response = http::Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_core::TypedRouter;
    use accord_docs::DocsRegistry;
    use accord_middleware::ApiRequest;

    fn app() -> App {
        TypedRouter::with_registry(Arc::new(DocsRegistry::new()))
            .get("/ping", |_request: ApiRequest| async { json!({"pong": true}) })
            .build()
            .unwrap()
    }

    #[test]
    fn test_server_new() {
        let config = ServerConfig::builder().http_addr("127.0.0.1:0").build();
        let server = Server::new(config, app());
        assert_eq!(server.config().http_addr(), "127.0.0.1:0");
        assert_eq!(server.app().route_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_address() {
        let config = ServerConfig::builder().http_addr("not-an-address").build();
        let result = Server::new(config, app())
            .run_with_shutdown(ShutdownSignal::new())
            .await;
        assert!(matches!(result, Err(ServerError::InvalidAddress { .. })));
    }

    #[test]
    fn test_error_response() {
        let response = error_response(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
