//! Core middleware trait and chaining types.
//!
//! Every pipeline stage implements [`Middleware`]. A stage receives the
//! request context, the request and a [`Next`] handle. Calling
//! [`Next::run`] continues with the remaining stages and the handler;
//! returning without calling it short-circuits the chain with the stage's
//! own reply.
//!
//! # Example
//!
//! ```
//! use accord_middleware::{ApiRequest, BoxFuture, Middleware, MiddlewareContext, Next, Reply};
//!
//! struct Timing;
//!
//! impl Middleware for Timing {
//!     fn name(&self) -> &'static str {
//!         "timing"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a mut MiddlewareContext,
//!         request: ApiRequest,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, Reply> {
//!         Box::pin(async move {
//!             let reply = next.run(ctx, request).await;
//!             tracing::debug!(elapsed = ?ctx.elapsed(), "handled");
//!             reply
//!         })
//!     }
//! }
//! ```

use std::future::Future;
use std::pin::Pin;

use crate::context::MiddlewareContext;
use crate::types::{ApiRequest, Reply};

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A pipeline stage.
///
/// A stage must call `next.run()` at most once. Stages that produce their
/// own reply (validation failures) do not call it at all.
pub trait Middleware: Send + Sync + 'static {
    /// Stage name, used in logs.
    fn name(&self) -> &'static str;

    /// Processes the request.
    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: ApiRequest,
        next: Next<'a>,
    ) -> BoxFuture<'a, Reply>;
}

/// Handle to the rest of the chain.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    Handler(
        Box<dyn FnOnce(&mut MiddlewareContext, ApiRequest) -> BoxFuture<'static, Reply> + Send + 'a>,
    ),
}

impl<'a> Next<'a> {
    /// Continues with `middleware`, then `next`.
    pub fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Terminates the chain with a handler.
    pub fn handler<F>(f: F) -> Self
    where
        F: FnOnce(&mut MiddlewareContext, ApiRequest) -> BoxFuture<'static, Reply> + Send + 'a,
    {
        Self {
            inner: NextInner::Handler(Box::new(f)),
        }
    }

    /// Runs the rest of the chain. Consumes `self`, so it runs at most once.
    pub async fn run(self, ctx: &mut MiddlewareContext, request: ApiRequest) -> Reply {
        match self.inner {
            NextInner::Chain { middleware, next } => middleware.process(ctx, request, *next).await,
            NextInner::Handler(handler) => handler(ctx, request).await,
        }
    }
}

/// Middleware built from a function.
///
/// The function has the same shape as [`Middleware::process`], so it is
/// usually a named `fn` rather than a closure:
///
/// ```
/// use accord_middleware::{ApiRequest, BoxFuture, FnMiddleware, MiddlewareContext, Next, Reply};
///
/// fn audit<'a>(
///     ctx: &'a mut MiddlewareContext,
///     request: ApiRequest,
///     next: Next<'a>,
/// ) -> BoxFuture<'a, Reply> {
///     Box::pin(async move {
///         tracing::info!(request_id = %ctx.request_id(), path = request.path(), "audit");
///         next.run(ctx, request).await
///     })
/// }
///
/// let middleware = FnMiddleware::new("audit", audit);
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F> {
    /// Wraps `func` as a stage named `name`.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut MiddlewareContext, ApiRequest, Next<'a>) -> BoxFuture<'a, Reply>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: ApiRequest,
        next: Next<'a>,
    ) -> BoxFuture<'a, Reply> {
        (self.func)(ctx, request, next)
    }
}
