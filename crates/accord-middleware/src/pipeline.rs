//! Per-route middleware pipeline.
//!
//! A [`Pipeline`] is assembled once, when a route is registered, and then
//! shared by every request to that route. Stages always run in [`Stage`]
//! order regardless of the order they were added in:
//!
//! 1. **Params** - path parameter validation
//! 2. **Query** - query string validation
//! 3. **Headers** - header validation
//! 4. **Body** - request body validation
//! 5. **Response guard** - checks the handler's reply on the way out
//! 6. **Custom** - route-specific middleware, in insertion order
//!
//! Cheap checks reject a request before the body is looked at, and the
//! response guard sits directly in front of the handler so it sees the
//! reply before any other stage does.

use std::fmt;
use std::sync::Arc;

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{ApiRequest, Reply};

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// Position of a stage in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Path parameter validation.
    Params,
    /// Query string validation.
    Query,
    /// Header validation.
    Headers,
    /// Request body validation.
    Body,
    /// Reply validation.
    ResponseGuard,
    /// Caller-supplied middleware.
    Custom,
}

/// An ordered, immutable list of stages.
#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Vec<(Stage, BoxedMiddleware)>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// A pipeline without stages; requests go straight to the handler.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Runs `request` through every stage and then `handler`.
    pub async fn process<H>(&self, mut ctx: MiddlewareContext, request: ApiRequest, handler: H) -> Reply
    where
        H: FnOnce(&mut MiddlewareContext, ApiRequest) -> BoxFuture<'static, Reply> + Send + 'static,
    {
        let next = self.build_chain(handler);
        next.run(&mut ctx, request).await
    }

    fn build_chain<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(&mut MiddlewareContext, ApiRequest) -> BoxFuture<'static, Reply> + Send + 'a,
    {
        let mut next = Next::handler(handler);
        for (_, middleware) in self.stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }
        next
    }

    /// Stage kinds in execution order.
    #[must_use]
    pub fn stages(&self) -> Vec<Stage> {
        self.stages.iter().map(|(stage, _)| *stage).collect()
    }

    /// Stage names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|(_, mw)| mw.name()).collect()
    }

    /// Number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// `true` when there are no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for constructing a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<(Stage, BoxedMiddleware)>,
}

impl PipelineBuilder {
    /// Adds a stage.
    #[must_use]
    pub fn stage<M: Middleware>(self, stage: Stage, middleware: M) -> Self {
        self.boxed_stage(stage, Arc::new(middleware))
    }

    /// Adds an already shared stage.
    #[must_use]
    pub fn boxed_stage(mut self, stage: Stage, middleware: BoxedMiddleware) -> Self {
        self.stages.push((stage, middleware));
        self
    }

    /// Adds a custom stage, run after the response guard.
    #[must_use]
    pub fn custom<M: Middleware>(self, middleware: M) -> Self {
        self.stage(Stage::Custom, middleware)
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(mut self) -> Pipeline {
        // stable: custom stages keep insertion order
        self.stages.sort_by_key(|(stage, _)| *stage);
        Pipeline {
            stages: self.stages,
        }
    }
}
