//! Response guard.
//!
//! The guard is the last stage before the handler. It lets the handler run,
//! then checks the JSON reply against the schema declared for the reply's
//! status:
//!
//! 1. If an earlier stage already failed, the reply is an error body and is
//!    passed through untouched.
//! 2. If response validation is switched off, the reply passes through.
//! 3. The schema is resolved. A status-keyed declaration is looked up by
//!    status; undeclared statuses pass through. A single schema applies to
//!    every status except those in the configured skip set.
//! 4. A conforming payload is replaced by its validated form. A violating
//!    payload is logged with a diagnostic and replaced by a 500 error.

use std::collections::BTreeMap;

use accord_contract::{Contract, Schema, SharedSchema, Validate};
use http::StatusCode;

use crate::config::ConfigSource;
use crate::context::MiddlewareContext;
use crate::diagnostic::response_diagnostic;
use crate::error::ValidationKind;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::stages::fields::rejection;
use crate::types::{ApiRequest, Reply};

/// Reply schemas, either one for all statuses or one per status.
#[derive(Debug, Clone)]
pub enum ResponseSchemas {
    /// Applies to every status outside the skip set.
    Single(SharedSchema),
    /// Applies to the listed statuses only.
    ByStatus(BTreeMap<u16, SharedSchema>),
}

impl ResponseSchemas {
    /// Derives the reply schemas declared by a contract.
    ///
    /// Without status-keyed responses the primary response covers every
    /// status; otherwise the primary response is bound to 200 and overlaid
    /// by the keyed ones.
    pub fn from_contract(contract: &Contract) -> Self {
        if contract.responses().is_empty() {
            Self::Single(SharedSchema::clone(contract.response()))
        } else {
            Self::ByStatus(contract.response_map())
        }
    }

    fn resolve(&self, status: StatusCode, skipped: impl Fn(StatusCode) -> bool) -> Option<&SharedSchema> {
        match self {
            Self::Single(_) if skipped(status) => None,
            Self::Single(schema) => Some(schema),
            Self::ByStatus(schemas) => schemas.get(&status.as_u16()),
        }
    }
}

impl From<SharedSchema> for ResponseSchemas {
    fn from(schema: SharedSchema) -> Self {
        Self::Single(schema)
    }
}

impl From<Schema> for ResponseSchemas {
    fn from(schema: Schema) -> Self {
        Self::Single(schema.into())
    }
}

impl From<BTreeMap<u16, SharedSchema>> for ResponseSchemas {
    fn from(schemas: BTreeMap<u16, SharedSchema>) -> Self {
        Self::ByStatus(schemas)
    }
}

impl From<&Contract> for ResponseSchemas {
    fn from(contract: &Contract) -> Self {
        Self::from_contract(contract)
    }
}

/// Checks handler replies against their declared schemas.
#[derive(Debug, Clone)]
pub struct ResponseGuard {
    schemas: ResponseSchemas,
    config: ConfigSource,
}

impl ResponseGuard {
    /// Creates a guard reading the process-wide configuration.
    pub fn new(schemas: impl Into<ResponseSchemas>) -> Self {
        Self {
            schemas: schemas.into(),
            config: ConfigSource::Global,
        }
    }

    /// Uses `config` instead of the process-wide configuration.
    #[must_use]
    pub fn with_config(mut self, config: ConfigSource) -> Self {
        self.config = config;
        self
    }

    /// The guarded schemas.
    pub fn schemas(&self) -> &ResponseSchemas {
        &self.schemas
    }
}

impl Middleware for ResponseGuard {
    fn name(&self) -> &'static str {
        "response-guard"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: ApiRequest,
        next: Next<'a>,
    ) -> BoxFuture<'a, Reply> {
        Box::pin(async move {
            let method = request.method().clone();
            let path = request.path().to_string();

            let mut reply = next.run(ctx, request).await;

            if ctx.validation_failed() {
                return reply;
            }

            let config = self.config.load();
            if !config.validate_responses() {
                return reply;
            }

            let status = reply.status();
            let Some(schema) = self.schemas.resolve(status, |s| config.is_skipped(s)) else {
                return reply;
            };
            let Some(payload) = reply.json_body() else {
                return reply;
            };

            match schema.safe_parse(payload) {
                Ok(value) => {
                    reply.set_json_body(value);
                    reply
                }
                Err(issues) => {
                    ctx.mark_validation_failed();
                    let diagnostic = response_diagnostic(&method, &path, payload, &issues);
                    tracing::warn!(
                        request_id = %ctx.request_id(),
                        method = %method,
                        path = %path,
                        status = status.as_u16(),
                        "{diagnostic}"
                    );
                    rejection(&config, ValidationKind::Response, &method, &path, &issues)
                }
            }
        })
    }
}

/// Guards replies against `schemas`.
pub fn validate_response(schemas: impl Into<ResponseSchemas>) -> ResponseGuard {
    ResponseGuard::new(schemas)
}
