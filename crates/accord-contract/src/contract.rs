//! Route contracts.
//!
//! A [`Contract`] bundles the schemas a route is checked against together
//! with its documentation metadata. Contracts are immutable once built and
//! cheap to clone; schemas are reference counted.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ContractError;
use crate::schema::{SharedSchema, Validate};

/// A validated route contract.
///
/// Construct one with [`Contract::builder`]. Building fails when no
/// response schema is given or when any declared schema is malformed, so
/// a `Contract` value is always usable.
#[derive(Clone)]
pub struct Contract {
    request: Option<SharedSchema>,
    response: SharedSchema,
    responses: BTreeMap<u16, SharedSchema>,
    query: Option<SharedSchema>,
    params: Option<SharedSchema>,
    headers: Option<SharedSchema>,
    tags: Vec<String>,
    summary: Option<String>,
    description: Option<String>,
}

impl Contract {
    /// Starts a new contract.
    pub fn builder() -> ContractBuilder {
        ContractBuilder::default()
    }

    /// Request body schema.
    pub fn request(&self) -> Option<&SharedSchema> {
        self.request.as_ref()
    }

    /// Primary response schema, bound to status 200.
    pub fn response(&self) -> &SharedSchema {
        &self.response
    }

    /// Status-keyed response schemas.
    pub fn responses(&self) -> &BTreeMap<u16, SharedSchema> {
        &self.responses
    }

    /// Query string schema.
    pub fn query(&self) -> Option<&SharedSchema> {
        self.query.as_ref()
    }

    /// Path parameter schema.
    pub fn params(&self) -> Option<&SharedSchema> {
        self.params.as_ref()
    }

    /// Header schema.
    pub fn headers(&self) -> Option<&SharedSchema> {
        self.headers.as_ref()
    }

    /// Documentation tags.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Operation summary.
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Operation description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// All responses keyed by status: `response` at 200, overlaid by
    /// `responses`.
    pub fn response_map(&self) -> BTreeMap<u16, SharedSchema> {
        let mut map = BTreeMap::new();
        map.insert(200, Arc::clone(&self.response));
        for (status, schema) in &self.responses {
            map.insert(*status, Arc::clone(schema));
        }
        map
    }
}

impl fmt::Debug for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contract")
            .field("request", &self.request.is_some())
            .field("responses", &self.response_map().keys().collect::<Vec<_>>())
            .field("query", &self.query.is_some())
            .field("params", &self.params.is_some())
            .field("headers", &self.headers.is_some())
            .field("tags", &self.tags)
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Contract`].
#[derive(Default)]
pub struct ContractBuilder {
    request: Option<SharedSchema>,
    response: Option<SharedSchema>,
    responses: BTreeMap<u16, SharedSchema>,
    query: Option<SharedSchema>,
    params: Option<SharedSchema>,
    headers: Option<SharedSchema>,
    tags: Vec<String>,
    summary: Option<String>,
    description: Option<String>,
}

impl ContractBuilder {
    /// Sets the request body schema.
    pub fn request<S: Validate + 'static>(mut self, schema: S) -> Self {
        self.request = Some(Arc::new(schema));
        self
    }

    /// Sets the primary (status 200) response schema.
    pub fn response<S: Validate + 'static>(mut self, schema: S) -> Self {
        self.response = Some(Arc::new(schema));
        self
    }

    /// Declares the schema for one status code.
    pub fn responses<S: Validate + 'static>(mut self, status: u16, schema: S) -> Self {
        self.responses.insert(status, Arc::new(schema));
        self
    }

    /// Sets the query string schema.
    pub fn query<S: Validate + 'static>(mut self, schema: S) -> Self {
        self.query = Some(Arc::new(schema));
        self
    }

    /// Sets the path parameter schema.
    pub fn params<S: Validate + 'static>(mut self, schema: S) -> Self {
        self.params = Some(Arc::new(schema));
        self
    }

    /// Sets the header schema.
    pub fn headers<S: Validate + 'static>(mut self, schema: S) -> Self {
        self.headers = Some(Arc::new(schema));
        self
    }

    /// Adds a documentation tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Replaces the documentation tags.
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the operation summary.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the operation description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Validates the declaration and builds the contract.
    pub fn build(self) -> Result<Contract, ContractError> {
        let response = self.response.ok_or(ContractError::MissingResponse)?;
        check_schema("response", &response)?;

        let optional = [
            ("request", &self.request),
            ("query", &self.query),
            ("params", &self.params),
            ("headers", &self.headers),
        ];
        for (field, schema) in optional {
            if let Some(schema) = schema {
                check_schema(field, schema)?;
            }
        }

        for (status, schema) in &self.responses {
            if !(100..=599).contains(status) {
                return Err(ContractError::InvalidStatus(*status));
            }
            check_schema(&format!("responses.{status}"), schema)?;
        }

        Ok(Contract {
            request: self.request,
            response,
            responses: self.responses,
            query: self.query,
            params: self.params,
            headers: self.headers,
            tags: self.tags,
            summary: self.summary,
            description: self.description,
        })
    }
}

fn check_schema(field: &str, schema: &SharedSchema) -> Result<(), ContractError> {
    schema.check().map_err(|source| ContractError::InvalidSchema {
        field: field.to_string(),
        source,
    })
}

/// Conversion into a contract at route registration.
///
/// Lets registration calls accept a finished [`Contract`], an unfinished
/// [`ContractBuilder`] or the result of building one.
pub trait IntoContract {
    /// Performs the conversion, surfacing any construction error.
    fn into_contract(self) -> Result<Contract, ContractError>;
}

impl IntoContract for Contract {
    fn into_contract(self) -> Result<Contract, ContractError> {
        Ok(self)
    }
}

impl IntoContract for ContractBuilder {
    fn into_contract(self) -> Result<Contract, ContractError> {
        self.build()
    }
}

impl IntoContract for Result<Contract, ContractError> {
    fn into_contract(self) -> Result<Contract, ContractError> {
        self
    }
}
