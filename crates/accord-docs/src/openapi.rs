//! OpenAPI document types and generation.
//!
//! [`OpenApiGenerator`] compiles the routes collected by the
//! [`DocsRegistry`](crate::DocsRegistry) into an OpenAPI 3.1 document.
//! Schemas are embedded as the JSON Schema rendered by each contract
//! schema, so the document needs no separate components section.
//!
//! ## OpenAPI 3.1 Compliance
//!
//! The types in this module follow the OpenAPI 3.1 specification:
//! <https://spec.openapis.org/oas/v3.1.0>

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use accord_contract::Validate;
use http::Method;
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DocsError, DocsResult};
use crate::registry::RouteDefinition;

/// Default document title.
pub const DEFAULT_TITLE: &str = "My API";

/// Default document version.
pub const DEFAULT_VERSION: &str = "1.0.0";

const JSON: &str = "application/json";

/// OpenAPI document root object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApi {
    /// OpenAPI version ("3.1.0").
    pub openapi: String,
    /// API metadata.
    pub info: Info,
    /// Available servers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    /// API paths and operations.
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    /// Tags for API grouping.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl OpenApi {
    /// The operation documented for `method` on `path`.
    #[must_use]
    pub fn operation(&self, path: &str, method: &Method) -> Option<&Operation> {
        self.paths.get(path)?.operation(method)
    }

    /// Serializes the document as pretty-printed JSON.
    pub fn to_json(&self) -> DocsResult<String> {
        serde_json::to_string_pretty(self).map_err(DocsError::from)
    }

    /// Writes the document to `path` as pretty-printed JSON.
    pub fn write_to(&self, path: impl AsRef<Path>) -> DocsResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// API metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
    /// API description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Server information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    /// Server URL.
    pub url: String,
    /// Server description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A path item containing operations for a single path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// PUT operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// POST operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// DELETE operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// OPTIONS operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// HEAD operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    /// PATCH operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// TRACE operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
}

impl PathItem {
    /// The operation for `method`.
    #[must_use]
    pub fn operation(&self, method: &Method) -> Option<&Operation> {
        match *method {
            Method::GET => self.get.as_ref(),
            Method::PUT => self.put.as_ref(),
            Method::POST => self.post.as_ref(),
            Method::DELETE => self.delete.as_ref(),
            Method::OPTIONS => self.options.as_ref(),
            Method::HEAD => self.head.as_ref(),
            Method::PATCH => self.patch.as_ref(),
            Method::TRACE => self.trace.as_ref(),
            _ => None,
        }
    }

    fn slot_mut(&mut self, method: &Method) -> Option<&mut Option<Operation>> {
        match *method {
            Method::GET => Some(&mut self.get),
            Method::PUT => Some(&mut self.put),
            Method::POST => Some(&mut self.post),
            Method::DELETE => Some(&mut self.delete),
            Method::OPTIONS => Some(&mut self.options),
            Method::HEAD => Some(&mut self.head),
            Method::PATCH => Some(&mut self.patch),
            Method::TRACE => Some(&mut self.trace),
            _ => None,
        }
    }
}

/// An API operation (endpoint).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Short summary.
    pub summary: String,
    /// Full description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Tags for grouping.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "requestBody")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code.
    pub responses: IndexMap<String, Response>,
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterIn {
    /// Query string parameter.
    Query,
    /// URL path parameter.
    Path,
    /// HTTP header.
    Header,
}

/// An operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Parameter location.
    #[serde(rename = "in")]
    pub location: ParameterIn,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether required.
    #[serde(default)]
    pub required: bool,
    /// Parameter schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

/// Request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether required.
    #[serde(default)]
    pub required: bool,
    /// Content by media type.
    pub content: IndexMap<String, MediaType>,
}

/// Media type content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    /// Schema for this media type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

/// Response definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Description (required).
    pub description: String,
    /// Response content by media type.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
}

/// API tag for grouping operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Description used for a documented response status.
#[must_use]
pub fn status_description(status: u16) -> &'static str {
    match status {
        200 => "Success",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        _ => "Response",
    }
}

/// Generator compiling route definitions into an OpenAPI document.
#[derive(Debug, Clone, Default)]
pub struct OpenApiGenerator {
    title: Option<String>,
    version: Option<String>,
    description: Option<String>,
    servers: Vec<Server>,
}

impl OpenApiGenerator {
    /// Create a new generator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API title. Defaults to `"My API"`.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the API version. Defaults to `"1.0.0"`.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the API description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a server.
    #[must_use]
    pub fn server(mut self, url: impl Into<String>, description: Option<String>) -> Self {
        self.servers.push(Server {
            url: url.into(),
            description,
        });
        self
    }

    /// Generate a document from route definitions.
    ///
    /// Routes keep their registration order. A method that OpenAPI cannot
    /// describe fails the whole document.
    pub fn generate(&self, definitions: &[RouteDefinition]) -> DocsResult<OpenApi> {
        let info = Info {
            title: self.title.clone().unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            version: self
                .version
                .clone()
                .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            description: self.description.clone(),
        };

        let mut paths: IndexMap<String, PathItem> = IndexMap::new();
        let mut tag_names: BTreeSet<String> = BTreeSet::new();

        for definition in definitions {
            let path = openapi_path(&definition.path);
            let operation = convert_operation(definition, &path);
            tag_names.extend(operation.tags.iter().cloned());

            let slot = paths
                .entry(path)
                .or_default()
                .slot_mut(&definition.method)
                .ok_or_else(|| DocsError::InvalidOperation {
                    method: definition.method.to_string(),
                    path: definition.path.clone(),
                    reason: "method cannot be documented".to_string(),
                })?;
            if slot.is_none() {
                *slot = Some(operation);
            }
        }

        let tags = tag_names
            .into_iter()
            .map(|name| Tag {
                name,
                description: None,
            })
            .collect();

        Ok(OpenApi {
            openapi: "3.1.0".to_string(),
            info,
            servers: self.servers.clone(),
            paths,
            tags,
        })
    }

    /// Generate the document as pretty-printed JSON.
    pub fn generate_json(&self, definitions: &[RouteDefinition]) -> DocsResult<String> {
        self.generate(definitions)?.to_json()
    }
}

fn convert_operation(definition: &RouteDefinition, path: &str) -> Operation {
    let contract = &definition.contract;

    let mut parameters = Vec::new();
    if let Some(params) = contract.params() {
        parameters.extend(schema_parameters(&params.json_schema(), ParameterIn::Path));
    }
    for name in extract_path_parameters(path) {
        if !parameters.iter().any(|p| p.name == name) {
            parameters.push(Parameter {
                name,
                location: ParameterIn::Path,
                description: None,
                required: true,
                schema: Some(serde_json::json!({ "type": "string" })),
            });
        }
    }
    if let Some(query) = contract.query() {
        parameters.extend(schema_parameters(&query.json_schema(), ParameterIn::Query));
    }
    if let Some(headers) = contract.headers() {
        parameters.extend(schema_parameters(&headers.json_schema(), ParameterIn::Header));
    }

    let request_body = contract.request().map(|schema| RequestBody {
        description: Some("Request body".to_string()),
        required: true,
        content: json_content(schema.json_schema()),
    });

    let responses = contract
        .response_map()
        .into_iter()
        .map(|(status, schema)| {
            (
                status.to_string(),
                Response {
                    description: status_description(status).to_string(),
                    content: json_content(schema.json_schema()),
                },
            )
        })
        .collect();

    Operation {
        summary: contract
            .summary()
            .filter(|summary| !summary.is_empty())
            .map_or_else(|| format!("{} {}", definition.method, definition.path), str::to_string),
        description: contract
            .description()
            .filter(|description| !description.is_empty())
            .map(str::to_string),
        tags: definition.tags.clone(),
        parameters,
        request_body,
        responses,
    }
}

fn json_content(schema: Value) -> IndexMap<String, MediaType> {
    let mut content = IndexMap::new();
    content.insert(JSON.to_string(), MediaType { schema: Some(schema) });
    content
}

/// Expands the properties of an object JSON Schema into parameters.
///
/// Path parameters are always required; others follow the schema's
/// `required` list. Non-object schemas yield no parameters.
fn schema_parameters(schema: &Value, location: ParameterIn) -> Vec<Parameter> {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    properties
        .iter()
        .map(|(name, property)| Parameter {
            name: name.clone(),
            location,
            description: property
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            required: location == ParameterIn::Path || required.contains(&name.as_str()),
            schema: Some(property.clone()),
        })
        .collect()
}

/// Rewrites catch-all segments (`*rest`) as OpenAPI placeholders.
fn openapi_path(template: &str) -> String {
    if !template.contains('*') {
        return template.to_string();
    }
    template
        .split('/')
        .map(|segment| match segment.strip_prefix('*') {
            Some(name) => format!("{{{name}}}"),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

static PATH_PARAM: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\{([^}]+)\}").ok());

/// Extract placeholder names from a path template like `/users/{userId}`.
fn extract_path_parameters(path: &str) -> Vec<String> {
    PATH_PARAM
        .iter()
        .flat_map(|re| re.captures_iter(path))
        .filter_map(|cap| cap.get(1))
        .map(|name| name.as_str().to_string())
        .collect()
}
