//! Structured validation issues.
//!
//! Every failed parse yields an [`Issues`] list. Each [`Issue`] carries the
//! location of the offending value, a machine-readable [`IssueCode`] and a
//! message. [`Issues::tree`] folds the flat list into the nested error tree
//! sent to clients.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

/// One step in the path to a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Object property.
    Key(String),
    /// Array index.
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Machine-readable issue category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// Value has the wrong JSON type.
    InvalidType,
    /// A required property is missing.
    Required,
    /// Below a minimum (length, value or item count).
    TooSmall,
    /// Above a maximum (length, value or item count).
    TooBig,
    /// String failed a pattern or format check.
    InvalidString,
    /// String is not one of the allowed values.
    InvalidEnumValue,
    /// Value differs from the expected literal.
    InvalidLiteral,
    /// No union variant accepted the value.
    InvalidUnion,
    /// Object carries keys the schema rejects.
    UnrecognizedKeys,
    /// The raw input could not be decoded as JSON.
    InvalidJson,
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    /// Location of the failing value, empty for the root.
    pub path: Vec<PathSegment>,
    /// Issue category.
    pub code: IssueCode,
    /// Human-readable message.
    pub message: String,
}

impl Issue {
    /// Creates an issue located at the root value.
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            code,
            message: message.into(),
        }
    }

    /// Relocates the issue.
    #[must_use]
    pub fn at(mut self, path: Vec<PathSegment>) -> Self {
        self.path = path;
        self
    }

    /// Renders the path in `$.a[0].b` notation.
    pub fn path_string(&self) -> String {
        let mut out = String::from("$");
        for segment in &self.path {
            match segment {
                PathSegment::Key(key) => {
                    out.push('.');
                    out.push_str(key);
                }
                PathSegment::Index(index) => {
                    out.push('[');
                    out.push_str(&index.to_string());
                    out.push(']');
                }
            }
        }
        out
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path_string(), self.message)
    }
}

/// The failure half of a validation outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Issues(Vec<Issue>);

impl Issues {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a list holding one issue.
    pub fn single(issue: Issue) -> Self {
        Self(vec![issue])
    }

    /// Appends an issue.
    pub fn push(&mut self, issue: Issue) {
        self.0.push(issue);
    }

    /// Returns `true` when there are no issues.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of issues.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the issues.
    pub fn iter(&self) -> std::slice::Iter<'_, Issue> {
        self.0.iter()
    }

    /// Returns the issues as a slice.
    pub fn as_slice(&self) -> &[Issue] {
        &self.0
    }

    /// Folds the issues into a nested error tree.
    ///
    /// Every node has an `errors` array of messages for that location.
    /// Object locations add `properties` keyed by field name and array
    /// locations add `items`, indexed by position with `null` holes.
    ///
    /// ```
    /// use accord_contract::{Issue, IssueCode, Issues, PathSegment};
    /// use serde_json::json;
    ///
    /// let issues = Issues::single(
    ///     Issue::new(IssueCode::InvalidType, "Expected number, received string")
    ///         .at(vec![PathSegment::from("age")]),
    /// );
    /// assert_eq!(
    ///     issues.tree(),
    ///     json!({
    ///         "errors": [],
    ///         "properties": {
    ///             "age": { "errors": ["Expected number, received string"] }
    ///         }
    ///     })
    /// );
    /// ```
    pub fn tree(&self) -> Value {
        let mut root = TreeNode::default();
        for issue in &self.0 {
            let mut node = &mut root;
            for segment in &issue.path {
                node = match segment {
                    PathSegment::Key(key) => node.properties.entry(key.clone()).or_default(),
                    PathSegment::Index(index) => node.items.entry(*index).or_default(),
                };
            }
            node.errors.push(issue.message.clone());
        }
        root.into_value()
    }
}

#[derive(Default)]
struct TreeNode {
    errors: Vec<String>,
    properties: IndexMap<String, TreeNode>,
    items: IndexMap<usize, TreeNode>,
}

impl TreeNode {
    fn into_value(self) -> Value {
        let mut out = Map::new();
        out.insert(
            "errors".to_string(),
            Value::Array(self.errors.into_iter().map(Value::String).collect()),
        );

        if !self.properties.is_empty() {
            let properties = self
                .properties
                .into_iter()
                .map(|(key, node)| (key, node.into_value()))
                .collect();
            out.insert("properties".to_string(), Value::Object(properties));
        }

        if !self.items.is_empty() {
            let len = self.items.keys().max().map_or(0, |max| max + 1);
            let mut items = vec![Value::Null; len];
            for (index, node) in self.items {
                items[index] = node.into_value();
            }
            out.insert("items".to_string(), Value::Array(items));
        }

        Value::Object(out)
    }
}

impl fmt::Display for Issues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Issues {}

impl From<Vec<Issue>> for Issues {
    fn from(issues: Vec<Issue>) -> Self {
        Self(issues)
    }
}

impl IntoIterator for Issues {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Issues {
    type Item = &'a Issue;
    type IntoIter = std::slice::Iter<'a, Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
