//! Schema definitions and the validation engine.
//!
//! A [`Schema`] is built from constructor functions and refined with
//! modifiers:
//!
//! ```
//! use accord_contract::{Schema, Validate};
//! use serde_json::json;
//!
//! let schema = Schema::object([
//!     ("q", Schema::string().min_length(3)),
//!     ("page", Schema::integer().coerce().minimum(1.0).default(json!(1))),
//!     ("tags", Schema::array(Schema::string()).coerce().optional()),
//! ]);
//!
//! let query = schema.safe_parse(&json!({"q": "rust", "tags": "web"})).unwrap();
//! assert_eq!(query, json!({"q": "rust", "page": 1, "tags": ["web"]}));
//! ```
//!
//! Validation never stops at the first problem: every failing location is
//! reported in the returned [`Issues`].

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::{json, Map, Number, Value};

use crate::error::SchemaError;
use crate::issue::{Issue, IssueCode, Issues, PathSegment};

/// Capability required from any schema backing a contract field.
///
/// The pipeline only ever calls these three methods, so alternative schema
/// engines can be plugged in by implementing this trait.
pub trait Validate: Send + Sync + fmt::Debug {
    /// Validates `value`, returning the accepted (possibly coerced or
    /// defaulted) value or every issue found.
    fn safe_parse(&self, value: &Value) -> Result<Value, Issues>;

    /// Renders the schema as a JSON Schema document.
    fn json_schema(&self) -> Value;

    /// Verifies that the schema itself is well formed.
    fn check(&self) -> Result<(), SchemaError> {
        Ok(())
    }
}

impl<T: Validate + ?Sized> Validate for Arc<T> {
    fn safe_parse(&self, value: &Value) -> Result<Value, Issues> {
        (**self).safe_parse(value)
    }

    fn json_schema(&self) -> Value {
        (**self).json_schema()
    }

    fn check(&self) -> Result<(), SchemaError> {
        (**self).check()
    }
}

/// A schema shared between pipeline stages and the documentation registry.
pub type SharedSchema = Arc<dyn Validate>;

impl From<Schema> for SharedSchema {
    fn from(schema: Schema) -> Self {
        Arc::new(schema)
    }
}

/// Policy for object keys that are not declared as properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownKeys {
    /// Drop undeclared keys from the output.
    #[default]
    Strip,
    /// Keep undeclared keys unchanged.
    Passthrough,
    /// Report undeclared keys as an issue.
    Reject,
}

/// Built-in string formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    /// `local@domain.tld`.
    Email,
}

impl StringFormat {
    fn name(self) -> &'static str {
        match self {
            Self::Email => "email",
        }
    }

    fn matches(self, s: &str) -> bool {
        match self {
            Self::Email => {
                let Some((local, domain)) = s.split_once('@') else {
                    return false;
                };
                !local.is_empty()
                    && !domain.contains('@')
                    && !s.chars().any(char::is_whitespace)
                    && domain
                        .split_once('.')
                        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
                    && !domain.ends_with('.')
            }
        }
    }
}

/// The type-specific part of a schema.
#[derive(Debug, Clone)]
pub enum Kind {
    /// Accepts any value.
    Any,
    /// Accepts only `null`.
    Null,
    /// Boolean.
    Boolean,
    /// String with optional constraints.
    String {
        /// Minimum length in characters.
        min_length: Option<usize>,
        /// Maximum length in characters.
        max_length: Option<usize>,
        /// Pattern the whole string must match.
        pattern: Option<Regex>,
        /// Well-known format.
        format: Option<StringFormat>,
    },
    /// Number, optionally restricted to integers.
    Number {
        /// Reject values with a fractional part.
        integer: bool,
        /// Inclusive lower bound.
        minimum: Option<f64>,
        /// Inclusive upper bound.
        maximum: Option<f64>,
    },
    /// Homogeneous array.
    Array {
        /// Schema for every element.
        items: Box<Schema>,
        /// Minimum number of elements.
        min_items: Option<usize>,
        /// Maximum number of elements.
        max_items: Option<usize>,
    },
    /// Object with declared properties.
    Object {
        /// Declared properties in declaration order.
        properties: IndexMap<String, Schema>,
        /// Policy for undeclared keys.
        unknown_keys: UnknownKeys,
    },
    /// First matching variant wins.
    Union(Vec<Schema>),
    /// Exactly this value.
    Literal(Value),
    /// One of a fixed set of strings.
    Enum(Vec<String>),
}

impl Kind {
    fn name(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::String { .. } => "string",
            Self::Number { integer: true, .. } => "integer",
            Self::Number { .. } => "number",
            Self::Array { .. } => "array",
            Self::Object { .. } => "object",
            Self::Union(_) => "union",
            Self::Literal(_) => "literal",
            Self::Enum(_) => "enum",
        }
    }
}

/// A composable JSON schema.
#[derive(Debug, Clone)]
pub struct Schema {
    kind: Kind,
    optional: bool,
    nullable: bool,
    default: Option<Value>,
    coerce: bool,
    description: Option<String>,
    defect: Option<String>,
}

impl Schema {
    fn of(kind: Kind) -> Self {
        Self {
            kind,
            optional: false,
            nullable: false,
            default: None,
            coerce: false,
            description: None,
            defect: None,
        }
    }

    /// Accepts any value.
    pub fn any() -> Self {
        Self::of(Kind::Any)
    }

    /// Accepts only `null`.
    pub fn null() -> Self {
        Self::of(Kind::Null)
    }

    /// Boolean schema.
    pub fn boolean() -> Self {
        Self::of(Kind::Boolean)
    }

    /// String schema.
    pub fn string() -> Self {
        Self::of(Kind::String {
            min_length: None,
            max_length: None,
            pattern: None,
            format: None,
        })
    }

    /// Number schema (integers and floats).
    pub fn number() -> Self {
        Self::of(Kind::Number {
            integer: false,
            minimum: None,
            maximum: None,
        })
    }

    /// Integer schema.
    pub fn integer() -> Self {
        Self::of(Kind::Number {
            integer: true,
            minimum: None,
            maximum: None,
        })
    }

    /// Array schema whose elements all match `items`.
    pub fn array(items: Schema) -> Self {
        Self::of(Kind::Array {
            items: Box::new(items),
            min_items: None,
            max_items: None,
        })
    }

    /// Object schema from `(name, schema)` pairs.
    ///
    /// Properties are required unless marked [`optional`](Self::optional)
    /// or given a [`default`](Self::default).
    pub fn object<K, I>(properties: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Schema)>,
    {
        Self::of(Kind::Object {
            properties: properties
                .into_iter()
                .map(|(name, schema)| (name.into(), schema))
                .collect(),
            unknown_keys: UnknownKeys::Strip,
        })
    }

    /// Accepts a value matching any of `variants`, tried in order.
    pub fn union<I: IntoIterator<Item = Schema>>(variants: I) -> Self {
        Self::of(Kind::Union(variants.into_iter().collect()))
    }

    /// Accepts exactly `value`.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::of(Kind::Literal(value.into()))
    }

    /// Accepts one of the given strings.
    pub fn enumeration<S, I>(values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        Self::of(Kind::Enum(values.into_iter().map(Into::into).collect()))
    }

    /// Allows the value to be absent. Use [`nullable`](Self::nullable) to accept `null`.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Allows `null`.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Substitutes `value` when the input is absent.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Converts compatible inputs before validating.
    ///
    /// Numbers and integers accept numeric strings, booleans accept
    /// `"true"`/`"false"`/`"1"`/`"0"`, strings accept numbers and booleans,
    /// arrays wrap a single non-array value.
    #[must_use]
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    /// Attaches a description, surfaced in generated documentation.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Minimum string length.
    #[must_use]
    pub fn min_length(mut self, len: usize) -> Self {
        match &mut self.kind {
            Kind::String { min_length, .. } => *min_length = Some(len),
            _ => self.misuse("min_length"),
        }
        self
    }

    /// Maximum string length.
    #[must_use]
    pub fn max_length(mut self, len: usize) -> Self {
        match &mut self.kind {
            Kind::String { max_length, .. } => *max_length = Some(len),
            _ => self.misuse("max_length"),
        }
        self
    }

    /// Regex the whole string must match.
    ///
    /// An invalid pattern makes the schema fail [`Validate::check`].
    #[must_use]
    pub fn pattern(mut self, pattern: &str) -> Self {
        let anchored = format!("^(?:{pattern})$");
        match (&mut self.kind, Regex::new(&anchored)) {
            (Kind::String { pattern: slot, .. }, Ok(regex)) => *slot = Some(regex),
            (Kind::String { .. }, Err(err)) => {
                self.defect = Some(format!("invalid pattern '{pattern}': {err}"));
            }
            _ => self.misuse("pattern"),
        }
        self
    }

    /// Requires an email address.
    #[must_use]
    pub fn email(mut self) -> Self {
        match &mut self.kind {
            Kind::String { format, .. } => *format = Some(StringFormat::Email),
            _ => self.misuse("email"),
        }
        self
    }

    /// Inclusive numeric lower bound.
    #[must_use]
    pub fn minimum(mut self, min: f64) -> Self {
        match &mut self.kind {
            Kind::Number { minimum, .. } => *minimum = Some(min),
            _ => self.misuse("minimum"),
        }
        self
    }

    /// Inclusive numeric upper bound.
    #[must_use]
    pub fn maximum(mut self, max: f64) -> Self {
        match &mut self.kind {
            Kind::Number { maximum, .. } => *maximum = Some(max),
            _ => self.misuse("maximum"),
        }
        self
    }

    /// Minimum array length.
    #[must_use]
    pub fn min_items(mut self, min: usize) -> Self {
        match &mut self.kind {
            Kind::Array { min_items, .. } => *min_items = Some(min),
            _ => self.misuse("min_items"),
        }
        self
    }

    /// Maximum array length.
    #[must_use]
    pub fn max_items(mut self, max: usize) -> Self {
        match &mut self.kind {
            Kind::Array { max_items, .. } => *max_items = Some(max),
            _ => self.misuse("max_items"),
        }
        self
    }

    /// Rejects undeclared object keys.
    #[must_use]
    pub fn strict(self) -> Self {
        self.unknown_keys(UnknownKeys::Reject, "strict")
    }

    /// Keeps undeclared object keys.
    #[must_use]
    pub fn passthrough(self) -> Self {
        self.unknown_keys(UnknownKeys::Passthrough, "passthrough")
    }

    fn unknown_keys(mut self, policy: UnknownKeys, modifier: &str) -> Self {
        match &mut self.kind {
            Kind::Object { unknown_keys, .. } => *unknown_keys = policy,
            _ => self.misuse(modifier),
        }
        self
    }

    fn misuse(&mut self, modifier: &str) {
        self.defect = Some(format!(
            "{modifier} does not apply to {} schemas",
            self.kind.name()
        ));
    }

    /// The type-specific part of the schema.
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// `true` when the value may be absent.
    pub fn is_optional(&self) -> bool {
        self.optional || self.default.is_some()
    }

    /// `true` when `null` is accepted.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// The description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn check_at(&self, path: &str) -> Result<(), SchemaError> {
        if let Some(defect) = &self.defect {
            return Err(SchemaError::malformed(path, defect.clone()));
        }

        match &self.kind {
            Kind::String {
                min_length: Some(min),
                max_length: Some(max),
                ..
            } if min > max => {
                return Err(SchemaError::malformed(
                    path,
                    format!("min_length {min} exceeds max_length {max}"),
                ));
            }
            Kind::Number {
                minimum: Some(min),
                maximum: Some(max),
                ..
            } if min > max => {
                return Err(SchemaError::malformed(
                    path,
                    format!("minimum {min} exceeds maximum {max}"),
                ));
            }
            Kind::Array {
                items,
                min_items,
                max_items,
            } => {
                if let (Some(min), Some(max)) = (min_items, max_items) {
                    if min > max {
                        return Err(SchemaError::malformed(
                            path,
                            format!("min_items {min} exceeds max_items {max}"),
                        ));
                    }
                }
                items.check_at(&format!("{path}[]"))?;
            }
            Kind::Object { properties, .. } => {
                for (name, property) in properties {
                    property.check_at(&format!("{path}.{name}"))?;
                }
            }
            Kind::Union(variants) => {
                if variants.is_empty() {
                    return Err(SchemaError::malformed(path, "union has no variants"));
                }
                for (i, variant) in variants.iter().enumerate() {
                    variant.check_at(&format!("{path}|{i}"))?;
                }
            }
            Kind::Enum(values) if values.is_empty() => {
                return Err(SchemaError::malformed(path, "enumeration has no values"));
            }
            _ => {}
        }

        if let Some(default) = &self.default {
            let mut bare = self.clone();
            bare.default = None;
            if let Err(issues) = bare.safe_parse(default) {
                return Err(SchemaError::InvalidDefault {
                    path: path.to_string(),
                    issues,
                });
            }
        }

        Ok(())
    }

    /// Parses a possibly-absent value. `None` output means "omit".
    fn parse_at(
        &self,
        value: Option<&Value>,
        path: &mut Vec<PathSegment>,
        issues: &mut Vec<Issue>,
    ) -> Option<Value> {
        let value = match value {
            Some(Value::Null) if self.nullable => return Some(Value::Null),
            None | Some(Value::Null) if self.default.is_some() => return self.default.clone(),
            None if self.optional => return None,
            None => {
                issues.push(Issue::new(IssueCode::Required, "Required").at(path.clone()));
                return None;
            }
            Some(value) => value,
        };

        self.parse_kind(value, path, issues)
    }

    fn parse_kind(
        &self,
        value: &Value,
        path: &mut Vec<PathSegment>,
        issues: &mut Vec<Issue>,
    ) -> Option<Value> {
        let mut fail = |code: IssueCode, message: String| -> Option<Value> {
            issues.push(Issue::new(code, message).at(path.clone()));
            None
        };

        match &self.kind {
            Kind::Any => Some(value.clone()),

            Kind::Null => match value {
                Value::Null => Some(Value::Null),
                other => fail(IssueCode::InvalidType, invalid_type("null", other)),
            },

            Kind::Boolean => match (value, self.coerce) {
                (Value::Bool(b), _) => Some(Value::Bool(*b)),
                (Value::String(s), true) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" => Some(Value::Bool(true)),
                    "false" | "0" => Some(Value::Bool(false)),
                    _ => fail(IssueCode::InvalidType, invalid_type("boolean", value)),
                },
                (Value::Number(n), true) if n.as_f64() == Some(0.0) => Some(Value::Bool(false)),
                (Value::Number(n), true) if n.as_f64() == Some(1.0) => Some(Value::Bool(true)),
                (other, _) => fail(IssueCode::InvalidType, invalid_type("boolean", other)),
            },

            Kind::String {
                min_length,
                max_length,
                pattern,
                format,
            } => {
                let s = match (value, self.coerce) {
                    (Value::String(s), _) => s.clone(),
                    (Value::Number(n), true) => n.to_string(),
                    (Value::Bool(b), true) => b.to_string(),
                    (other, _) => return fail(IssueCode::InvalidType, invalid_type("string", other)),
                };

                let len = s.chars().count();
                let mut failed = false;
                if let Some(min) = min_length.filter(|min| len < *min) {
                    fail(
                        IssueCode::TooSmall,
                        format!("String must contain at least {min} character(s)"),
                    );
                    failed = true;
                }
                if let Some(max) = max_length.filter(|max| len > *max) {
                    fail(
                        IssueCode::TooBig,
                        format!("String must contain at most {max} character(s)"),
                    );
                    failed = true;
                }
                if let Some(regex) = pattern.as_ref().filter(|regex| !regex.is_match(&s)) {
                    fail(
                        IssueCode::InvalidString,
                        format!("String must match pattern {}", regex.as_str()),
                    );
                    failed = true;
                }
                if let Some(format) = format.filter(|format| !format.matches(&s)) {
                    fail(IssueCode::InvalidString, format!("Invalid {}", format.name()));
                    failed = true;
                }

                (!failed).then_some(Value::String(s))
            }

            Kind::Number {
                integer,
                minimum,
                maximum,
            } => {
                let expected = if *integer { "integer" } else { "number" };
                let (n, coerced) = match (value, self.coerce) {
                    (Value::Number(n), _) => match n.as_f64() {
                        Some(n) => (n, false),
                        None => return fail(IssueCode::InvalidType, invalid_type(expected, value)),
                    },
                    (Value::String(s), true) => match s.trim().parse::<f64>() {
                        Ok(n) if n.is_finite() && !s.trim().is_empty() => (n, true),
                        _ => return fail(IssueCode::InvalidType, invalid_type(expected, value)),
                    },
                    (Value::Bool(b), true) => (if *b { 1.0 } else { 0.0 }, true),
                    (other, _) => return fail(IssueCode::InvalidType, invalid_type(expected, other)),
                };

                if *integer && n.fract() != 0.0 {
                    return fail(
                        IssueCode::InvalidType,
                        "Expected integer, received float".to_string(),
                    );
                }

                let mut failed = false;
                if let Some(min) = minimum.filter(|min| n < *min) {
                    fail(
                        IssueCode::TooSmall,
                        format!("Number must be greater than or equal to {min}"),
                    );
                    failed = true;
                }
                if let Some(max) = maximum.filter(|max| n > *max) {
                    fail(
                        IssueCode::TooBig,
                        format!("Number must be less than or equal to {max}"),
                    );
                    failed = true;
                }

                if failed {
                    None
                } else if coerced {
                    Some(number_value(n))
                } else {
                    Some(value.clone())
                }
            }

            Kind::Array {
                items,
                min_items,
                max_items,
            } => {
                let wrapped;
                let elements = match (value, self.coerce) {
                    (Value::Array(elements), _) => elements,
                    (other, true) => {
                        wrapped = vec![other.clone()];
                        &wrapped
                    }
                    (other, false) => {
                        return fail(IssueCode::InvalidType, invalid_type("array", other))
                    }
                };

                if let Some(min) = min_items.filter(|min| elements.len() < *min) {
                    fail(
                        IssueCode::TooSmall,
                        format!("Array must contain at least {min} element(s)"),
                    );
                }
                if let Some(max) = max_items.filter(|max| elements.len() > *max) {
                    fail(
                        IssueCode::TooBig,
                        format!("Array must contain at most {max} element(s)"),
                    );
                }

                let mut out = Vec::with_capacity(elements.len());
                for (index, element) in elements.iter().enumerate() {
                    path.push(PathSegment::Index(index));
                    let parsed = items.parse_at(Some(element), path, issues);
                    path.pop();
                    out.push(parsed.unwrap_or(Value::Null));
                }
                Some(Value::Array(out))
            }

            Kind::Object {
                properties,
                unknown_keys,
            } => {
                let Value::Object(input) = value else {
                    return fail(IssueCode::InvalidType, invalid_type("object", value));
                };

                let mut out = Map::new();
                for (name, property) in properties {
                    path.push(PathSegment::Key(name.clone()));
                    if let Some(parsed) = property.parse_at(input.get(name), path, issues) {
                        out.insert(name.clone(), parsed);
                    }
                    path.pop();
                }

                let unknown: Vec<&String> = input
                    .keys()
                    .filter(|key| !properties.contains_key(*key))
                    .collect();
                match unknown_keys {
                    UnknownKeys::Strip => {}
                    UnknownKeys::Passthrough => {
                        for key in unknown {
                            out.insert(key.clone(), input[key.as_str()].clone());
                        }
                    }
                    UnknownKeys::Reject if !unknown.is_empty() => {
                        let keys: Vec<String> = unknown.iter().map(|k| format!("'{k}'")).collect();
                        issues.push(
                            Issue::new(
                                IssueCode::UnrecognizedKeys,
                                format!("Unrecognized key(s) in object: {}", keys.join(", ")),
                            )
                            .at(path.clone()),
                        );
                    }
                    UnknownKeys::Reject => {}
                }

                Some(Value::Object(out))
            }

            Kind::Union(variants) => {
                for variant in variants {
                    let mut attempt = Vec::new();
                    let parsed = variant.parse_at(Some(value), path, &mut attempt);
                    if attempt.is_empty() {
                        return parsed;
                    }
                }
                issues.push(
                    Issue::new(
                        IssueCode::InvalidUnion,
                        format!(
                            "Invalid input: {} matches none of {} union variants",
                            type_name(value),
                            variants.len()
                        ),
                    )
                    .at(path.clone()),
                );
                None
            }

            Kind::Literal(expected) => {
                if value == expected {
                    Some(value.clone())
                } else {
                    fail(
                        IssueCode::InvalidLiteral,
                        format!("Invalid literal value, expected {expected}"),
                    )
                }
            }

            Kind::Enum(allowed) => match value {
                Value::String(s) if allowed.iter().any(|a| a == s) => Some(value.clone()),
                other => {
                    let options: Vec<String> = allowed.iter().map(|a| format!("'{a}'")).collect();
                    fail(
                        IssueCode::InvalidEnumValue,
                        format!(
                            "Invalid enum value. Expected {}, received {other}",
                            options.join(" | ")
                        ),
                    )
                }
            },
        }
    }

    fn kind_json_schema(&self) -> Value {
        let mut schema = Map::new();
        match &self.kind {
            Kind::Any => {}
            Kind::Null => {
                schema.insert("type".into(), json!("null"));
            }
            Kind::Boolean => {
                schema.insert("type".into(), json!("boolean"));
            }
            Kind::String {
                min_length,
                max_length,
                pattern,
                format,
            } => {
                schema.insert("type".into(), json!("string"));
                if let Some(min) = min_length {
                    schema.insert("minLength".into(), json!(min));
                }
                if let Some(max) = max_length {
                    schema.insert("maxLength".into(), json!(max));
                }
                if let Some(regex) = pattern {
                    schema.insert("pattern".into(), json!(regex.as_str()));
                }
                if let Some(format) = format {
                    schema.insert("format".into(), json!(format.name()));
                }
            }
            Kind::Number {
                integer,
                minimum,
                maximum,
            } => {
                let ty = if *integer { "integer" } else { "number" };
                schema.insert("type".into(), json!(ty));
                if let Some(min) = minimum {
                    schema.insert("minimum".into(), number_value(*min));
                }
                if let Some(max) = maximum {
                    schema.insert("maximum".into(), number_value(*max));
                }
            }
            Kind::Array {
                items,
                min_items,
                max_items,
            } => {
                schema.insert("type".into(), json!("array"));
                schema.insert("items".into(), items.json_schema());
                if let Some(min) = min_items {
                    schema.insert("minItems".into(), json!(min));
                }
                if let Some(max) = max_items {
                    schema.insert("maxItems".into(), json!(max));
                }
            }
            Kind::Object {
                properties,
                unknown_keys,
            } => {
                schema.insert("type".into(), json!("object"));
                let props: Map<String, Value> = properties
                    .iter()
                    .map(|(name, property)| (name.clone(), property.json_schema()))
                    .collect();
                schema.insert("properties".into(), Value::Object(props));

                let required: Vec<Value> = properties
                    .iter()
                    .filter(|(_, property)| !property.is_optional())
                    .map(|(name, _)| json!(name))
                    .collect();
                if !required.is_empty() {
                    schema.insert("required".into(), Value::Array(required));
                }
                if *unknown_keys == UnknownKeys::Reject {
                    schema.insert("additionalProperties".into(), json!(false));
                }
            }
            Kind::Union(variants) => {
                let any_of: Vec<Value> = variants.iter().map(Schema::json_schema).collect();
                schema.insert("anyOf".into(), Value::Array(any_of));
            }
            Kind::Literal(value) => {
                schema.insert("const".into(), value.clone());
            }
            Kind::Enum(values) => {
                schema.insert("type".into(), json!("string"));
                schema.insert("enum".into(), json!(values));
            }
        }
        Value::Object(schema)
    }
}

impl Validate for Schema {
    fn safe_parse(&self, value: &Value) -> Result<Value, Issues> {
        let mut issues = Vec::new();
        let mut path = Vec::new();
        let parsed = self.parse_at(Some(value), &mut path, &mut issues);

        if issues.is_empty() {
            Ok(parsed.unwrap_or(Value::Null))
        } else {
            Err(Issues::from(issues))
        }
    }

    fn json_schema(&self) -> Value {
        let mut schema = self.kind_json_schema();

        if self.nullable {
            schema = match schema {
                Value::Object(mut map) if map.get("type").is_some_and(Value::is_string) => {
                    let ty = map.remove("type").unwrap_or(Value::Null);
                    map.insert("type".into(), json!([ty, "null"]));
                    Value::Object(map)
                }
                other => json!({ "anyOf": [other, { "type": "null" }] }),
            };
        }

        if let Value::Object(map) = &mut schema {
            if let Some(description) = &self.description {
                map.insert("description".into(), json!(description));
            }
            if let Some(default) = &self.default {
                map.insert("default".into(), default.clone());
            }
        }

        schema
    }

    fn check(&self) -> Result<(), SchemaError> {
        self.check_at("$")
    }
}

/// Converts an `f64` to JSON, preferring an integer representation.
#[allow(clippy::cast_possible_truncation)]
fn number_value(n: f64) -> Value {
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

fn invalid_type(expected: &str, received: &Value) -> String {
    format!("Expected {expected}, received {}", type_name(received))
}

/// Returns a human-readable name for a JSON value type.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
