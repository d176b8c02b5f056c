//! Request and reply types flowing through the pipeline.
//!
//! [`ApiRequest`] exposes the four facets validated by the pipeline (path
//! parameters, query, headers and body) as JSON values so that validated,
//! coerced values can be written back before the handler runs. Handlers
//! answer with a [`Reply`], which the response guard inspects before it is
//! turned into an HTTP response.

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{Extensions, HeaderMap, Method, StatusCode, Uri};
use http_body_util::Full;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// The HTTP response type produced at the end of the pipeline.
pub type Response = http::Response<Full<Bytes>>;

/// Header values accepted by a header validator, after coercion.
///
/// Stored as a request extension; the original [`HeaderMap`] is left as is.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedHeaders(pub Value);

/// An inbound API request.
#[derive(Debug)]
pub struct ApiRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    params: Value,
    query: Value,
    body: Value,
    body_error: Option<String>,
    raw_body: Bytes,
    extensions: Extensions,
}

impl ApiRequest {
    /// Creates a request without headers or body.
    pub fn new(method: Method, uri: Uri) -> Self {
        let query = parse_query(uri.query());
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            params: Value::Object(Map::new()),
            query,
            body: Value::Null,
            body_error: None,
            raw_body: Bytes::new(),
            extensions: Extensions::new(),
        }
    }

    /// Creates a request from its transport parts.
    ///
    /// The query string is decoded into an object (repeated keys become
    /// arrays). A JSON body is decoded when the content type is JSON or
    /// missing; a body that fails to decode is kept as `null` and the
    /// decoding error is recorded for the body validator.
    pub fn from_parts(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        let mut request = Self::new(method, uri);
        request.headers = headers;
        request.set_raw_body(body);
        request
    }

    /// Creates a request from an `http::Request` with a collected body.
    pub fn from_http(request: http::Request<Bytes>) -> Self {
        let (parts, body) = request.into_parts();
        let mut request = Self::from_parts(parts.method, parts.uri, parts.headers, body);
        request.extensions = parts.extensions;
        request
    }

    /// Adds a header. Invalid names or values are ignored.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.raw_body = Bytes::from(body.to_string());
        self.body = body;
        self.body_error = None;
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self
    }

    /// Sets a raw body, decoding it as JSON where applicable.
    #[must_use]
    pub fn with_raw_body(mut self, body: impl Into<Bytes>) -> Self {
        self.set_raw_body(body.into());
        self
    }

    /// Sets path parameters from name/value pairs.
    #[must_use]
    pub fn with_params<'a, I>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.params = Value::Object(
            params
                .into_iter()
                .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
                .collect(),
        );
        self
    }

    fn set_raw_body(&mut self, body: Bytes) {
        self.body = Value::Null;
        self.body_error = None;

        let is_json = self
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(true, |ct| ct.contains("json"));

        if is_json && !body.iter().all(u8::is_ascii_whitespace) {
            match serde_json::from_slice(&body) {
                Ok(value) => self.body = value,
                Err(err) => self.body_error = Some(err.to_string()),
            }
        }
        self.raw_body = body;
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request URI.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The request path.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// The request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to the headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Path parameters as a JSON object.
    pub fn params(&self) -> &Value {
        &self.params
    }

    /// Replaces the path parameters.
    pub fn set_params(&mut self, params: Value) {
        self.params = params;
    }

    /// One path parameter.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// Query parameters as a JSON object.
    pub fn query(&self) -> &Value {
        &self.query
    }

    /// Replaces the query parameters.
    pub fn set_query(&mut self, query: Value) {
        self.query = query;
    }

    /// The decoded JSON body (`null` when empty or not JSON).
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Replaces the decoded body.
    pub fn set_body(&mut self, body: Value) {
        self.body = body;
    }

    /// Takes the decoded body, leaving `null`.
    pub fn take_body(&mut self) -> Value {
        std::mem::take(&mut self.body)
    }

    /// The error raised while decoding the body, if any.
    pub fn body_error(&self) -> Option<&str> {
        self.body_error.as_deref()
    }

    /// The undecoded body bytes.
    pub fn raw_body(&self) -> &Bytes {
        &self.raw_body
    }

    /// Deserializes the decoded body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.body)
    }

    /// Headers as a JSON object keyed by lowercase name.
    ///
    /// Repeated headers are joined with `", "`; values that are not valid
    /// UTF-8 are skipped.
    pub fn header_object(&self) -> Value {
        let mut out = Map::new();
        for name in self.headers.keys() {
            let values: Vec<&str> = self
                .headers
                .get_all(name)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .collect();
            if !values.is_empty() {
                out.insert(name.as_str().to_string(), Value::String(values.join(", ")));
            }
        }
        Value::Object(out)
    }

    /// Request extensions.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Mutable request extensions.
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}

fn parse_query(query: Option<&str>) -> Value {
    let mut out = Map::new();
    let Some(query) = query.filter(|q| !q.is_empty()) else {
        return Value::Object(out);
    };

    let pairs: Vec<(String, String)> = match serde_urlencoded::from_str(query) {
        Ok(pairs) => pairs,
        Err(err) => {
            tracing::debug!(error = %err, "ignoring undecodable query string");
            return Value::Object(out);
        }
    };

    for (key, value) in pairs {
        let value = Value::String(value);
        match out.get_mut(&key) {
            Some(Value::Array(existing)) => existing.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                out.insert(key, value);
            }
        }
    }
    Value::Object(out)
}

/// Body of a [`Reply`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody {
    /// No body.
    Empty,
    /// JSON payload, subject to response validation.
    Json(Value),
    /// Pre-encoded payload with its content type.
    Raw {
        /// Encoded bytes.
        bytes: Bytes,
        /// Content type header value.
        content_type: &'static str,
    },
}

/// A handler's answer, inspected by the response guard before encoding.
#[derive(Debug, Clone)]
pub struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: ReplyBody,
}

impl Reply {
    /// Creates an empty reply with the given status.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: ReplyBody::Empty,
        }
    }

    /// A `200 OK` JSON reply.
    pub fn json(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: ReplyBody::Json(body),
        }
    }

    /// A `200 OK` HTML reply.
    pub fn html(body: impl Into<String>) -> Self {
        Self::raw(body.into(), "text/html; charset=utf-8")
    }

    /// A `200 OK` plain text reply.
    pub fn text(body: impl Into<String>) -> Self {
        Self::raw(body.into(), "text/plain; charset=utf-8")
    }

    fn raw(body: String, content_type: &'static str) -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: ReplyBody::Raw {
                bytes: Bytes::from(body),
                content_type,
            },
        }
    }

    /// Sets the status code.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// The status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Changes the status code.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// The headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to the headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// The body.
    pub fn body(&self) -> &ReplyBody {
        &self.body
    }

    /// The JSON payload, if the body is JSON.
    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            ReplyBody::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Replaces the body with a JSON payload.
    pub fn set_json_body(&mut self, body: Value) {
        self.body = ReplyBody::Json(body);
    }

    /// Encodes the reply as an HTTP response.
    pub fn into_http(self) -> Response {
        let (bytes, content_type) = match self.body {
            ReplyBody::Empty => (Bytes::new(), None),
            ReplyBody::Json(value) => (Bytes::from(value.to_string()), Some("application/json")),
            ReplyBody::Raw {
                bytes,
                content_type,
            } => (bytes, Some(content_type)),
        };

        let mut response = http::Response::new(Full::new(bytes));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        if let Some(content_type) = content_type {
            response
                .headers_mut()
                .entry(CONTENT_TYPE)
                .or_insert(HeaderValue::from_static(content_type));
        }
        response
    }
}

impl Default for Reply {
    fn default() -> Self {
        Self::new(StatusCode::OK)
    }
}

/// Serializes a value as a JSON reply.
#[derive(Debug, Clone)]
pub struct Json<T>(pub T);

/// Conversion of handler outputs into a [`Reply`].
pub trait IntoReply {
    /// Performs the conversion.
    fn into_reply(self) -> Reply;
}

impl IntoReply for Reply {
    fn into_reply(self) -> Reply {
        self
    }
}

impl IntoReply for Value {
    fn into_reply(self) -> Reply {
        Reply::json(self)
    }
}

impl IntoReply for StatusCode {
    fn into_reply(self) -> Reply {
        Reply::new(self)
    }
}

impl IntoReply for (StatusCode, Value) {
    fn into_reply(self) -> Reply {
        Reply::json(self.1).with_status(self.0)
    }
}

impl<T: Serialize> IntoReply for Json<T> {
    fn into_reply(self) -> Reply {
        match serde_json::to_value(&self.0) {
            Ok(value) => Reply::json(value),
            Err(err) => {
                tracing::error!(error = %err, "failed to serialize reply body");
                Reply::json(serde_json::json!({
                    "error": "Internal server error",
                    "detail": "response serialization failed",
                }))
                .with_status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

impl<T: Serialize> IntoReply for (StatusCode, Json<T>) {
    fn into_reply(self) -> Reply {
        let reply = self.1.into_reply();
        if reply.status().is_server_error() {
            reply
        } else {
            reply.with_status(self.0)
        }
    }
}

impl<T: IntoReply, E: IntoReply> IntoReply for Result<T, E> {
    fn into_reply(self) -> Reply {
        match self {
            Ok(value) => value.into_reply(),
            Err(err) => err.into_reply(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::json;

    fn post(uri: &str, content_type: Option<&str>, body: &'static str) -> ApiRequest {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_str(ct).unwrap());
        }
        ApiRequest::from_parts(
            Method::POST,
            uri.parse().unwrap(),
            headers,
            Bytes::from_static(body.as_bytes()),
        )
    }

    #[test]
    fn test_query_parsing_groups_repeated_keys() {
        let request = ApiRequest::new(Method::GET, "/search?q=ab&tag=a&tag=b&tag=c".parse().unwrap());
        assert_eq!(
            request.query(),
            &json!({"q": "ab", "tag": ["a", "b", "c"]})
        );
        assert_eq!(request.path(), "/search");
    }

    #[test]
    fn test_query_decodes_percent_escapes() {
        let request = ApiRequest::new(Method::GET, "/s?name=J%C3%BCrgen+M".parse().unwrap());
        assert_eq!(request.query()["name"], "Jürgen M");
    }

    #[test]
    fn test_json_body_decoding() {
        let request = post("/users", Some("application/json"), r#"{"name":"mike"}"#);
        assert_eq!(request.body(), &json!({"name": "mike"}));
        assert!(request.body_error().is_none());

        let untyped = post("/users", None, "[1,2]");
        assert_eq!(untyped.body(), &json!([1, 2]));
    }

    #[test]
    fn test_malformed_json_body_is_recorded() {
        let request = post("/users", Some("application/json"), "{not json");
        assert_eq!(request.body(), &Value::Null);
        assert!(request.body_error().is_some());
    }

    #[test]
    fn test_non_json_body_is_not_decoded() {
        let request = post("/upload", Some("text/plain"), "hello");
        assert_eq!(request.body(), &Value::Null);
        assert!(request.body_error().is_none());
        assert_eq!(request.raw_body().as_ref(), b"hello");
    }

    #[test]
    fn test_empty_body_is_null() {
        let request = post("/users", Some("application/json"), "  ");
        assert_eq!(request.body(), &Value::Null);
        assert!(request.body_error().is_none());
    }

    #[test]
    fn test_header_object_lowercases_and_joins() {
        let request = ApiRequest::new(Method::GET, "/".parse().unwrap())
            .with_header("X-Api-Key", "secret")
            .with_header("accept", "text/html")
            .with_header("accept", "application/json");
        assert_eq!(
            request.header_object(),
            json!({"x-api-key": "secret", "accept": "text/html, application/json"})
        );
    }

    #[test]
    fn test_typed_body_access() {
        #[derive(serde::Deserialize)]
        struct Input {
            name: String,
        }
        let request =
            ApiRequest::new(Method::POST, "/users".parse().unwrap()).with_json(json!({"name": "x"}));
        let input: Input = request.json().unwrap();
        assert_eq!(input.name, "x");
    }

    #[tokio::test]
    async fn test_reply_encoding() {
        let response = Reply::json(json!({"id": 1}))
            .with_status(StatusCode::CREATED)
            .into_http();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.as_ref(), br#"{"id":1}"#);
    }

    #[test]
    fn test_into_reply_conversions() {
        let reply = (StatusCode::NOT_FOUND, json!({"message": "missing"})).into_reply();
        assert_eq!(reply.status(), StatusCode::NOT_FOUND);
        assert_eq!(reply.json_body(), Some(&json!({"message": "missing"})));

        let reply = Json(vec![1, 2, 3]).into_reply();
        assert_eq!(reply.json_body(), Some(&json!([1, 2, 3])));

        let failed: Result<Value, StatusCode> = Err(StatusCode::CONFLICT);
        let reply = failed.into_reply();
        assert_eq!(reply.status(), StatusCode::CONFLICT);
        assert_eq!(reply.body(), &ReplyBody::Empty);
    }

    #[test]
    fn test_html_reply_content_type() {
        let response = Reply::html("<h1>docs</h1>").into_http();
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
    }
}
