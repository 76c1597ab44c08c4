//! Request specifications and intercepted requests.

use serde_json::Value;
use std::fmt;

/// An ordered list of HTTP headers.
///
/// Header names are compared case-insensitively, but the original spelling
/// and insertion order are kept for display.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Create an empty header list.
    pub fn new() -> Self {
        Headers::default()
    }

    /// Insert a header, replacing any existing value with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Add a header value, keeping any values already present under the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Get the first value of a header by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).next()
    }

    /// Get every value of a header by name, in insertion order.
    pub fn get_all<'a, 'b>(
        &'a self,
        name: &'b str,
    ) -> impl Iterator<Item = &'a str> + use<'a, 'b> {
        self.entries
            .iter()
            .filter(move |(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Insert every header from `other`; values from `other` win on equal names.
    pub fn merge(&mut self, other: &Headers) {
        for (name, value) in other.iter() {
            self.insert(name, value);
        }
    }

    /// Returns true if every header in `self` is present in `other` with an equal value.
    ///
    /// A header repeated in `other` matches if any of its values is equal.
    pub fn is_subset_of(&self, other: &Headers) -> bool {
        self.iter()
            .all(|(name, value)| other.get_all(name).any(|v| v == value))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

impl fmt::Debug for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Predicate over the body of an incoming request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// Any body is accepted.
    #[default]
    Any,
    /// The body must parse as JSON and deep-equal the given value.
    Json(Value),
    /// The body must equal the given bytes exactly.
    Raw(Vec<u8>),
}

impl RequestBody {
    /// Check whether a raw request body satisfies this predicate.
    ///
    /// A body that cannot be parsed never matches; it is not an error.
    pub fn matches(&self, body: &[u8]) -> bool {
        match self {
            RequestBody::Any => true,
            RequestBody::Json(expected) => serde_json::from_slice::<Value>(body)
                .map(|actual| &actual == expected)
                .unwrap_or(false),
            RequestBody::Raw(expected) => expected.as_slice() == body,
        }
    }
}

/// A request an expectation is declared for.
///
/// Immutable once built; the builder methods consume and return `self`.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub(crate) method: String,
    pub(crate) path: String,
    pub(crate) headers: Option<Headers>,
    pub(crate) body: RequestBody,
}

impl Request {
    /// Create a request spec for the given method and path.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Request {
            method: method.into(),
            path: path.into(),
            headers: None,
            body: RequestBody::Any,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Request::new("GET", path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Request::new("POST", path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Request::new("PUT", path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Request::new("PATCH", path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Request::new("DELETE", path)
    }

    /// Require a header to be present with the given value.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.get_or_insert_with(Headers::new).insert(name, value);
        self
    }

    /// Require all of the given headers.
    pub fn with_headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let required = self.headers.get_or_insert_with(Headers::new);
        for (name, value) in headers {
            required.insert(name, value);
        }
        self
    }

    /// Require the body to be JSON equal to `value`.
    pub fn with_json(mut self, value: Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    /// Require the body to equal `bytes` exactly.
    pub fn with_body(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.body = RequestBody::Raw(bytes.into());
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Produce a copy of this spec with its path prefixed by `base_url`.
    pub(crate) fn resolve(&self, base_url: &str) -> Request {
        Request {
            path: format!("{}{}", base_url, self.path),
            ..self.clone()
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)?;
        if let Some(headers) = &self.headers {
            write!(f, ", headers: {}", headers)?;
        }
        match &self.body {
            RequestBody::Any => Ok(()),
            RequestBody::Json(value) => write!(f, ", json: {}", value),
            RequestBody::Raw(bytes) => write!(f, ", body: {:?}", String::from_utf8_lossy(bytes)),
        }
    }
}

/// A real request as seen by an interceptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterceptedRequest {
    pub method: String,
    pub url: String,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl InterceptedRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        InterceptedRequest {
            method: method.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        InterceptedRequest::new("GET", url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        InterceptedRequest::new("POST", url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the body to the serialized form of `value`.
    pub fn with_json(mut self, value: &Value) -> Self {
        self.body = value.to_string().into_bytes();
        self
    }
}

impl fmt::Display for InterceptedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)?;
        if !self.headers.is_empty() {
            write!(f, ", headers: {}", self.headers)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_with_only_method_and_url() {
        assert_eq!(Request::get("/v1/users").to_string(), "GET /v1/users");
    }

    #[test]
    fn display_with_headers_keeps_insertion_order() {
        let request = Request::get("/v1/users")
            .with_header("x-token", "some")
            .with_header("accept", "application/json");
        assert_eq!(
            request.to_string(),
            r#"GET /v1/users, headers: {"x-token": "some", "accept": "application/json"}"#
        );
    }

    #[test]
    fn display_with_json_body() {
        let request = Request::post("/v1/users").with_json(json!({"name": "mika"}));
        assert_eq!(request.to_string(), r#"POST /v1/users, json: {"name":"mika"}"#);
    }

    #[test]
    fn json_predicate_rejects_unparsable_body() {
        let body = RequestBody::Json(json!({"a": 1}));
        assert!(!body.matches(b"not json"));
        assert!(!body.matches(b""));
        assert!(body.matches(br#"{ "a" : 1 }"#));
        assert!(!body.matches(br#"{"a": 2}"#));
    }

    #[test]
    fn header_names_are_case_insensitive() {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "text/plain");
        headers.insert("content-type", "application/json");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("CONTENT-TYPE"), Some("application/json"));
    }

    #[test]
    fn repeated_headers_keep_every_value() {
        let mut received = Headers::new();
        received.append("X-Tag", "a");
        received.append("x-tag", "b");

        assert_eq!(received.get_all("X-TAG").collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(Headers::from_iter([("x-tag", "a")]).is_subset_of(&received));
        assert!(Headers::from_iter([("x-tag", "b")]).is_subset_of(&received));
        assert!(!Headers::from_iter([("x-tag", "c")]).is_subset_of(&received));
    }
}
