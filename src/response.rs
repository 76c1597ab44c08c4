//! Canned responses returned for matched requests.

use crate::error::{Error, Result};
use crate::request::Headers;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// A cookie set on a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Cookie {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// The body of a canned response.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResponseBody {
    /// No body.
    #[default]
    Empty,
    /// A JSON document, with headers and cookies that travel with it.
    Json(JsonBody),
}

/// A JSON response body.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonBody {
    value: Value,
    headers: Headers,
    cookies: Vec<Cookie>,
}

impl JsonBody {
    /// Add a header that is merged into the enclosing response.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Add a cookie that is merged into the enclosing response.
    pub fn with_cookie(mut self, cookie: Cookie) -> Self {
        self.cookies.push(cookie);
        self
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl From<JsonBody> for ResponseBody {
    fn from(body: JsonBody) -> Self {
        ResponseBody::Json(body)
    }
}

impl ResponseBody {
    pub fn empty() -> Self {
        ResponseBody::Empty
    }

    /// Create a JSON body from any JSON value.
    pub fn json(value: Value) -> JsonBody {
        JsonBody {
            value,
            headers: Headers::new(),
            cookies: Vec::new(),
        }
    }

    /// Serialize the body to the bytes sent on the wire.
    pub fn serialize(&self) -> Vec<u8> {
        match self {
            ResponseBody::Empty => Vec::new(),
            ResponseBody::Json(body) => body.value.to_string().into_bytes(),
        }
    }

    /// Headers contributed by the body itself.
    pub fn headers(&self) -> Headers {
        match self {
            ResponseBody::Empty => Headers::new(),
            ResponseBody::Json(body) => body.headers.clone(),
        }
    }

    /// Cookies contributed by the body itself.
    pub fn cookies(&self) -> &[Cookie] {
        match self {
            ResponseBody::Empty => &[],
            ResponseBody::Json(body) => &body.cookies,
        }
    }
}

/// A response declared for an expectation.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: u16,
    reason: String,
    headers: Headers,
    cookies: Vec<Cookie>,
    body: ResponseBody,
}

impl Default for Response {
    fn default() -> Self {
        Response::new(200)
    }
}

impl Response {
    /// Create a response with the given status code and its canonical reason phrase.
    pub fn new(status: u16) -> Self {
        let reason = axum::http::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("")
            .to_string();
        Response {
            status,
            reason,
            headers: Headers::new(),
            cookies: Vec::new(),
            body: ResponseBody::Empty,
        }
    }

    /// Create a response from a status line such as `"404 Not Found"`.
    pub fn from_status_line(line: &str) -> Result<Self> {
        let (code, reason) = line.split_once(' ').unwrap_or((line, ""));
        let status = code
            .parse()
            .map_err(|_| Error::InvalidStatusLine(line.to_string()))?;
        Ok(Response {
            reason: reason.to_string(),
            ..Response::new(status)
        })
    }

    /// `200 OK` with the given body.
    pub fn ok(body: impl Into<ResponseBody>) -> Self {
        Response::new(200).with_body(body)
    }

    pub fn with_body(mut self, body: impl Into<ResponseBody>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_cookie(mut self, cookie: Cookie) -> Self {
        self.cookies.push(cookie);
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Build the response handed back to the caller.
    ///
    /// Body headers are applied first and response headers after, so the
    /// response wins when both name the same header.
    pub fn materialize(&self) -> MockResponse {
        let mut headers = self.body.headers();
        headers.merge(&self.headers);

        let mut cookies = self.body.cookies().to_vec();
        cookies.extend(self.cookies.iter().cloned());

        MockResponse {
            status: self.status,
            reason: self.reason.clone(),
            headers,
            cookies,
            body: self.body.serialize(),
        }
    }
}

/// A response produced by an interceptor for a matched request.
#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    pub status: u16,
    pub reason: String,
    pub headers: Headers,
    pub cookies: Vec<Cookie>,
    pub body: Vec<u8>,
}

impl MockResponse {
    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_response_is_empty_200_ok() {
        let response = Response::default().materialize();
        assert_eq!(response.status, 200);
        assert_eq!(response.reason, "OK");
        assert!(response.body.is_empty());
        assert!(response.headers.is_empty());
    }

    #[test]
    fn status_line_is_split_on_first_space() {
        let response = Response::from_status_line("418 I'm a teapot").unwrap();
        assert_eq!(response.status(), 418);
        assert_eq!(response.reason(), "I'm a teapot");
    }

    #[test]
    fn status_line_with_bad_code_is_rejected() {
        assert!(matches!(
            Response::from_status_line("OK 200"),
            Err(Error::InvalidStatusLine(_))
        ));
    }

    #[test]
    fn response_headers_win_over_body_headers() {
        let response = Response::ok(
            ResponseBody::json(json!({})).with_header("Content-Type", "application/json"),
        )
        .with_header("content-type", "text/plain")
        .materialize();
        assert_eq!(response.headers.len(), 1);
        assert_eq!(response.headers.get("Content-Type"), Some("text/plain"));
    }

    #[test]
    fn cookies_from_body_and_response_are_combined() {
        let response = Response::ok(
            ResponseBody::json(json!({})).with_cookie(Cookie::new("session", "abc")),
        )
        .with_cookie(Cookie::new("theme", "dark"))
        .materialize();
        assert_eq!(
            response.cookies,
            vec![Cookie::new("session", "abc"), Cookie::new("theme", "dark")]
        );
    }
}
