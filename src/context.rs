//! Request/response context handed to handlers.

use http::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::error::HttpError;
use crate::params::PathParams;

/// Per-request context wrapping the parsed request and a buffered response.
///
/// The response side (status, headers, body) is buffered and flushed only
/// after the handler chain completes, so a wrapper can still rewrite the
/// status or headers after the inner handler ran. Header and status
/// mutations made by inner wrappers are visible to outer ones because they
/// all go through this shared context.
pub struct Context {
    method: Method,
    path: String,
    headers: HashMap<String, String>,
    query: HashMap<String, String>,
    cookies: HashMap<String, String>,
    body: Option<Value>,
    params: PathParams,
    status: u16,
    response_headers: Vec<(String, String)>,
    buffer: Vec<u8>,
}

impl Context {
    /// Create a context for the given method and (already query-stripped) path.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HashMap::new(),
            query: HashMap::new(),
            cookies: HashMap::new(),
            body: None,
            params: PathParams::new(),
            status: 200,
            response_headers: Vec::new(),
            buffer: Vec::new(),
        }
    }

    /// Attach request headers. Keys are expected lowercase.
    #[must_use]
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn with_query(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub fn with_cookies(mut self, cookies: HashMap<String, String>) -> Self {
        self.cookies = cookies;
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }

    // --- request side ---

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Check the request method.
    #[must_use]
    pub fn is(&self, method: &Method) -> bool {
        self.method == *method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get a captured path parameter by name (last write wins).
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    #[must_use]
    pub fn params(&self) -> &PathParams {
        &self.params
    }

    pub(crate) fn set_params(&mut self, params: PathParams) {
        self.params = params;
    }

    pub(crate) fn take_params(&mut self) -> PathParams {
        std::mem::take(&mut self.params)
    }

    /// Get a query string parameter by name.
    #[must_use]
    pub fn query(&self, field: &str) -> Option<&str> {
        self.query.get(field).map(String::as_str)
    }

    /// Get a request header by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Get a request cookie by name.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// The request body parsed as JSON, when one was present.
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Decode the JSON request body into a typed value.
    ///
    /// # Errors
    ///
    /// Returns an [`HttpError`] with code 400 when the body is missing or
    /// does not deserialize into `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        let body = self
            .body
            .as_ref()
            .ok_or_else(|| HttpError::new(400, "request body required"))?;
        serde_json::from_value(body.clone())
            .map_err(|e| HttpError::new(400, e.to_string()).into())
    }

    // --- response side ---

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Set the response status. Not flushed until the chain completes.
    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    /// Add or replace a response header (case-insensitive on name).
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.response_headers
            .retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.response_headers.push((name.to_string(), value.into()));
    }

    /// Read back a response header set earlier in the chain.
    #[must_use]
    pub fn response_header(&self, name: &str) -> Option<&str> {
        self.response_headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn response_headers(&self) -> &[(String, String)] {
        &self.response_headers
    }

    /// Append raw bytes to the buffered response body.
    pub fn write(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Write a plain-text body and set `Content-Type: text/plain`.
    pub fn text(&mut self, body: &str) {
        self.set_header("Content-Type", "text/plain");
        self.buffer.extend_from_slice(body.as_bytes());
    }

    /// Serialize a value as the JSON body and set
    /// `Content-Type: application/json`.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization fails.
    pub fn json(&mut self, value: &impl Serialize) -> anyhow::Result<()> {
        self.set_header("Content-Type", "application/json");
        let bytes = serde_json::to_vec(value)?;
        self.buffer.extend_from_slice(&bytes);
        Ok(())
    }

    #[must_use]
    pub fn response_body(&self) -> &[u8] {
        &self.buffer
    }

    /// Discard anything buffered so far. Used when a handler error replaces
    /// a partially written body with the error envelope.
    pub(crate) fn clear_body(&mut self) {
        self.buffer.clear();
    }
}
