//! Request and response values stored in and served from the cache

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, VARY};
use http::{Method, StatusCode};
use url::Url;

use crate::parser::parse_vary;

/// How the host issued a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// Top-level page navigation
    Navigate,
    /// Same-origin subresource
    SameOrigin,
    /// Opaque cross-origin subresource
    #[default]
    NoCors,
    /// CORS subresource
    Cors,
}

impl RequestMode {
    /// Parse a `Sec-Fetch-Mode` header value
    pub fn from_fetch_mode(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "navigate" => RequestMode::Navigate,
            "same-origin" => RequestMode::SameOrigin,
            "cors" => RequestMode::Cors,
            _ => RequestMode::NoCors,
        }
    }
}

/// An intercepted request
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderMap,
    mode: RequestMode,
    body: Bytes,
}

impl Request {
    /// Create a request with no headers
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            mode: RequestMode::default(),
            body: Bytes::new(),
        }
    }

    /// Create a GET request for `url`
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Add a header, keeping any existing values for the same name
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Replace all headers
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Set the request mode
    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the request body (not part of the cache key)
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Request method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Absolute request URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Request headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Request mode
    pub fn mode(&self) -> RequestMode {
        self.mode
    }

    /// Request body
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Header value as text, `None` when absent or not valid UTF-8
    pub fn header_str(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Whether the `Accept` header mentions `needle`
    ///
    /// A missing `Accept` header never matches.
    pub fn accepts(&self, needle: &str) -> bool {
        self.headers
            .get_all(ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.contains(needle))
    }

    /// URL used as the cache key: the request URL without its fragment
    pub fn cache_url(&self) -> String {
        let mut url = self.url.clone();
        url.set_fragment(None);
        url.into()
    }
}

/// A response served to the host or held in the cache
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// Create a response with no headers
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// The empty response: status 200, no headers, no body
    pub fn empty() -> Self {
        Self::new(StatusCode::OK, Bytes::new())
    }

    /// Add a header, keeping any existing values for the same name
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Replace all headers
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Response status
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Response body
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Status is in the 2xx range
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// `Content-Type` as text, if present
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Header names listed in `Vary`, lowercased
    pub fn vary(&self) -> Vec<String> {
        self.headers
            .get_all(VARY)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(parse_vary)
            .map(|name| name.to_ascii_lowercase())
            .collect()
    }

    /// Split into status, headers and body
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Bytes) {
        (self.status, self.headers, self.body)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::empty()
    }
}
