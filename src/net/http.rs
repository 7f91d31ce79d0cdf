//! Transport-neutral request/response model.
//!
//! DESIGN
//! ======
//! The API client and interceptor chain only ever see these types. The
//! concrete HTTP stack sits behind [`Transport`] so tests can script
//! responses and the browser build can plug in `gloo-net`.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use serde::de::DeserializeOwned;

pub const AUTHORIZATION: &str = "Authorization";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const ACCEPT: &str = "Accept";
pub const APPLICATION_JSON: &str = "application/json";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

/// Header mutation capability used by the interceptor chain.
///
/// Names are case-insensitive; `set_header` replaces any existing value.
pub trait HeaderSink {
    fn set_header(&mut self, name: &str, value: &str);
    fn delete_header(&mut self, name: &str);
}

/// Ordered, case-insensitive header list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
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

impl HeaderSink for Headers {
    fn set_header(&mut self, name: &str, value: &str) {
        self.delete_header(name);
        self.entries.push((name.to_owned(), value.to_owned()));
    }

    fn delete_header(&mut self, name: &str) {
        self.entries.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }
}

/// A file attached to a multipart form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilePart {
    pub field: String,
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Multipart form payload. The transport chooses the boundary.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MultipartForm {
    pub fields: Vec<(String, String)>,
    pub files: Vec<FilePart>,
}

impl MultipartForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn file(mut self, field: impl Into<String>, filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.files.push(FilePart { field: field.into(), filename: filename.into(), bytes });
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Body {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(MultipartForm),
}

impl Body {
    pub fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base until the client resolves it.
    pub url: String,
    pub headers: Headers,
    pub body: Body,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self { method, url: url.into(), headers: Headers::new(), body: Body::Empty }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self { body: Body::Json(body), ..Self::new(Method::Post, url) }
    }

    pub fn post_multipart(url: impl Into<String>, form: MultipartForm) -> Self {
        Self { body: Body::Multipart(form), ..Self::new(Method::Post, url) }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.set_header(name, value);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON. An empty body decodes as `null`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let raw = if self.body.trim().is_empty() { "null" } else { self.body.as_str() };
        serde_json::from_str(raw).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out after {ms}ms")]
    Timeout { ms: u64 },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("request failed with status {status}")]
    Status { status: u16, body: String },
    #[error("response decode failed: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for the statuses that force the client to drop its session.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// Human-readable message from a JSON error body (`message` or `error`).
    pub fn server_message(&self) -> Option<String> {
        let Self::Status { body, .. } = self else {
            return None;
        };
        let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) else {
            return None;
        };
        ["message", "error"]
            .iter()
            .find_map(|key| map.get(*key).and_then(serde_json::Value::as_str))
            .map(str::to_owned)
    }
}

/// The HTTP stack the API client delegates to.
#[async_trait::async_trait(?Send)]
pub trait Transport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}
