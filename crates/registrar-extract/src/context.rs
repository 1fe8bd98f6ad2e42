//! Extraction context providing access to request data.
//!
//! The [`ExtractionContext`] is what every extractor reads from: method,
//! URI, headers, the already-received body, the path parameters captured by
//! the matched template, and the size limits in force.

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use registrar_core::Params;

use crate::limits::Limits;

/// Context providing access to all parts of an HTTP request.
///
/// # Example
///
/// ```rust
/// use registrar_extract::ExtractionContext;
/// use registrar_core::Params;
/// use http::{HeaderMap, Method, Uri};
/// use bytes::Bytes;
///
/// let mut params = Params::new();
/// params.push("person_id", "3");
///
/// let ctx = ExtractionContext::new(
///     Method::GET,
///     Uri::from_static("/person/detail/3"),
///     HeaderMap::new(),
///     Bytes::new(),
///     params,
/// );
///
/// assert_eq!(ctx.method(), &Method::GET);
/// assert_eq!(ctx.path_params().get("person_id"), Some("3"));
/// ```
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    path_params: Params,
    limits: Limits,
}

impl ExtractionContext {
    /// Creates a new extraction context with default limits.
    #[must_use]
    pub fn new(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
        path_params: Params,
    ) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
            path_params,
            limits: Limits::default(),
        }
    }

    /// Replaces the size limits.
    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the path portion of the URI.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the query string if present.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the request body as bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the path parameters captured by the matched template.
    #[must_use]
    pub fn path_params(&self) -> &Params {
        &self.path_params
    }

    /// Returns the size limits in force.
    #[must_use]
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Returns a header value as a string. Header names are case-insensitive.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name.to_ascii_lowercase().as_str())
            .and_then(|v| v.to_str().ok())
    }

    /// Returns the Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Returns the essence of the Content-Type, e.g. `multipart/form-data`.
    #[must_use]
    pub fn mime(&self) -> Option<mime::Mime> {
        self.content_type().and_then(|ct| ct.parse().ok())
    }

    /// Checks if the request body is empty.
    #[must_use]
    pub fn is_body_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Builder for constructing an `ExtractionContext`.
#[derive(Debug, Default)]
pub struct ExtractionContextBuilder {
    method: Option<Method>,
    uri: Option<Uri>,
    headers: HeaderMap,
    body: Bytes,
    path_params: Params,
    limits: Limits,
}

impl ExtractionContextBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method. Defaults to `GET`.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the URI. Defaults to `/`.
    #[must_use]
    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = Some(uri);
        self
    }

    /// Sets the headers.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Adds a single header. Invalid values are skipped.
    #[must_use]
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = value.parse() {
            self.headers.append(name, value);
        }
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the path parameters.
    #[must_use]
    pub fn path_params(mut self, params: Params) -> Self {
        self.path_params = params;
        self
    }

    /// Adds a single path parameter.
    #[must_use]
    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.push(name, value);
        self
    }

    /// Sets the size limits.
    #[must_use]
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Builds the extraction context.
    #[must_use]
    pub fn build(self) -> ExtractionContext {
        ExtractionContext {
            method: self.method.unwrap_or(Method::GET),
            uri: self.uri.unwrap_or_else(|| Uri::from_static("/")),
            headers: self.headers,
            body: self.body,
            path_params: self.path_params,
            limits: self.limits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_context_creation() {
        let mut params = Params::new();
        params.push("person_id", "42");

        let ctx = ExtractionContext::new(
            Method::GET,
            Uri::from_static("/person/detail/42?active=true"),
            HeaderMap::new(),
            Bytes::from_static(b""),
            params,
        );

        assert_eq!(ctx.method(), &Method::GET);
        assert_eq!(ctx.path(), "/person/detail/42");
        assert_eq!(ctx.query_string(), Some("active=true"));
        assert_eq!(ctx.path_params().get("person_id"), Some("42"));
        assert!(ctx.is_body_empty());
        assert_eq!(ctx.limits(), &Limits::default());
    }

    #[test]
    fn test_builder_defaults_and_overrides() {
        let ctx = ExtractionContextBuilder::new()
            .method(Method::POST)
            .uri(Uri::from_static("/person/new"))
            .header("content-type", "application/json")
            .body(r#"{"first_name": "Miguel"}"#)
            .limits(Limits::new().max_body_size(64))
            .build();

        assert_eq!(ctx.method(), &Method::POST);
        assert_eq!(ctx.content_type(), Some("application/json"));
        assert!(!ctx.is_body_empty());
        assert_eq!(ctx.limits().max_body_size, 64);

        let bare = ExtractionContextBuilder::new().build();
        assert_eq!(bare.method(), &Method::GET);
        assert_eq!(bare.path(), "/");
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let ctx = ExtractionContextBuilder::new()
            .header("user-agent", "curl/8.0")
            .build();

        assert_eq!(ctx.header("user-agent"), Some("curl/8.0"));
        assert_eq!(ctx.header("User-Agent"), Some("curl/8.0"));
        assert_eq!(ctx.header("missing"), None);
    }

    #[test]
    fn test_mime() {
        let ctx = ExtractionContextBuilder::new()
            .header("content-type", "multipart/form-data; boundary=X")
            .build();
        let mime = ctx.mime().unwrap();
        assert_eq!(mime.essence_str(), "multipart/form-data");
        assert_eq!(mime.get_param("boundary").unwrap().as_str(), "X");
    }
}
