//! Request wrapper
//!
//! Buffers the body once at the edge so every pipeline stage sees the same
//! bytes and the request can be cloned for fall-through stages.

use axum::body::{to_bytes, Body, Bytes};
use axum::http::{header, Extensions, HeaderMap, HeaderValue, Method, Request, Uri};
use http_body_util::LengthLimitError;
use serde::de::DeserializeOwned;

use crate::errors::{HttpError, HttpResult};
use crate::json::JsonOptions;

/// Request flowing through the middleware pipeline
#[derive(Debug)]
pub struct RymRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    extensions: Extensions,
    body: Bytes,
}

impl RymRequest {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self {
            method,
            uri,
            headers,
            extensions: Extensions::new(),
            body: Bytes::new(),
        }
    }

    /// Build a request from an axum request, buffering at most `limit` bytes
    pub async fn from_axum(request: Request<Body>, limit: usize) -> HttpResult<Self> {
        let (parts, body) = request.into_parts();

        if let Some(size) = parts
            .headers
            .get(header::CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<usize>().ok())
        {
            if size > limit {
                return Err(HttpError::RequestTooLarge { size, limit });
            }
        }

        let body = to_bytes(body, limit).await.map_err(|e| {
            if exceeds_limit(&e) {
                // Bodies without a length are cut at the first byte past the limit.
                HttpError::RequestTooLarge {
                    size: limit.saturating_add(1),
                    limit,
                }
            } else {
                HttpError::bad_request(format!("Failed to read request body: {}", e))
            }
        })?;

        Ok(Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            extensions: parts.extensions,
            body,
        })
    }

    /// Attach a body
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Attach a header, ignoring invalid values
    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Header value as a string, `None` when missing or not visible ASCII
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn body_bytes(&self) -> &Bytes {
        &self.body
    }

    /// Deserialize the body with the application's JSON conventions
    pub fn json<T: DeserializeOwned>(&self, options: &JsonOptions) -> HttpResult<T> {
        if self.body.is_empty() {
            return Err(HttpError::bad_request("Request body is empty"));
        }
        options.from_slice(&self.body).map_err(HttpError::from)
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// Typed extension lookup
    pub fn extension<T: Clone + Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }

    pub fn insert_extension<T: Clone + Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(value);
    }

    /// Copy of method, uri and headers with an empty body, for handing the
    /// request to a tower service without giving up the original
    pub fn to_head_request(&self) -> Request<Body> {
        let mut request = Request::new(Body::empty());
        *request.method_mut() = self.method.clone();
        *request.uri_mut() = self.uri.clone();
        *request.headers_mut() = self.headers.clone();
        request
    }
}

fn exceeds_limit(error: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(error) = current {
        if error.is::<LengthLimitError>() {
            return true;
        }
        current = error.source();
    }
    false
}
