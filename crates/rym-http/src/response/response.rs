//! Response wrapper with buffered body

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, Response, StatusCode};
use http_body_util::BodyExt;
use serde::Serialize;

use crate::errors::{HttpError, HttpResult};
use crate::json::JsonOptions;

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

#[derive(Debug, Clone)]
pub struct RymResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Default for RymResponse {
    fn default() -> Self {
        Self::ok()
    }
}

impl RymResponse {
    pub fn with_status(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn ok() -> Self {
        Self::with_status(StatusCode::OK)
    }

    pub fn no_content() -> Self {
        Self::with_status(StatusCode::NO_CONTENT)
    }

    pub fn not_found() -> Self {
        Self::error(StatusCode::NOT_FOUND, "not_found", "No endpoint matches the request")
    }

    /// 405 carrying the methods the path does support
    pub fn method_not_allowed(allowed: &[Method]) -> Self {
        let allow = allowed
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        Self::error(
            StatusCode::METHOD_NOT_ALLOWED,
            "method_not_allowed",
            "Method not allowed for this endpoint",
        )
        .with_header(header::ALLOW.as_str(), &allow)
    }

    /// Error body `{"error":{"code","message"}}`
    pub fn error(status: StatusCode, code: &str, message: &str) -> Self {
        let body = serde_json::json!({
            "error": {
                "code": code,
                "message": message,
            }
        });
        let mut response = Self::with_status(status);
        response.set_body(body.to_string(), JSON_CONTENT_TYPE);
        response
    }

    /// Serialize `data` with the application's JSON conventions
    pub fn json_with<T: Serialize>(options: &JsonOptions, data: &T) -> HttpResult<Self> {
        let bytes = options.to_vec(data)?;
        let mut response = Self::ok();
        response.set_body(bytes, JSON_CONTENT_TYPE);
        Ok(response)
    }

    pub fn text(text: impl Into<String>) -> Self {
        let mut response = Self::ok();
        response.set_body(text.into(), "text/plain; charset=utf-8");
        response
    }

    pub fn html(html: impl Into<String>) -> Self {
        let mut response = Self::ok();
        response.set_body(html.into(), "text/html; charset=utf-8");
        response
    }

    /// Raw JSON bytes already serialized by the caller
    pub fn json_bytes(bytes: impl Into<Bytes>) -> Self {
        let mut response = Self::ok();
        response.set_body(bytes, JSON_CONTENT_TYPE);
        response
    }

    /// Replace the body, setting its content type
    pub fn with_body(mut self, body: impl Into<Bytes>, content_type: &'static str) -> Self {
        self.set_body(body, content_type);
        self
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body_bytes(&self) -> &Bytes {
        &self.body
    }

    /// Header value as a string
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Insert a header, replacing any existing value
    pub fn add_header(&mut self, name: &str, value: &str) -> HttpResult<()> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| HttpError::internal(format!("Invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| HttpError::internal(format!("Invalid header value for '{}': {}", name, e)))?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Append a header value without replacing existing ones
    pub fn append_header(&mut self, name: &str, value: &str) -> HttpResult<()> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| HttpError::internal(format!("Invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| HttpError::internal(format!("Invalid header value for '{}': {}", name, e)))?;
        self.headers.append(name, value);
        Ok(())
    }

    /// Builder-style header insert; invalid headers are logged and skipped
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let Err(e) = self.add_header(name, value) {
            tracing::warn!(error = %e, "Dropping invalid response header");
        }
        self
    }

    fn set_body(&mut self, body: impl Into<Bytes>, content_type: &'static str) {
        self.body = body.into();
        self.headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    }

    /// Buffer a response produced by a tower service
    pub async fn from_http<B>(response: Response<B>) -> HttpResult<Self>
    where
        B: axum::body::HttpBody,
        B::Error: std::fmt::Display,
    {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| HttpError::internal(format!("Failed to read response body: {}", e)))?
            .to_bytes();
        Ok(Self {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }

    pub fn into_axum_response(self) -> Response<Body> {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
