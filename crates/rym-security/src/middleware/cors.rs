//! CORS (Cross-Origin Resource Sharing) middleware
//!
//! Answers preflight requests itself and decorates actual cross-origin
//! responses. Requests from origins outside the policy are refused with 403
//! before they reach routing; same-origin requests and requests without an
//! `Origin` header pass through untouched.

use std::sync::Arc;

use rym_http::http::{header, Method, StatusCode};
use rym_http::{HttpResult, Middleware, Next, NextFuture, RymRequest, RymResponse};

use crate::config::CorsPolicy;

const REQUEST_METHOD: &str = "access-control-request-method";
const REQUEST_HEADERS: &str = "access-control-request-headers";

#[derive(Debug, Clone)]
pub struct CorsMiddleware {
    policy_name: String,
    policy: Arc<CorsPolicy>,
}

impl CorsMiddleware {
    pub fn new(policy_name: impl Into<String>, policy: CorsPolicy) -> Self {
        Self {
            policy_name: policy_name.into(),
            policy: Arc::new(policy),
        }
    }

    pub fn policy(&self) -> &CorsPolicy {
        &self.policy
    }

    fn is_preflight(request: &RymRequest) -> bool {
        request.method == Method::OPTIONS && request.headers.contains_key(REQUEST_METHOD)
    }

    fn reject(&self, origin: &str, reason: &str) -> RymResponse {
        tracing::warn!(policy = %self.policy_name, origin = %origin, reason, "CORS request rejected");
        RymResponse::error(StatusCode::FORBIDDEN, "cors_rejected", reason)
    }

    fn preflight(&self, request: &RymRequest, origin: &str) -> HttpResult<RymResponse> {
        let requested_method = request.header_str(REQUEST_METHOD).unwrap_or_default();
        if !self.policy.is_method_allowed(requested_method) {
            return Ok(self.reject(origin, "Requested method is not allowed by the CORS policy"));
        }
        let requested_headers = request.header_str(REQUEST_HEADERS).unwrap_or_default();
        if !self.policy.are_headers_allowed(requested_headers) {
            return Ok(self.reject(origin, "Requested headers are not allowed by the CORS policy"));
        }

        let mut response = RymResponse::no_content();
        self.apply_origin_headers(&mut response, origin)?;

        let methods = if self.policy.methods.is_any() {
            requested_method.to_string()
        } else {
            joined(&self.policy.methods)
        };
        response.add_header("access-control-allow-methods", &methods)?;

        if !requested_headers.is_empty() {
            let headers = if self.policy.headers.is_any() {
                requested_headers.to_string()
            } else {
                joined(&self.policy.headers)
            };
            response.add_header("access-control-allow-headers", &headers)?;
        }

        if let Some(max_age) = self.policy.preflight_max_age {
            response.add_header("access-control-max-age", &max_age.to_string())?;
        }
        Ok(response)
    }

    fn apply_origin_headers(&self, response: &mut RymResponse, origin: &str) -> HttpResult<()> {
        let allow_origin = if self.policy.origins.is_any() && !self.policy.allow_credentials {
            "*"
        } else {
            origin
        };
        response.add_header("access-control-allow-origin", allow_origin)?;
        if self.policy.allow_credentials {
            response.add_header("access-control-allow-credentials", "true")?;
        }
        if self.policy.varies_by_origin() {
            response.append_header(header::VARY.as_str(), "Origin")?;
        }
        Ok(())
    }

    fn decorate(&self, response: &mut RymResponse, origin: &str) -> HttpResult<()> {
        self.apply_origin_headers(response, origin)?;
        if !self.policy.exposed_headers.is_empty() {
            response.add_header(
                "access-control-expose-headers",
                &self.policy.exposed_headers.join(", "),
            )?;
        }
        Ok(())
    }
}

impl Middleware for CorsMiddleware {
    fn handle(&self, request: RymRequest, next: Next) -> NextFuture<'static> {
        let Some(origin) = request.header_str("origin").map(str::to_string) else {
            return Box::pin(async move { next.run(request).await });
        };

        if !self.policy.is_origin_allowed(&origin) {
            if is_same_origin(&request, &origin) {
                return Box::pin(async move { next.run(request).await });
            }
            let response = self.reject(&origin, "Origin is not allowed by the CORS policy");
            return Box::pin(async move { response });
        }

        if Self::is_preflight(&request) {
            let response = self
                .preflight(&request, &origin)
                .unwrap_or_else(|e| e.into_response());
            return Box::pin(async move { response });
        }

        let cors = self.clone();
        Box::pin(async move {
            let mut response = next.run(request).await;
            if let Err(e) = cors.decorate(&mut response, &origin) {
                return e.into_response();
            }
            response
        })
    }

    fn name(&self) -> &'static str {
        "Cors"
    }
}

fn joined(list: &crate::config::AllowList) -> String {
    match list {
        crate::config::AllowList::Any => "*".to_string(),
        crate::config::AllowList::Only(values) => values.iter().cloned().collect::<Vec<_>>().join(", "),
    }
}

/// Origin's `host[:port]` equals the request `Host`, default ports ignored
fn is_same_origin(request: &RymRequest, origin: &str) -> bool {
    let Some(host) = request.header_str("host") else {
        return false;
    };
    let Some((scheme, authority)) = origin.split_once("://") else {
        return false;
    };
    let default_port = match scheme.to_ascii_lowercase().as_str() {
        "http" => ":80",
        "https" => ":443",
        _ => return false,
    };
    let strip = |value: &str| {
        let value = value.trim().trim_end_matches('/').to_ascii_lowercase();
        value.strip_suffix(default_port).map(str::to_string).unwrap_or(value)
    };
    strip(authority) == strip(host)
}
