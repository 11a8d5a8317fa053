//! Documentation pipeline stages
//!
//! Both stages answer GET and HEAD on their own paths and hand every other
//! request to the rest of the pipeline.

use std::collections::HashMap;
use std::sync::Arc;

use rym_http::http::Method;
use rym_http::{Middleware, Next, NextFuture, RymRequest, RymResponse};

use crate::config::{SwaggerOptions, SwaggerUiOptions};
use crate::error::OpenApiResult;
use crate::specification::OpenApiSpec;

fn is_read(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD
}

fn trimmed_path(request: &RymRequest) -> &str {
    let path = request.path().trim_end_matches('/');
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

/// A rendered document body and its content type
#[derive(Debug, Clone)]
struct RenderedDocument {
    content_type: &'static str,
    body: Arc<[u8]>,
}

/// Serves generated documents as JSON and YAML
#[derive(Debug, Clone)]
pub struct SwaggerMiddleware {
    documents: Arc<HashMap<String, RenderedDocument>>,
}

impl SwaggerMiddleware {
    /// Render every document up front; the documents never change after
    /// startup
    pub fn new(options: &SwaggerOptions, specs: &[(String, OpenApiSpec)]) -> OpenApiResult<Self> {
        options.validate()?;
        let mut documents = HashMap::new();
        for (name, spec) in specs {
            documents.insert(
                options.json_path(name).to_ascii_lowercase(),
                RenderedDocument {
                    content_type: "application/json; charset=utf-8",
                    body: spec.to_json()?.into(),
                },
            );
            documents.insert(
                options.yaml_path(name).to_ascii_lowercase(),
                RenderedDocument {
                    content_type: "text/yaml; charset=utf-8",
                    body: spec.to_yaml()?.into_bytes().into(),
                },
            );
        }
        Ok(Self {
            documents: Arc::new(documents),
        })
    }

    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<_> = self.documents.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }
}

impl Middleware for SwaggerMiddleware {
    fn handle(&self, request: RymRequest, next: Next) -> NextFuture<'static> {
        let document = is_read(&request.method)
            .then(|| self.documents.get(&trimmed_path(&request).to_ascii_lowercase()))
            .flatten()
            .cloned();

        match document {
            Some(document) => {
                let body = if request.method == Method::HEAD {
                    Vec::new()
                } else {
                    document.body.to_vec()
                };
                let response = RymResponse::ok().with_body(body, document.content_type);
                Box::pin(async move { response })
            }
            None => Box::pin(async move { next.run(request).await }),
        }
    }

    fn name(&self) -> &'static str {
        "Swagger"
    }
}

/// Serves the Swagger UI page
#[derive(Debug, Clone)]
pub struct SwaggerUiMiddleware {
    paths: Arc<[String]>,
    html: Arc<str>,
}

impl SwaggerUiMiddleware {
    /// `endpoints` are `(url, label)` pairs for the document selector
    pub fn new(options: &SwaggerUiOptions, endpoints: &[(String, String)]) -> Self {
        let prefix = options.route_prefix.trim_matches('/');
        let root = if prefix.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", prefix)
        };
        let index = format!("{}/index.html", root.trim_end_matches('/'));

        Self {
            paths: vec![root.to_ascii_lowercase(), index.to_ascii_lowercase()].into(),
            html: render_index(&options.document_title, endpoints).into(),
        }
    }
}

impl Middleware for SwaggerUiMiddleware {
    fn handle(&self, request: RymRequest, next: Next) -> NextFuture<'static> {
        let path = trimmed_path(&request).to_ascii_lowercase();
        if is_read(&request.method) && self.paths.iter().any(|p| *p == path) {
            let response = RymResponse::html(self.html.to_string());
            return Box::pin(async move { response });
        }
        Box::pin(async move { next.run(request).await })
    }

    fn name(&self) -> &'static str {
        "SwaggerUI"
    }
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn render_index(title: &str, endpoints: &[(String, String)]) -> String {
    let urls = serde_json::Value::Array(
        endpoints
            .iter()
            .map(|(url, name)| serde_json::json!({ "url": url, "name": name }))
            .collect(),
    );
    // no raw `<` inside the inline script
    let urls = urls.to_string().replace('<', "\\u003c");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5.9.0/swagger-ui.css" />
    <style>
        html {{
            box-sizing: border-box;
            overflow-y: scroll;
        }}

        *, *:before, *:after {{
            box-sizing: inherit;
        }}

        body {{
            margin: 0;
            background: #fafafa;
        }}
    </style>
</head>
<body>
    <div id="swagger-ui"></div>

    <script src="https://unpkg.com/swagger-ui-dist@5.9.0/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5.9.0/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = function() {{
            window.ui = SwaggerUIBundle({{
                urls: {urls},
                dom_id: '#swagger-ui',
                deepLinking: true,
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                plugins: [
                    SwaggerUIBundle.plugins.DownloadUrl
                ],
                layout: "StandaloneLayout",
                validatorUrl: null,
                persistAuthorization: true
            }});
        }};
    </script>
</body>
</html>"#,
        title = escape_html(title),
        urls = urls,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specification::ApiInfo;
    use rym_http::http::{HeaderMap, StatusCode, Uri};
    use rym_http::MiddlewarePipeline;

    async fn send(middleware: impl Middleware + 'static, method: Method, path: &'static str) -> RymResponse {
        MiddlewarePipeline::new()
            .add(middleware)
            .execute(
                RymRequest::new(method, Uri::from_static(path), HeaderMap::new()),
                |_| async { RymResponse::text("next") },
            )
            .await
    }

    fn swagger() -> SwaggerMiddleware {
        let spec = OpenApiSpec::new(ApiInfo::new("Lubricentro", "v1"));
        SwaggerMiddleware::new(&SwaggerOptions::default(), &[("v1".to_string(), spec)]).unwrap()
    }

    #[tokio::test]
    async fn test_serves_json_and_yaml() {
        let response = send(swagger(), Method::GET, "/swagger/v1/swagger.json").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.header_str("content-type"), Some("application/json; charset=utf-8"));
        let body: serde_json::Value = serde_json::from_slice(response.body_bytes()).unwrap();
        assert_eq!(body["info"]["title"], "Lubricentro");

        let response = send(swagger(), Method::GET, "/swagger/v1/swagger.yaml").await;
        assert!(String::from_utf8_lossy(response.body_bytes()).contains("title: Lubricentro"));

        let response = send(swagger(), Method::HEAD, "/swagger/v1/swagger.json").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert!(response.body_bytes().is_empty());
    }

    #[tokio::test]
    async fn test_other_requests_fall_through() {
        let response = send(swagger(), Method::GET, "/swagger/v2/swagger.json").await;
        assert_eq!(response.body_bytes().as_ref(), b"next");

        let response = send(swagger(), Method::POST, "/swagger/v1/swagger.json").await;
        assert_eq!(response.body_bytes().as_ref(), b"next");
    }

    #[tokio::test]
    async fn test_ui_paths() {
        let endpoints = vec![("/swagger/v1/swagger.json".to_string(), "RyM v1".to_string())];
        let ui = || SwaggerUiMiddleware::new(&SwaggerUiOptions::default(), &endpoints);

        for path in ["/swagger", "/swagger/", "/swagger/index.html"] {
            let response = send(ui(), Method::GET, path).await;
            assert_eq!(response.status_code(), StatusCode::OK, "{}", path);
            let html = String::from_utf8_lossy(response.body_bytes()).to_string();
            assert!(html.contains("SwaggerUIBundle"));
            assert!(html.contains(r#""url":"/swagger/v1/swagger.json""#));
        }

        let response = send(ui(), Method::GET, "/swagger/other").await;
        assert_eq!(response.body_bytes().as_ref(), b"next");
    }

    #[test]
    fn test_title_is_escaped() {
        let html = render_index("<RyM & Co>", &[]);
        assert!(html.contains("<title>&lt;RyM &amp; Co&gt;</title>"));
    }
}
