//! Serves files below the web root for GET and HEAD requests.
//!
//! Anything the file service cannot satisfy falls through to the next stage
//! untouched.

use std::path::{Path, PathBuf};

use axum::http::{Method, StatusCode};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use super::pipeline::{Middleware, Next, NextFuture};
use crate::request::RymRequest;
use crate::response::RymResponse;

#[derive(Debug, Clone)]
pub struct StaticFilesMiddleware {
    root: PathBuf,
    service: Option<ServeDir>,
}

impl StaticFilesMiddleware {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let service = if root.is_dir() {
            Some(ServeDir::new(&root))
        } else {
            tracing::debug!(root = %root.display(), "Web root not found, static files disabled");
            None
        };
        Self { root, service }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_enabled(&self) -> bool {
        self.service.is_some()
    }
}

impl Middleware for StaticFilesMiddleware {
    fn handle(&self, request: RymRequest, next: Next) -> NextFuture<'static> {
        let service = match &self.service {
            Some(service) if request.method == Method::GET || request.method == Method::HEAD => {
                service.clone()
            }
            _ => return Box::pin(async move { next.run(request).await }),
        };

        Box::pin(async move {
            let response = match service.oneshot(request.to_head_request()).await {
                Ok(response) => response,
                Err(never) => match never {},
            };

            if matches!(
                response.status(),
                StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED
            ) {
                return next.run(request).await;
            }

            match RymResponse::from_http(response).await {
                Ok(response) => response,
                Err(error) => error.into_response(),
            }
        })
    }

    fn name(&self) -> &'static str {
        "StaticFiles"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::MiddlewarePipeline;
    use axum::http::{HeaderMap, Uri};

    fn web_root() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("logo.txt"), "RyM").unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs").join("index.html"), "<h1>Docs</h1>").unwrap();
        dir
    }

    async fn send(root: &Path, method: Method, path: &'static str) -> RymResponse {
        MiddlewarePipeline::new()
            .add(StaticFilesMiddleware::new(root))
            .execute(
                RymRequest::new(method, Uri::from_static(path), HeaderMap::new()),
                |_| async { RymResponse::text("fallthrough") },
            )
            .await
    }

    #[tokio::test]
    async fn test_serves_existing_file() {
        let root = web_root();
        let response = send(root.path(), Method::GET, "/logo.txt").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.body_bytes().as_ref(), b"RyM");
    }

    #[tokio::test]
    async fn test_serves_directory_index() {
        let root = web_root();
        let response = send(root.path(), Method::GET, "/docs/").await;
        assert_eq!(response.body_bytes().as_ref(), b"<h1>Docs</h1>");
    }

    #[tokio::test]
    async fn test_missing_file_falls_through() {
        let root = web_root();
        let response = send(root.path(), Method::GET, "/api/status").await;
        assert_eq!(response.body_bytes().as_ref(), b"fallthrough");
    }

    #[tokio::test]
    async fn test_other_methods_fall_through() {
        let root = web_root();
        let response = send(root.path(), Method::POST, "/logo.txt").await;
        assert_eq!(response.body_bytes().as_ref(), b"fallthrough");
    }

    #[tokio::test]
    async fn test_missing_root_disables_stage() {
        let middleware = StaticFilesMiddleware::new("/definitely/not/a/web/root");
        assert!(!middleware.is_enabled());
        let response = send(Path::new("/definitely/not/a/web/root"), Method::GET, "/logo.txt").await;
        assert_eq!(response.body_bytes().as_ref(), b"fallthrough");
    }
}
