use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use jsonwebtoken::{encode, EncodingKey, Header};
use rym_api::host::build_application;
use rym_core::{Configuration, Environment};
use serde_json::{json, Value};
use tower::ServiceExt;

const KEY: &str = "una-clave-secreta-de-prueba-de-32-bytes";
const FRONTEND: &str = "http://localhost:3000";

fn router_with(environment: Environment, configure: impl FnOnce(rym_core::ConfigurationBuilder) -> rym_core::ConfigurationBuilder) -> Router {
    let configuration = configure(
        Configuration::builder()
            .set("jwt:key", KEY)
            .set("jwt:issuer", "RyM-Lubricentro"),
    )
    .build();
    build_application(Arc::new(configuration), &environment)
        .unwrap()
        .into_router()
}

fn router(environment: Environment) -> Router {
    router_with(environment, |builder| builder)
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn token(subject: &str, name: &str) -> String {
    let claims = json!({
        "sub": subject,
        "name": name,
        "role": ["Mecanico"],
        "iss": "RyM-Lubricentro",
        "exp": chrono::Utc::now().timestamp() + 600,
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(KEY.as_bytes())).unwrap()
}

#[tokio::test]
async fn development_serves_openapi_document() {
    let (status, headers, body) = send(router(Environment::Development), get("/swagger/v1/swagger.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/json; charset=utf-8");

    let document: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(document["info"]["title"], "RyM Lubricentro API");
    assert_eq!(document["info"]["version"], "v1");
    assert_eq!(document["info"]["contact"]["email"], "support@lubricentrorym.com");

    let bearer = &document["components"]["securitySchemes"]["Bearer"];
    assert_eq!(bearer["type"], "apiKey");
    assert_eq!(bearer["in"], "header");
    assert_eq!(bearer["name"], "Authorization");
    assert_eq!(bearer["bearerFormat"], "JWT");
    assert_eq!(document["security"], json!([{ "Bearer": [] }]));

    assert!(document["paths"]["/api/status"]["get"].is_object());
    assert_eq!(
        document["paths"]["/api/status/me"]["get"]["responses"]["401"]["description"],
        "Unauthorized"
    );

    let (status, _, body) = send(router(Environment::Development), get("/swagger/index.html")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8_lossy(&body).contains("/swagger/v1/swagger.json"));
}

#[tokio::test]
async fn documentation_is_absent_outside_development() {
    for environment in [Environment::Production, Environment::Staging, Environment::Testing] {
        for path in ["/swagger/v1/swagger.json", "/swagger", "/swagger/index.html"] {
            let (status, _, _) = send(router(environment.clone()), get(path)).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{} {}", environment, path);
        }
    }
}

#[tokio::test]
async fn preflight_from_frontend_is_allowed() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/status")
        .header(header::ORIGIN, FRONTEND)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization, content-type")
        .body(Body::empty())
        .unwrap();

    let (status, headers, _) = send(router(Environment::Production), request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], FRONTEND);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "authorization, content-type");
    assert_eq!(headers[header::VARY], "Origin");
}

#[tokio::test]
async fn actual_request_from_frontend_carries_cors_headers() {
    let request = Request::builder()
        .uri("/api/status")
        .header(header::ORIGIN, "https://bacosta30762.github.io")
        .body(Body::empty())
        .unwrap();

    let (status, headers, _) = send(router(Environment::Production), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://bacosta30762.github.io");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}

#[tokio::test]
async fn unknown_origin_is_rejected() {
    for method in [Method::GET, Method::OPTIONS] {
        let request = Request::builder()
            .method(method.clone())
            .uri("/api/status")
            .header(header::ORIGIN, "http://evil.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();

        let (status, headers, _) = send(router(Environment::Production), request).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", method);
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
    }
}

#[tokio::test]
async fn status_uses_json_conventions() {
    let (status, headers, body) = send(router(Environment::Production), get("/api/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("application/json"));

    let raw = String::from_utf8(body.clone()).unwrap();
    assert!(raw.contains("mecánica"), "{}", raw);
    assert!(raw.contains("Gestión"));
    assert!(!raw.contains("\\u00"));

    let status: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(status["status"], "ok");
    assert!(status.get("service_date").is_none());
    let date = status["serviceDate"].as_str().unwrap();
    assert_eq!(date.len(), 10);
    assert!(NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok());
}

#[tokio::test]
async fn protected_route_requires_token() {
    let (status, headers, body) = send(router(Environment::Production), get("/api/status/me")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers[header::WWW_AUTHENTICATE], "Bearer");

    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn protected_route_echoes_caller() {
    let request = Request::builder()
        .uri("/api/status/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", token("42", "Ana Pérez")))
        .body(Body::empty())
        .unwrap();

    let (status, _, body) = send(router(Environment::Production), request).await;
    assert_eq!(status, StatusCode::OK);

    let caller: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(caller["subject"], "42");
    assert_eq!(caller["displayName"], "Ana Pérez");
    assert_eq!(caller["roles"], json!(["Mecanico"]));
    assert_eq!(caller["authenticationType"], "Bearer");
    assert!(!caller["traceId"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn wrong_method_is_405() {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/status")
        .body(Body::empty())
        .unwrap();

    let (status, headers, _) = send(router(Environment::Production), request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert!(headers[header::ALLOW].to_str().unwrap().contains("GET"));
}

#[tokio::test]
async fn static_files_are_served_from_web_root() {
    let web_root = tempfile::tempdir().unwrap();
    std::fs::write(web_root.path().join("index.html"), "<h1>RyM</h1>").unwrap();
    let root = web_root.path().to_string_lossy().to_string();

    let router = router_with(Environment::Production, |builder| builder.set("server:web_root", root));
    let (status, _, body) = send(router.clone(), get("/index.html")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"<h1>RyM</h1>");

    let (status, _, _) = send(router, get("/api/status")).await;
    assert_eq!(status, StatusCode::OK);
}
