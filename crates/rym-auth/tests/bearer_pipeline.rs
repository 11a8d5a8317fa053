use std::sync::Arc;

use jsonwebtoken::{encode, EncodingKey, Header};
use rym_auth::{AuthApplicationBuilderExt, AuthServiceCollectionExt, JwtSettings};
use rym_core::ServiceCollection;
use rym_http::http::{HeaderMap, Method, StatusCode, Uri};
use rym_http::{
    Application, ApplicationBuilder, Controller, ControllerRegistry, HttpServiceCollectionExt, RouteDefinition,
    RymRequest,
};
use serde_json::{json, Value};

const KEY: &str = "una-clave-secreta-de-prueba-de-32-bytes";

struct Vehicles;

impl Controller for Vehicles {
    fn name(&self) -> &'static str {
        "Vehicles"
    }

    fn base_path(&self) -> &str {
        "/api/vehicles"
    }

    fn authorization(&self) -> rym_http::AuthorizationRequirement {
        rym_http::AuthorizationRequirement::Authenticated
    }

    fn routes(self: Arc<Self>) -> Vec<RouteDefinition> {
        vec![
            RouteDefinition::get("", |context, _| async move {
                let owner = context.user().map(|user| user.subject.clone());
                context.ok(&json!({ "owner": owner }))
            }),
            RouteDefinition::get("count", |context, _| async move { context.ok(&json!({ "total": 3 })) })
                .allow_anonymous(),
        ]
    }
}

fn application() -> Application {
    let mut services = ServiceCollection::new();
    services.add_controllers(ControllerRegistry::new().with(Vehicles));
    services.add_jwt_bearer(JwtSettings::new(KEY).with_issuer("RyM"));

    let mut app = ApplicationBuilder::new(Arc::new(services.build()));
    app.use_routing().unwrap();
    app.use_authentication().unwrap();
    app.use_authorization().unwrap();
    app.use_endpoints(|endpoints| {
        endpoints.map_controllers();
    })
    .unwrap();
    app.build().unwrap()
}

fn get(path: &'static str, token: Option<&str>) -> RymRequest {
    let request = RymRequest::new(Method::GET, Uri::from_static(path), HeaderMap::new());
    match token {
        Some(token) => request.with_header("authorization", &format!("Bearer {}", token)),
        None => request,
    }
}

fn token(issuer: &str) -> String {
    let claims = json!({
        "sub": "15",
        "iss": issuer,
        "exp": chrono::Utc::now().timestamp() + 600,
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(KEY.as_bytes())).unwrap()
}

#[tokio::test]
async fn anonymous_caller_is_challenged() {
    let response = application().handle(get("/api/vehicles", None)).await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.header_str("www-authenticate"), Some("Bearer"));
    let body: Value = serde_json::from_slice(response.body_bytes()).unwrap();
    assert_eq!(body["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn valid_token_reaches_handler() {
    let response = application().handle(get("/api/vehicles", Some(&token("RyM")))).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = serde_json::from_slice(response.body_bytes()).unwrap();
    assert_eq!(body["owner"], "15");
}

#[tokio::test]
async fn invalid_token_is_reported() {
    let response = application().handle(get("/api/vehicles", Some(&token("Otro")))).await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let challenge = response.header_str("www-authenticate").unwrap();
    assert!(challenge.starts_with("Bearer error=\"invalid_token\""));
}

#[tokio::test]
async fn anonymous_route_ignores_bad_token() {
    let response = application()
        .handle(get("/api/vehicles/count", Some("garbage")))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}
