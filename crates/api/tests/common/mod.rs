#![allow(dead_code)]

use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use hazard_api::auth::jwt::{generate_access_token, JwtConfig};
use hazard_api::config::{MonitorConfig, ServerConfig};
use hazard_api::router::build_app_router;
use hazard_api::state::AppState;
use hazard_core::geo::GeoPoint;
use hazard_core::memory::MemoryStore;
use hazard_core::subscriber::SubscriberRecord;
use hazard_core::telemetry::TelemetrySample;
use hazard_pipeline::{TelemetryError, TelemetryProvider};

pub const ADMIN_EMAIL: &str = "ops@example.com";
pub const USER_EMAIL: &str = "asha@example.com";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        delivery_timeout_secs: 2,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 15,
        },
        monitor: MonitorConfig::default(),
    }
}

/// Returns the same sample on every fetch; `None` makes every fetch fail.
pub struct StaticTelemetry(pub Option<TelemetrySample>);

#[async_trait]
impl TelemetryProvider for StaticTelemetry {
    async fn fetch(&self, _: GeoPoint) -> Result<TelemetrySample, TelemetryError> {
        self.0
            .clone()
            .ok_or(TelemetryError::NotConfigured("no telemetry in tests"))
    }
}

/// Telemetry that satisfies the flood rule.
pub fn flood_sample() -> TelemetrySample {
    TelemetrySample {
        temperature: Some(301.0),
        humidity: Some(90.0),
        wind_speed: Some(3.0),
        pressure: Some(995.0),
        condition: Some("Rain".into()),
        description: Some("moderate rain".into()),
    }
}

pub fn subscriber(email: &str, latitude: f64, longitude: f64) -> SubscriberRecord {
    SubscriberRecord {
        email: email.into(),
        location: Some(GeoPoint::new(latitude, longitude)),
        roles: BTreeSet::from(["USER".to_string()]),
        push_token: None,
    }
}

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub router: Router,
}

/// Application over a fresh in-memory store.
pub fn build_test_app(telemetry: Option<TelemetrySample>) -> TestApp {
    build_test_app_with(Arc::new(MemoryStore::new()), telemetry)
}

pub fn build_test_app_with(store: Arc<MemoryStore>, telemetry: Option<TelemetrySample>) -> TestApp {
    let state = AppState::build(
        test_config(),
        store.clone(),
        Arc::new(StaticTelemetry(telemetry)),
        None,
    );
    let router = build_app_router(state.clone());
    TestApp {
        state,
        store,
        router,
    }
}

pub fn token(email: &str, roles: &[&str]) -> String {
    generate_access_token(email, roles, &test_config().jwt).expect("token generation")
}

pub fn admin_token() -> String {
    token(ADMIN_EMAIL, &["ADMIN", "USER"])
}

pub fn user_token() -> String {
    token(USER_EMAIL, &["USER"])
}

/// Send one request through the router.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    bearer: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    app.clone().oneshot(request).await.expect("router response")
}

pub async fn get(app: &Router, uri: &str, bearer: Option<&str>) -> Response<Body> {
    send(app, Method::GET, uri, bearer, None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

/// Serve the router on an ephemeral port; returns the bound address.
pub async fn spawn_server(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server");
    });
    addr
}
