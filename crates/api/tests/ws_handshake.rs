//! End-to-end WebSocket tests over a bound listener: handshake
//! authentication, per-subscription authorization, and fan-out.

mod common;

use std::time::Duration;

use axum::http::{Method, StatusCode};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use hazard_api::ws::WsManager;
use hazard_core::topics::Destination;

use common::{admin_token, build_test_app, send, spawn_server, token, user_token, USER_EMAIL};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(addr: std::net::SocketAddr, token: &str) -> Client {
    let (ws, _) = connect_async(format!("ws://{addr}/api/v1/ws?token={token}"))
        .await
        .expect("handshake should succeed");
    ws
}

async fn subscribe(ws: &mut Client, destination: &str) {
    let frame = json!({ "type": "subscribe", "destination": destination });
    ws.send(Message::text(frame.to_string())).await.expect("send frame");
}

async fn wait_for_subscribers(manager: &WsManager, destination: &Destination, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while manager.subscriber_count(destination).await < count {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("subscriptions should be registered");
}

/// Next text frame as JSON, skipping control frames.
async fn next_frame(ws: &mut Client) -> Value {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let message = ws.next().await.expect("stream open").expect("frame");
            if let Ok(text) = message.to_text() {
                if message.is_text() {
                    return serde_json::from_str::<Value>(text).expect("json frame");
                }
            }
        }
    })
    .await
    .expect("frame should arrive")
}

async fn assert_silent(ws: &mut Client) {
    let next = tokio::time::timeout(Duration::from_millis(200), ws.next()).await;
    assert!(next.is_err(), "no further frame expected, got {next:?}");
}

fn status_of(error: WsError) -> StatusCode {
    match error {
        WsError::Http(response) => StatusCode::from_u16(response.status().as_u16()).unwrap(),
        other => panic!("expected an HTTP rejection, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test: handshake without a valid credential is refused
// ---------------------------------------------------------------------------

#[tokio::test]
async fn handshake_without_valid_token_is_refused() {
    let app = build_test_app(None);
    let addr = spawn_server(app.router.clone()).await;

    let missing = connect_async(format!("ws://{addr}/api/v1/ws")).await.unwrap_err();
    assert_eq!(status_of(missing), StatusCode::UNAUTHORIZED);

    let invalid = connect_async(format!("ws://{addr}/api/v1/ws?token=garbage"))
        .await
        .unwrap_err();
    assert_eq!(status_of(invalid), StatusCode::UNAUTHORIZED);

    assert_eq!(app.state.ws_manager.connection_count().await, 0);
}

#[tokio::test]
async fn websocket_endpoint_is_served_under_api_prefix() {
    let app = build_test_app(None);
    let addr = spawn_server(app.router.clone()).await;

    let root = connect_async(format!("ws://{addr}/ws?token={}", user_token()))
        .await
        .unwrap_err();
    assert_eq!(status_of(root), StatusCode::NOT_FOUND);

    let _ws = connect(addr, &user_token()).await;
    tokio::time::timeout(Duration::from_secs(5), async {
        while app.state.ws_manager.connection_count().await < 1 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("connection should be registered");
}

// ---------------------------------------------------------------------------
// Test: denied subscriptions are dropped, the connection keeps working
// ---------------------------------------------------------------------------

#[tokio::test]
async fn user_receives_broadcast_but_not_admin_traffic() {
    let app = build_test_app(None);
    let addr = spawn_server(app.router.clone()).await;
    let manager = app.state.ws_manager.clone();

    let mut user = connect(addr, &user_token()).await;
    subscribe(&mut user, "/topic/role/admin/alerts/CHENNAI").await;
    subscribe(&mut user, "/topic/user/someone-else@example.com").await;
    subscribe(&mut user, "").await;
    subscribe(&mut user, "/topic/global").await;
    wait_for_subscribers(&manager, &Destination::Global, 1).await;

    let mut admin = connect(addr, &admin_token()).await;
    subscribe(&mut admin, "/topic/role/admin/alerts/CHENNAI").await;
    subscribe(&mut admin, "/topic/global").await;
    wait_for_subscribers(&manager, &Destination::Global, 2).await;

    let admin_dest = Destination::role("ADMIN", Some("Chennai"));
    assert_eq!(manager.subscriber_count(&admin_dest).await, 1);

    let body = json!({
        "category": "STORM",
        "severity": "CRITICAL",
        "location": "Chennai",
        "latitude": 13.08,
        "longitude": 80.27,
        "message": "Cyclone landfall expected",
    });
    let response = send(&app.router, Method::POST, "/api/v1/admin/alerts", Some(&admin_token()), Some(body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let admin_first = next_frame(&mut admin).await;
    assert_eq!(admin_first["type"], "message");
    assert_eq!(admin_first["destination"], "/topic/role/admin/alerts/CHENNAI");
    let payload: Value = serde_json::from_str(admin_first["body"].as_str().unwrap()).unwrap();
    assert_eq!(payload["location"], "Chennai");
    assert_eq!(payload["source"], "MANUAL");

    let admin_second = next_frame(&mut admin).await;
    assert_eq!(admin_second["destination"], "/topic/global");

    let user_frame = next_frame(&mut user).await;
    assert_eq!(user_frame["destination"], "/topic/global");
    assert_eq!(user_frame["body"], "Cyclone landfall expected");
    assert_silent(&mut user).await;
}

// ---------------------------------------------------------------------------
// Test: subscriber-scoped delivery reaches only the owner
// ---------------------------------------------------------------------------

#[tokio::test]
async fn user_topic_is_delivered_to_its_owner_only() {
    let app = build_test_app(None);
    let addr = spawn_server(app.router.clone()).await;
    let manager = app.state.ws_manager.clone();
    let own_topic = Destination::user(USER_EMAIL);

    let mut owner = connect(addr, &user_token()).await;
    subscribe(&mut owner, &format!("/topic/user/{USER_EMAIL}")).await;
    wait_for_subscribers(&manager, &own_topic, 1).await;

    let mut other = connect(addr, &token("other@example.com", &["USER"])).await;
    subscribe(&mut other, &format!("/topic/user/{USER_EMAIL}")).await;
    subscribe(&mut other, "/topic/global").await;
    wait_for_subscribers(&manager, &Destination::Global, 1).await;
    assert_eq!(manager.subscriber_count(&own_topic).await, 1);

    let outcome = app.state.gateway.notify_subscriber(USER_EMAIL, "[HIGH] Flood risk").await;
    assert!(outcome.is_delivered());

    let frame = next_frame(&mut owner).await;
    assert_eq!(frame["destination"], format!("/topic/user/{USER_EMAIL}"));
    assert_eq!(frame["body"], "[HIGH] Flood risk");
    assert_silent(&mut other).await;
}

// ---------------------------------------------------------------------------
// Test: closing the socket unregisters the connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn closed_connection_is_removed() {
    let app = build_test_app(None);
    let addr = spawn_server(app.router.clone()).await;
    let manager = app.state.ws_manager.clone();

    let mut ws = connect(addr, &user_token()).await;
    tokio::time::timeout(Duration::from_secs(5), async {
        while manager.connection_count().await < 1 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("connection registered");

    ws.close(None).await.expect("close");
    tokio::time::timeout(Duration::from_secs(5), async {
        while manager.connection_count().await > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("connection removed");
}
