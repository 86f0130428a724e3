//! Tests for `WsManager` without HTTP upgrades: subscription authorization,
//! destination-scoped delivery, and shutdown.

use std::sync::Arc;

use assert_matches::assert_matches;
use axum::extract::ws::Message;
use hazard_api::ws::protocol::ServerFrame;
use hazard_api::ws::{SubscribeError, WsManager};
use hazard_core::identity::SessionIdentity;
use hazard_core::topics::{Destination, DestinationError, SubscriptionDenied};
use hazard_events::Transport;

fn user(email: &str) -> Arc<SessionIdentity> {
    Arc::new(SessionIdentity::new(email, vec!["USER".to_string()]))
}

fn admin(email: &str) -> Arc<SessionIdentity> {
    Arc::new(SessionIdentity::new(
        email,
        vec!["ADMIN".to_string(), "USER".to_string()],
    ))
}

fn frame_of(message: Message) -> ServerFrame {
    match message {
        Message::Text(text) => serde_json::from_str(text.as_str()).expect("server frame"),
        other => panic!("expected text frame, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test: connection bookkeeping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_and_remove_track_connection_count() {
    let manager = WsManager::new();
    assert_eq!(manager.connection_count().await, 0);

    let _rx = manager.add("conn-1".to_string(), user("a@example.com")).await;
    assert_eq!(manager.connection_count().await, 1);

    manager.remove("nonexistent").await;
    assert_eq!(manager.connection_count().await, 1);

    manager.remove("conn-1").await;
    assert_eq!(manager.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: subscription authorization
// ---------------------------------------------------------------------------

#[tokio::test]
async fn user_cannot_subscribe_to_admin_or_foreign_topics() {
    let manager = WsManager::new();
    let _rx = manager.add("conn-1".to_string(), user("a@example.com")).await;

    assert_matches!(
        manager.subscribe("conn-1", Some("/topic/role/admin/alerts/BENGALURU")).await,
        Err(SubscribeError::Denied(SubscriptionDenied::MissingRole(_)))
    );
    assert_matches!(
        manager.subscribe("conn-1", Some("/topic/user/b@example.com")).await,
        Err(SubscribeError::Denied(SubscriptionDenied::ForeignUserTopic))
    );
    assert_matches!(
        manager.subscribe("conn-1", None).await,
        Err(SubscribeError::Destination(DestinationError::Missing))
    );
    assert_matches!(
        manager.subscribe("conn-1", Some("/queue/anything")).await,
        Err(SubscribeError::Destination(DestinationError::Unsupported(_)))
    );
    assert_eq!(manager.subscription_count("conn-1").await, 0);

    // The connection is still usable after refusals.
    manager.subscribe("conn-1", Some("/topic/user/a@example.com")).await.unwrap();
    manager.subscribe("conn-1", Some("/topic/global")).await.unwrap();
    assert_eq!(manager.subscription_count("conn-1").await, 2);
}

#[tokio::test]
async fn admin_may_subscribe_to_partitioned_admin_topic() {
    let manager = WsManager::new();
    let _rx = manager.add("conn-1".to_string(), admin("ops@example.com")).await;

    let destination = manager
        .subscribe("conn-1", Some("/topic/role/admin/alerts/BENGALURU"))
        .await
        .unwrap();
    assert_eq!(destination, Destination::role("ADMIN", Some("Bengaluru")));
}

#[tokio::test]
async fn subscribe_on_unknown_connection_fails() {
    let manager = WsManager::new();
    assert_matches!(
        manager.subscribe("ghost", Some("/topic/global")).await,
        Err(SubscribeError::UnknownConnection)
    );
}

// ---------------------------------------------------------------------------
// Test: delivery is scoped to subscribed destinations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn publish_reaches_only_subscribed_connections() {
    let manager = WsManager::new();
    let mut admin_rx = manager.add("admin".to_string(), admin("ops@example.com")).await;
    let mut user_rx = manager.add("user".to_string(), user("a@example.com")).await;

    manager.subscribe("admin", Some("/topic/role/admin/alerts/BENGALURU")).await.unwrap();
    manager.subscribe("user", Some("/topic/global")).await.unwrap();

    let admin_dest = Destination::role("ADMIN", Some("Bengaluru"));
    let delivered = manager.publish(&admin_dest, "{\"id\":1}").await.unwrap();
    assert_eq!(delivered, 1);

    let delivered = manager.publish(&Destination::Global, "storm inbound").await.unwrap();
    assert_eq!(delivered, 1);

    let ServerFrame::Message { destination, body, .. } = frame_of(admin_rx.recv().await.unwrap());
    assert_eq!(destination, "/topic/role/admin/alerts/BENGALURU");
    assert_eq!(body, "{\"id\":1}");

    let ServerFrame::Message { destination, body, .. } = frame_of(user_rx.recv().await.unwrap());
    assert_eq!(destination, "/topic/global");
    assert_eq!(body, "storm inbound");

    assert!(admin_rx.try_recv().is_err());
    assert!(user_rx.try_recv().is_err());
}

#[tokio::test]
async fn unsubscribe_stops_delivery() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".to_string(), user("a@example.com")).await;
    manager.subscribe("conn-1", Some("/topic/global")).await.unwrap();

    assert!(manager.unsubscribe("conn-1", Some("/topic/global")).await);
    assert!(!manager.unsubscribe("conn-1", Some("/topic/global")).await);

    assert_eq!(manager.publish(&Destination::Global, "x").await.unwrap(), 0);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn closed_receiver_is_not_counted_as_delivered() {
    let manager = WsManager::new();
    let rx = manager.add("conn-1".to_string(), user("a@example.com")).await;
    manager.subscribe("conn-1", Some("/topic/global")).await.unwrap();
    drop(rx);

    assert_eq!(manager.publish(&Destination::Global, "x").await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Test: shutdown_all sends Close frames and clears connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();
    let mut rx1 = manager.add("conn-1".to_string(), user("a@example.com")).await;
    let mut rx2 = manager.add("conn-2".to_string(), admin("ops@example.com")).await;

    manager.shutdown_all().await;

    assert_eq!(manager.connection_count().await, 0);
    assert_matches!(rx1.recv().await, Some(Message::Close(None)));
    assert_matches!(rx2.recv().await, Some(Message::Close(None)));
}
