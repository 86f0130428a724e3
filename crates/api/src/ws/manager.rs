use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::ws::Message;
use tokio::sync::{mpsc, RwLock};

use hazard_core::identity::SessionIdentity;
use hazard_core::topics::{authorize_subscription, Destination, DestinationError, SubscriptionDenied};
use hazard_core::types::Timestamp;
use hazard_events::{DeliveryError, Transport};

use crate::ws::protocol::ServerFrame;

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// State owned by one connection.
pub struct WsConnection {
    /// Identity resolved at handshake; never changes afterwards.
    pub identity: Arc<SessionIdentity>,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// Destinations this connection was admitted to.
    pub subscriptions: HashSet<Destination>,
    pub connected_at: Timestamp,
}

/// Why a subscribe request was not admitted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubscribeError {
    #[error("unknown connection")]
    UnknownConnection,

    #[error(transparent)]
    Destination(#[from] DestinationError),

    #[error(transparent)]
    Denied(#[from] SubscriptionDenied),
}

/// Manages all active WebSocket connections and their subscriptions.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    /// Create a new, empty connection manager.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register an authenticated connection.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(
        &self,
        conn_id: String,
        identity: Arc<SessionIdentity>,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            identity,
            sender: tx,
            subscriptions: HashSet::new(),
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Remove a connection by its ID.
    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
    }

    /// Parse and authorize `raw` against the connection's identity, then
    /// admit the subscription. Runs on every subscribe attempt.
    pub async fn subscribe(
        &self,
        conn_id: &str,
        raw: Option<&str>,
    ) -> Result<Destination, SubscribeError> {
        let destination = Destination::parse(raw)?;

        let mut conns = self.connections.write().await;
        let conn = conns
            .get_mut(conn_id)
            .ok_or(SubscribeError::UnknownConnection)?;
        authorize_subscription(&conn.identity, &destination)?;
        conn.subscriptions.insert(destination.clone());
        Ok(destination)
    }

    /// Drop a subscription. Returns whether it existed.
    pub async fn unsubscribe(&self, conn_id: &str, raw: Option<&str>) -> bool {
        let Ok(destination) = Destination::parse(raw) else {
            return false;
        };
        self.connections
            .write()
            .await
            .get_mut(conn_id)
            .is_some_and(|conn| conn.subscriptions.remove(&destination))
    }

    /// Number of destinations the connection is subscribed to.
    pub async fn subscription_count(&self, conn_id: &str) -> usize {
        self.connections
            .read()
            .await
            .get(conn_id)
            .map_or(0, |conn| conn.subscriptions.len())
    }

    /// Number of connections subscribed to `destination`.
    pub async fn subscriber_count(&self, destination: &Destination) -> usize {
        self.connections
            .read()
            .await
            .values()
            .filter(|conn| conn.subscriptions.contains(destination))
            .count()
    }

    /// Send `body` to every connection subscribed to `destination`.
    ///
    /// Returns the number of connections the frame was handed to.
    /// Connections whose channels are closed are skipped; they are cleaned
    /// up when their receive loop ends.
    pub async fn deliver(
        &self,
        destination: &Destination,
        body: &str,
    ) -> Result<usize, serde_json::Error> {
        let frame = ServerFrame::Message {
            destination: destination.path(),
            body: body.to_string(),
            timestamp: chrono::Utc::now(),
        };
        let text = serde_json::to_string(&frame)?;

        let conns = self.connections.read().await;
        let delivered = conns
            .values()
            .filter(|conn| conn.subscriptions.contains(destination))
            .filter(|conn| conn.sender.send(Message::Text(text.clone().into())).is_ok())
            .count();
        Ok(delivered)
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a Close frame to every connection, then clear the map.
    ///
    /// Used during graceful shutdown.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for WsManager {
    async fn publish(&self, destination: &Destination, body: &str) -> Result<usize, DeliveryError> {
        let delivered = self
            .deliver(destination, body)
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        tracing::debug!(destination = %destination, delivered, "Published to WebSocket subscribers");
        Ok(delivered)
    }
}
