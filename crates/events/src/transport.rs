//! Transport seam between the gateway and live connections.

use async_trait::async_trait;

use hazard_core::topics::Destination;

/// Error type for a single delivery attempt.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The send did not finish within the configured bound.
    #[error("delivery timed out after {0} ms")]
    Timeout(u128),

    /// The transport is shutting down and no longer accepts frames.
    #[error("transport closed")]
    Closed,

    #[error("transport error: {0}")]
    Transport(String),
}

/// Pushes a message to every connection subscribed to a destination.
///
/// Implementations decide who is subscribed; the gateway never inspects
/// connections. Zero subscribers is a successful delivery.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Returns the number of connections the frame was queued for.
    async fn publish(&self, destination: &Destination, body: &str) -> Result<usize, DeliveryError>;
}
