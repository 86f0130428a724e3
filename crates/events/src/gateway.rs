//! Notification gateway: the sole write path into the pub/sub surface.
//!
//! Every delivery attempt is bounded by `delivery_timeout` and produces
//! exactly one notification log entry. Failures are recorded and swallowed;
//! nothing here returns an error to the caller. The single exception is a
//! subscriber notification with an empty email, which is skipped without a
//! log entry.

use std::sync::Arc;
use std::time::Duration;

use hazard_core::notification::{NewNotificationLog, NotificationType};
use hazard_core::store::NotificationLogStore;
use hazard_core::topics::Destination;

use crate::transport::{DeliveryError, Transport};

/// Default bound for a single send.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of one delivery operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Queued for this many subscribed connections (possibly zero).
    Delivered(usize),
    /// The send failed or timed out; the failure was logged.
    Failed,
    /// Nothing was attempted.
    Skipped,
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }
}

#[derive(Clone)]
pub struct NotificationGateway {
    transport: Arc<dyn Transport>,
    log: Arc<dyn NotificationLogStore>,
    delivery_timeout: Duration,
}

impl NotificationGateway {
    pub fn new(transport: Arc<dyn Transport>, log: Arc<dyn NotificationLogStore>) -> Self {
        Self {
            transport,
            log,
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
        }
    }

    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    /// Deliver `message` on the subscriber's own topic.
    ///
    /// An empty email is a no-op and is not logged.
    pub async fn notify_subscriber(&self, email: &str, message: &str) -> DeliveryOutcome {
        let email = email.trim();
        if email.is_empty() {
            tracing::debug!("Skipping subscriber notification with empty email");
            return DeliveryOutcome::Skipped;
        }
        self.deliver(
            Destination::user(email),
            Some(email.to_string()),
            NotificationType::User,
            message,
        )
        .await
    }

    /// Deliver `message` to holders of `role`, partitioned by `scope_key`.
    pub async fn notify_role(
        &self,
        role: &str,
        message: &str,
        scope_key: Option<&str>,
    ) -> DeliveryOutcome {
        self.deliver(
            Destination::role(role, scope_key),
            None,
            NotificationType::for_role(role),
            message,
        )
        .await
    }

    /// Deliver `message` on the global topic.
    pub async fn notify_broadcast(&self, message: &str) -> DeliveryOutcome {
        self.deliver(Destination::Global, None, NotificationType::Broadcast, message)
            .await
    }

    async fn deliver(
        &self,
        destination: Destination,
        recipient: Option<String>,
        notification_type: NotificationType,
        message: &str,
    ) -> DeliveryOutcome {
        let sent = tokio::time::timeout(
            self.delivery_timeout,
            self.transport.publish(&destination, message),
        )
        .await
        .unwrap_or_else(|_| Err(DeliveryError::Timeout(self.delivery_timeout.as_millis())));

        let (outcome, entry) = match sent {
            Ok(connections) => {
                tracing::debug!(%destination, connections, "Notification delivered");
                (
                    DeliveryOutcome::Delivered(connections),
                    NewNotificationLog::delivered(recipient, notification_type, message),
                )
            }
            Err(err) => {
                tracing::warn!(%destination, error = %err, "Notification delivery failed");
                (
                    DeliveryOutcome::Failed,
                    NewNotificationLog::failed(recipient, notification_type, message, err.to_string()),
                )
            }
        };

        if let Err(err) = self.log.append(entry).await {
            tracing::error!(%destination, error = %err, "Failed to write notification log");
        }

        outcome
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
