//! Collaborator contracts for persistence and the subscriber registry.
//!
//! The pipeline, gateway, and API are written against these traits and
//! receive implementations at construction. `hazard-db` provides the
//! PostgreSQL implementation; [`crate::memory::MemoryStore`] backs tests and
//! local runs without a database.
//!
//! Every write is a single insert except [`AlertStore::acknowledge`], which
//! updates one row by id. Implementations must tolerate concurrent writers.

use async_trait::async_trait;

use crate::alert::{AlertEvent, AlertFilter, NewAlertEvent, NewSubscriberAlert, PerSubscriberAlert};
use crate::error::CoreError;
use crate::escalation::{EmergencyRequest, NewEmergencyRequest};
use crate::notification::{NewNotificationLog, NotificationLogEntry, NotificationType};
use crate::subscriber::SubscriberRecord;
use crate::types::{DbId, Timestamp};

/// Persisted alert events.
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Persist a new event; the store assigns id and `created_at`.
    async fn insert(&self, alert: NewAlertEvent) -> Result<AlertEvent, CoreError>;

    async fn find(&self, id: DbId) -> Result<Option<AlertEvent>, CoreError>;

    /// Set `acknowledged = true`. Returns `NotFound` for an unknown id.
    async fn acknowledge(&self, id: DbId) -> Result<AlertEvent, CoreError>;

    /// Most recent events first.
    async fn latest(&self, limit: i64) -> Result<Vec<AlertEvent>, CoreError>;

    /// Events created at or after `since`, most recent first.
    async fn created_since(&self, since: Timestamp) -> Result<Vec<AlertEvent>, CoreError>;

    /// Every event, most recent first.
    async fn all(&self) -> Result<Vec<AlertEvent>, CoreError>;

    /// Filtered page, most recent first.
    async fn list(
        &self,
        filter: &AlertFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AlertEvent>, CoreError>;
}

/// Append-only per-subscriber alert copies.
#[async_trait]
pub trait SubscriberAlertStore: Send + Sync {
    async fn insert(&self, alert: NewSubscriberAlert) -> Result<PerSubscriberAlert, CoreError>;

    /// Most recent first.
    async fn list_for(&self, email: &str) -> Result<Vec<PerSubscriberAlert>, CoreError>;
}

#[async_trait]
pub trait EmergencyRequestStore: Send + Sync {
    async fn create(&self, request: NewEmergencyRequest) -> Result<EmergencyRequest, CoreError>;

    /// Auto-generated requests for `email` created strictly after `since`.
    async fn count_auto_since(&self, email: &str, since: Timestamp) -> Result<u64, CoreError>;
}

/// Append-only notification audit log.
#[async_trait]
pub trait NotificationLogStore: Send + Sync {
    async fn append(&self, entry: NewNotificationLog) -> Result<NotificationLogEntry, CoreError>;

    /// Most recent first.
    async fn list(&self, limit: i64) -> Result<Vec<NotificationLogEntry>, CoreError>;

    async fn list_by_type(
        &self,
        notification_type: NotificationType,
    ) -> Result<Vec<NotificationLogEntry>, CoreError>;

    async fn list_by_recipient(
        &self,
        recipient: &str,
    ) -> Result<Vec<NotificationLogEntry>, CoreError>;
}

/// Read-only view of the external user registry.
#[async_trait]
pub trait SubscriberRegistry: Send + Sync {
    /// Subscribers that have both latitude and longitude set.
    async fn list_with_coordinates(&self) -> Result<Vec<SubscriberRecord>, CoreError>;
}
