//! In-process implementation of every store trait.
//!
//! Used by the test suites and for running the API without PostgreSQL.
//! All tables sit behind one mutex, so each call is atomic.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::alert::{AlertEvent, AlertFilter, NewAlertEvent, NewSubscriberAlert, PerSubscriberAlert};
use crate::error::CoreError;
use crate::escalation::{EmergencyRequest, NewEmergencyRequest};
use crate::notification::{NewNotificationLog, NotificationLogEntry, NotificationType};
use crate::store::{
    AlertStore, EmergencyRequestStore, NotificationLogStore, SubscriberAlertStore,
    SubscriberRegistry,
};
use crate::subscriber::SubscriberRecord;
use crate::types::{DbId, Timestamp};

#[derive(Default)]
struct Tables {
    next_id: DbId,
    alerts: Vec<AlertEvent>,
    subscriber_alerts: Vec<PerSubscriberAlert>,
    emergency_requests: Vec<EmergencyRequest>,
    notification_logs: Vec<NotificationLogEntry>,
    subscribers: Vec<SubscriberRecord>,
}

impl Tables {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }
}

/// Rows are kept in insertion order; "most recent first" reads walk them
/// backwards.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subscribers(subscribers: Vec<SubscriberRecord>) -> Self {
        Self {
            tables: Mutex::new(Tables {
                subscribers,
                ..Default::default()
            }),
        }
    }

    pub async fn add_subscriber(&self, subscriber: SubscriberRecord) {
        self.tables.lock().await.subscribers.push(subscriber);
    }

    // -- inspection helpers --------------------------------------------------

    pub async fn alert_count(&self) -> usize {
        self.tables.lock().await.alerts.len()
    }

    pub async fn subscriber_alert_count(&self) -> usize {
        self.tables.lock().await.subscriber_alerts.len()
    }

    pub async fn emergency_requests(&self) -> Vec<EmergencyRequest> {
        self.tables.lock().await.emergency_requests.clone()
    }

    pub async fn notification_logs(&self) -> Vec<NotificationLogEntry> {
        self.tables.lock().await.notification_logs.clone()
    }
}

fn newest_first<T: Clone>(rows: &[T]) -> Vec<T> {
    rows.iter().rev().cloned().collect()
}

#[async_trait]
impl AlertStore for MemoryStore {
    async fn insert(&self, alert: NewAlertEvent) -> Result<AlertEvent, CoreError> {
        alert.validate()?;
        let mut tables = self.tables.lock().await;
        let event = AlertEvent {
            id: tables.next_id(),
            category: alert.category,
            severity: alert.severity,
            location: alert.location,
            latitude: alert.latitude,
            longitude: alert.longitude,
            message: alert.message,
            source: alert.source,
            acknowledged: false,
            created_at: Utc::now(),
        };
        tables.alerts.push(event.clone());
        Ok(event)
    }

    async fn find(&self, id: DbId) -> Result<Option<AlertEvent>, CoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.alerts.iter().find(|a| a.id == id).cloned())
    }

    async fn acknowledge(&self, id: DbId) -> Result<AlertEvent, CoreError> {
        let mut tables = self.tables.lock().await;
        let alert = tables
            .alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(CoreError::NotFound {
                entity: "AlertEvent",
                id,
            })?;
        alert.acknowledged = true;
        Ok(alert.clone())
    }

    async fn latest(&self, limit: i64) -> Result<Vec<AlertEvent>, CoreError> {
        let tables = self.tables.lock().await;
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        Ok(tables.alerts.iter().rev().take(limit).cloned().collect())
    }

    async fn created_since(&self, since: Timestamp) -> Result<Vec<AlertEvent>, CoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .alerts
            .iter()
            .rev()
            .filter(|a| a.created_at >= since)
            .cloned()
            .collect())
    }

    async fn all(&self) -> Result<Vec<AlertEvent>, CoreError> {
        Ok(newest_first(&self.tables.lock().await.alerts))
    }

    async fn list(
        &self,
        filter: &AlertFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AlertEvent>, CoreError> {
        let tables = self.tables.lock().await;
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        let offset = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        Ok(tables
            .alerts
            .iter()
            .rev()
            .filter(|a| filter.matches(a))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SubscriberAlertStore for MemoryStore {
    async fn insert(&self, alert: NewSubscriberAlert) -> Result<PerSubscriberAlert, CoreError> {
        let mut tables = self.tables.lock().await;
        let row = PerSubscriberAlert {
            id: tables.next_id(),
            subscriber_email: alert.subscriber_email,
            alert_message: alert.alert_message,
            category: alert.category,
            severity: alert.severity,
            created_at: Utc::now(),
        };
        tables.subscriber_alerts.push(row.clone());
        Ok(row)
    }

    async fn list_for(&self, email: &str) -> Result<Vec<PerSubscriberAlert>, CoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .subscriber_alerts
            .iter()
            .rev()
            .filter(|a| a.subscriber_email == email)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EmergencyRequestStore for MemoryStore {
    async fn create(&self, request: NewEmergencyRequest) -> Result<EmergencyRequest, CoreError> {
        let mut tables = self.tables.lock().await;
        let row = EmergencyRequest {
            id: tables.next_id(),
            email: request.email,
            latitude: request.latitude,
            longitude: request.longitude,
            message: request.message,
            category: request.category,
            status: request.status,
            auto_generated: request.auto_generated,
            created_at: request.requested_at,
        };
        tables.emergency_requests.push(row.clone());
        Ok(row)
    }

    async fn count_auto_since(&self, email: &str, since: Timestamp) -> Result<u64, CoreError> {
        let tables = self.tables.lock().await;
        let count = tables
            .emergency_requests
            .iter()
            .filter(|r| r.auto_generated && r.email == email && r.created_at > since)
            .count();
        Ok(count as u64)
    }
}

#[async_trait]
impl NotificationLogStore for MemoryStore {
    async fn append(&self, entry: NewNotificationLog) -> Result<NotificationLogEntry, CoreError> {
        let mut tables = self.tables.lock().await;
        let row = NotificationLogEntry {
            id: tables.next_id(),
            recipient: entry.recipient,
            notification_type: entry.notification_type,
            channel: entry.channel,
            message: entry.message,
            sent: entry.sent,
            error: entry.error,
            created_at: Utc::now(),
        };
        tables.notification_logs.push(row.clone());
        Ok(row)
    }

    async fn list(&self, limit: i64) -> Result<Vec<NotificationLogEntry>, CoreError> {
        let tables = self.tables.lock().await;
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        Ok(tables.notification_logs.iter().rev().take(limit).cloned().collect())
    }

    async fn list_by_type(
        &self,
        notification_type: NotificationType,
    ) -> Result<Vec<NotificationLogEntry>, CoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .notification_logs
            .iter()
            .rev()
            .filter(|e| e.notification_type == notification_type)
            .cloned()
            .collect())
    }

    async fn list_by_recipient(
        &self,
        recipient: &str,
    ) -> Result<Vec<NotificationLogEntry>, CoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .notification_logs
            .iter()
            .rev()
            .filter(|e| e.recipient.as_deref() == Some(recipient))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SubscriberRegistry for MemoryStore {
    async fn list_with_coordinates(&self) -> Result<Vec<SubscriberRecord>, CoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .subscribers
            .iter()
            .filter(|s| s.location.is_some())
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
