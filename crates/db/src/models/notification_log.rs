//! `notification_logs` rows.

use sqlx::FromRow;

use hazard_core::error::CoreError;
use hazard_core::notification::NotificationLogEntry;
use hazard_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow)]
pub struct NotificationLogRow {
    pub id: DbId,
    pub recipient: Option<String>,
    pub notification_type: String,
    pub channel: String,
    pub message: String,
    pub sent: bool,
    pub error: Option<String>,
    pub created_at: Timestamp,
}

impl TryFrom<NotificationLogRow> for NotificationLogEntry {
    type Error = CoreError;

    fn try_from(row: NotificationLogRow) -> Result<Self, Self::Error> {
        Ok(NotificationLogEntry {
            id: row.id,
            recipient: row.recipient,
            notification_type: row.notification_type.parse()?,
            channel: row.channel,
            message: row.message,
            sent: row.sent,
            error: row.error,
            created_at: row.created_at,
        })
    }
}
