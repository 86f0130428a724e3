//! `alert_events` rows.

use sqlx::FromRow;

use hazard_core::alert::AlertEvent;
use hazard_core::error::CoreError;
use hazard_core::types::{DbId, Timestamp};

/// A row from the `alert_events` table.
#[derive(Debug, Clone, FromRow)]
pub struct AlertEventRow {
    pub id: DbId,
    pub category: String,
    pub severity: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub message: String,
    pub source: String,
    pub acknowledged: bool,
    pub created_at: Timestamp,
}

impl TryFrom<AlertEventRow> for AlertEvent {
    type Error = CoreError;

    fn try_from(row: AlertEventRow) -> Result<Self, Self::Error> {
        Ok(AlertEvent {
            id: row.id,
            category: row.category.parse()?,
            severity: row.severity.parse()?,
            location: row.location,
            latitude: row.latitude,
            longitude: row.longitude,
            message: row.message,
            source: row.source.parse()?,
            acknowledged: row.acknowledged,
            created_at: row.created_at,
        })
    }
}
