//! `emergency_requests` rows.

use sqlx::FromRow;

use hazard_core::error::CoreError;
use hazard_core::escalation::EmergencyRequest;
use hazard_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow)]
pub struct EmergencyRequestRow {
    pub id: DbId,
    pub email: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub message: String,
    pub category: String,
    pub status: String,
    pub auto_generated: bool,
    pub created_at: Timestamp,
}

impl TryFrom<EmergencyRequestRow> for EmergencyRequest {
    type Error = CoreError;

    fn try_from(row: EmergencyRequestRow) -> Result<Self, Self::Error> {
        Ok(EmergencyRequest {
            id: row.id,
            email: row.email,
            latitude: row.latitude,
            longitude: row.longitude,
            message: row.message,
            category: row.category.parse()?,
            status: row.status,
            auto_generated: row.auto_generated,
            created_at: row.created_at,
        })
    }
}
