//! `subscriber_alerts` rows.

use sqlx::FromRow;

use hazard_core::alert::PerSubscriberAlert;
use hazard_core::error::CoreError;
use hazard_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow)]
pub struct SubscriberAlertRow {
    pub id: DbId,
    pub subscriber_email: String,
    pub alert_message: String,
    pub category: String,
    pub severity: String,
    pub created_at: Timestamp,
}

impl TryFrom<SubscriberAlertRow> for PerSubscriberAlert {
    type Error = CoreError;

    fn try_from(row: SubscriberAlertRow) -> Result<Self, Self::Error> {
        Ok(PerSubscriberAlert {
            id: row.id,
            subscriber_email: row.subscriber_email,
            alert_message: row.alert_message,
            category: row.category.parse()?,
            severity: row.severity.parse()?,
            created_at: row.created_at,
        })
    }
}
