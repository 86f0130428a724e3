//! Repository for the `subscriber_alerts` table.

use sqlx::PgPool;

use hazard_core::alert::NewSubscriberAlert;

use crate::models::subscriber_alert::SubscriberAlertRow;

const COLUMNS: &str = "id, subscriber_email, alert_message, category, severity, created_at";

pub struct SubscriberAlertRepo;

impl SubscriberAlertRepo {
    pub async fn create(
        pool: &PgPool,
        input: &NewSubscriberAlert,
    ) -> Result<SubscriberAlertRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscriber_alerts (subscriber_email, alert_message, category, severity) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SubscriberAlertRow>(&query)
            .bind(&input.subscriber_email)
            .bind(&input.alert_message)
            .bind(input.category.as_str())
            .bind(input.severity.as_str())
            .fetch_one(pool)
            .await
    }

    pub async fn list_for_subscriber(
        pool: &PgPool,
        email: &str,
    ) -> Result<Vec<SubscriberAlertRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subscriber_alerts \
             WHERE subscriber_email = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, SubscriberAlertRow>(&query)
            .bind(email)
            .fetch_all(pool)
            .await
    }
}
