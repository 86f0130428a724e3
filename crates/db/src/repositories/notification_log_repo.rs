//! Repository for the append-only `notification_logs` table.

use sqlx::PgPool;

use hazard_core::notification::NewNotificationLog;

use crate::models::notification_log::NotificationLogRow;

const COLUMNS: &str = "id, recipient, notification_type, channel, message, sent, error, created_at";

pub struct NotificationLogRepo;

impl NotificationLogRepo {
    pub async fn create(
        pool: &PgPool,
        input: &NewNotificationLog,
    ) -> Result<NotificationLogRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO notification_logs \
                (recipient, notification_type, channel, message, sent, error) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotificationLogRow>(&query)
            .bind(&input.recipient)
            .bind(input.notification_type.as_str())
            .bind(&input.channel)
            .bind(&input.message)
            .bind(input.sent)
            .bind(&input.error)
            .fetch_one(pool)
            .await
    }

    pub async fn list_recent(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<NotificationLogRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_logs \
             ORDER BY created_at DESC, id DESC \
             LIMIT $1"
        );
        sqlx::query_as::<_, NotificationLogRow>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_type(
        pool: &PgPool,
        notification_type: &str,
    ) -> Result<Vec<NotificationLogRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_logs \
             WHERE notification_type = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, NotificationLogRow>(&query)
            .bind(notification_type)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_recipient(
        pool: &PgPool,
        recipient: &str,
    ) -> Result<Vec<NotificationLogRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_logs \
             WHERE recipient = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, NotificationLogRow>(&query)
            .bind(recipient)
            .fetch_all(pool)
            .await
    }
}
