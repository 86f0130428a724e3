//! Repository for the `emergency_requests` table.

use sqlx::PgPool;

use hazard_core::escalation::NewEmergencyRequest;
use hazard_core::types::Timestamp;

use crate::models::emergency_request::EmergencyRequestRow;

const COLUMNS: &str = "\
    id, email, latitude, longitude, message, category, \
    status, auto_generated, created_at";

pub struct EmergencyRequestRepo;

impl EmergencyRequestRepo {
    pub async fn create(
        pool: &PgPool,
        input: &NewEmergencyRequest,
    ) -> Result<EmergencyRequestRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO emergency_requests \
                (email, latitude, longitude, message, category, status, auto_generated, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EmergencyRequestRow>(&query)
            .bind(&input.email)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(&input.message)
            .bind(input.category.as_str())
            .bind(&input.status)
            .bind(input.auto_generated)
            .bind(input.requested_at)
            .fetch_one(pool)
            .await
    }

    /// Auto-generated requests for `email` created strictly after `since`.
    pub async fn count_auto_since(
        pool: &PgPool,
        email: &str,
        since: Timestamp,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM emergency_requests \
             WHERE email = $1 AND auto_generated AND created_at > $2",
        )
        .bind(email)
        .bind(since)
        .fetch_one(pool)
        .await
    }
}
