//! Repository for the `alert_events` table.

use sqlx::PgPool;

use hazard_core::alert::{AlertFilter, NewAlertEvent};
use hazard_core::types::{DbId, Timestamp};

use crate::models::alert::AlertEventRow;

/// Column list for `alert_events` queries.
const COLUMNS: &str = "\
    id, category, severity, location, latitude, longitude, \
    message, source, acknowledged, created_at";

pub struct AlertRepo;

impl AlertRepo {
    pub async fn create(pool: &PgPool, input: &NewAlertEvent) -> Result<AlertEventRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO alert_events \
                (category, severity, location, latitude, longitude, message, source) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AlertEventRow>(&query)
            .bind(input.category.as_str())
            .bind(input.severity.as_str())
            .bind(&input.location)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(&input.message)
            .bind(input.source.as_str())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AlertEventRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM alert_events WHERE id = $1");
        sqlx::query_as::<_, AlertEventRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Set `acknowledged = true`. Returns `None` when the id does not exist.
    pub async fn acknowledge(pool: &PgPool, id: DbId) -> Result<Option<AlertEventRow>, sqlx::Error> {
        let query = format!(
            "UPDATE alert_events SET acknowledged = true \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AlertEventRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_latest(pool: &PgPool, limit: i64) -> Result<Vec<AlertEventRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alert_events \
             ORDER BY created_at DESC, id DESC \
             LIMIT $1"
        );
        sqlx::query_as::<_, AlertEventRow>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    pub async fn list_since(
        pool: &PgPool,
        since: Timestamp,
    ) -> Result<Vec<AlertEventRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alert_events \
             WHERE created_at >= $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, AlertEventRow>(&query)
            .bind(since)
            .fetch_all(pool)
            .await
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<AlertEventRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM alert_events ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, AlertEventRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Filtered, paginated listing. Most recent first.
    pub async fn list_filtered(
        pool: &PgPool,
        filter: &AlertFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AlertEventRow>, sqlx::Error> {
        let (where_clause, bind_values, bind_idx) = build_alert_filter(filter);

        let query = format!(
            "SELECT {COLUMNS} FROM alert_events {where_clause} \
             ORDER BY created_at DESC, id DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let mut q = sqlx::query_as::<_, AlertEventRow>(&query);
        for val in &bind_values {
            q = match val {
                BindValue::Text(v) => q.bind(v.as_str()),
                BindValue::Bool(v) => q.bind(*v),
                BindValue::Timestamp(v) => q.bind(*v),
            };
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

enum BindValue {
    Text(String),
    Bool(bool),
    Timestamp(Timestamp),
}

/// Returns `(where_clause, bind_values, next_bind_index)`.
fn build_alert_filter(filter: &AlertFilter) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<BindValue> = Vec::new();

    if let Some(category) = filter.category {
        conditions.push(format!("category = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(category.as_str().to_string()));
    }

    if let Some(severity) = filter.severity {
        conditions.push(format!("severity = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(severity.as_str().to_string()));
    }

    if let Some(ref location) = filter.location {
        conditions.push(format!("location ILIKE ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(format!("%{location}%")));
    }

    if let Some(start) = filter.start {
        conditions.push(format!("created_at >= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(start));
    }

    if let Some(end) = filter.end {
        conditions.push(format!("created_at <= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(end));
    }

    if let Some(acknowledged) = filter.acknowledged {
        conditions.push(format!("acknowledged = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Bool(acknowledged));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}

#[cfg(test)]
mod tests {
    use hazard_core::alert::{AlertCategory, AlertSeverity};

    use super::*;

    #[test]
    fn empty_filter_has_no_where_clause() {
        let (clause, values, next) = build_alert_filter(&AlertFilter::default());
        assert!(clause.is_empty());
        assert!(values.is_empty());
        assert_eq!(next, 1);
    }

    #[test]
    fn filter_numbers_placeholders_in_order() {
        let filter = AlertFilter {
            category: Some(AlertCategory::Flood),
            severity: Some(AlertSeverity::High),
            acknowledged: Some(false),
            ..Default::default()
        };
        let (clause, values, next) = build_alert_filter(&filter);
        assert_eq!(
            clause,
            "WHERE category = $1 AND severity = $2 AND acknowledged = $3"
        );
        assert_eq!(values.len(), 3);
        assert_eq!(next, 4);
    }
}
