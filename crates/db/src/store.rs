//! Adapter from the repositories to the `hazard_core::store` traits.
//!
//! sqlx errors stop here: `RowNotFound` becomes [`CoreError::NotFound`] and
//! everything else becomes [`CoreError::Internal`] after being logged.

use async_trait::async_trait;

use hazard_core::alert::{
    AlertEvent, AlertFilter, NewAlertEvent, NewSubscriberAlert, PerSubscriberAlert,
};
use hazard_core::error::CoreError;
use hazard_core::escalation::{EmergencyRequest, NewEmergencyRequest};
use hazard_core::notification::{NewNotificationLog, NotificationLogEntry, NotificationType};
use hazard_core::store::{
    AlertStore, EmergencyRequestStore, NotificationLogStore, SubscriberAlertStore,
    SubscriberRegistry,
};
use hazard_core::subscriber::SubscriberRecord;
use hazard_core::types::{DbId, Timestamp};

use crate::repositories::{
    AlertRepo, EmergencyRequestRepo, NotificationLogRepo, SubscriberAlertRepo, SubscriberRepo,
};
use crate::DbPool;

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn db_error(entity: &'static str) -> impl Fn(sqlx::Error) -> CoreError {
    move |err| match err {
        sqlx::Error::RowNotFound => CoreError::NotFound { entity, id: 0 },
        other => {
            tracing::error!(entity, error = %other, "Database error");
            CoreError::Internal(format!("database error on {entity}"))
        }
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, CoreError>
where
    T: TryFrom<R, Error = CoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[async_trait]
impl AlertStore for PgStore {
    async fn insert(&self, alert: NewAlertEvent) -> Result<AlertEvent, CoreError> {
        alert.validate()?;
        let row = AlertRepo::create(&self.pool, &alert)
            .await
            .map_err(db_error("AlertEvent"))?;
        AlertEvent::try_from(row)
    }

    async fn find(&self, id: DbId) -> Result<Option<AlertEvent>, CoreError> {
        AlertRepo::find_by_id(&self.pool, id)
            .await
            .map_err(db_error("AlertEvent"))?
            .map(AlertEvent::try_from)
            .transpose()
    }

    async fn acknowledge(&self, id: DbId) -> Result<AlertEvent, CoreError> {
        let row = AlertRepo::acknowledge(&self.pool, id)
            .await
            .map_err(db_error("AlertEvent"))?
            .ok_or(CoreError::NotFound {
                entity: "AlertEvent",
                id,
            })?;
        AlertEvent::try_from(row)
    }

    async fn latest(&self, limit: i64) -> Result<Vec<AlertEvent>, CoreError> {
        let rows = AlertRepo::list_latest(&self.pool, limit)
            .await
            .map_err(db_error("AlertEvent"))?;
        convert_all(rows)
    }

    async fn created_since(&self, since: Timestamp) -> Result<Vec<AlertEvent>, CoreError> {
        let rows = AlertRepo::list_since(&self.pool, since)
            .await
            .map_err(db_error("AlertEvent"))?;
        convert_all(rows)
    }

    async fn all(&self) -> Result<Vec<AlertEvent>, CoreError> {
        let rows = AlertRepo::list_all(&self.pool)
            .await
            .map_err(db_error("AlertEvent"))?;
        convert_all(rows)
    }

    async fn list(
        &self,
        filter: &AlertFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AlertEvent>, CoreError> {
        let rows = AlertRepo::list_filtered(&self.pool, filter, limit, offset)
            .await
            .map_err(db_error("AlertEvent"))?;
        convert_all(rows)
    }
}

#[async_trait]
impl SubscriberAlertStore for PgStore {
    async fn insert(&self, alert: NewSubscriberAlert) -> Result<PerSubscriberAlert, CoreError> {
        let row = SubscriberAlertRepo::create(&self.pool, &alert)
            .await
            .map_err(db_error("PerSubscriberAlert"))?;
        PerSubscriberAlert::try_from(row)
    }

    async fn list_for(&self, email: &str) -> Result<Vec<PerSubscriberAlert>, CoreError> {
        let rows = SubscriberAlertRepo::list_for_subscriber(&self.pool, email)
            .await
            .map_err(db_error("PerSubscriberAlert"))?;
        convert_all(rows)
    }
}

#[async_trait]
impl EmergencyRequestStore for PgStore {
    async fn create(&self, request: NewEmergencyRequest) -> Result<EmergencyRequest, CoreError> {
        let row = EmergencyRequestRepo::create(&self.pool, &request)
            .await
            .map_err(db_error("EmergencyRequest"))?;
        EmergencyRequest::try_from(row)
    }

    async fn count_auto_since(&self, email: &str, since: Timestamp) -> Result<u64, CoreError> {
        let count = EmergencyRequestRepo::count_auto_since(&self.pool, email, since)
            .await
            .map_err(db_error("EmergencyRequest"))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[async_trait]
impl NotificationLogStore for PgStore {
    async fn append(&self, entry: NewNotificationLog) -> Result<NotificationLogEntry, CoreError> {
        let row = NotificationLogRepo::create(&self.pool, &entry)
            .await
            .map_err(db_error("NotificationLogEntry"))?;
        NotificationLogEntry::try_from(row)
    }

    async fn list(&self, limit: i64) -> Result<Vec<NotificationLogEntry>, CoreError> {
        let rows = NotificationLogRepo::list_recent(&self.pool, limit)
            .await
            .map_err(db_error("NotificationLogEntry"))?;
        convert_all(rows)
    }

    async fn list_by_type(
        &self,
        notification_type: NotificationType,
    ) -> Result<Vec<NotificationLogEntry>, CoreError> {
        let rows = NotificationLogRepo::list_by_type(&self.pool, notification_type.as_str())
            .await
            .map_err(db_error("NotificationLogEntry"))?;
        convert_all(rows)
    }

    async fn list_by_recipient(
        &self,
        recipient: &str,
    ) -> Result<Vec<NotificationLogEntry>, CoreError> {
        let rows = NotificationLogRepo::list_by_recipient(&self.pool, recipient)
            .await
            .map_err(db_error("NotificationLogEntry"))?;
        convert_all(rows)
    }
}

#[async_trait]
impl SubscriberRegistry for PgStore {
    async fn list_with_coordinates(&self) -> Result<Vec<SubscriberRecord>, CoreError> {
        let rows = SubscriberRepo::list_with_coordinates(&self.pool)
            .await
            .map_err(db_error("SubscriberRecord"))?;
        Ok(rows.into_iter().map(SubscriberRecord::from).collect())
    }
}
