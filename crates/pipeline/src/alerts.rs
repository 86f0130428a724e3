//! Alert creation: validate, persist, then announce through the gateway.

use std::sync::Arc;

use hazard_core::alert::{AlertCandidate, AlertEvent, AlertSource, NewAlertEvent};
use hazard_core::error::CoreError;
use hazard_core::geo::MonitoredLocation;
use hazard_core::roles::ROLE_ADMIN;
use hazard_core::store::AlertStore;
use hazard_events::NotificationGateway;

#[derive(Clone)]
pub struct AlertService {
    store: Arc<dyn AlertStore>,
    gateway: NotificationGateway,
}

impl AlertService {
    pub fn new(store: Arc<dyn AlertStore>, gateway: NotificationGateway) -> Self {
        Self { store, gateway }
    }

    /// Persist a rule-engine candidate for `location` and notify admins on
    /// the location partition.
    pub async fn record_rule_alert(
        &self,
        location: &MonitoredLocation,
        candidate: &AlertCandidate,
    ) -> Result<AlertEvent, CoreError> {
        let input = NewAlertEvent {
            category: candidate.category,
            severity: candidate.severity,
            location: location.name.clone(),
            latitude: location.point.latitude,
            longitude: location.point.longitude,
            message: candidate.message.clone(),
            source: AlertSource::RuleEngine,
        };
        let alert = self.persist(input).await?;
        self.notify_admins(&alert).await;
        Ok(alert)
    }

    /// Persist an operator-created alert, then notify admins and broadcast.
    pub async fn create_manual(&self, mut input: NewAlertEvent) -> Result<AlertEvent, CoreError> {
        input.source = AlertSource::Manual;
        let alert = self.persist(input).await?;
        self.notify_admins(&alert).await;
        self.gateway.notify_broadcast(&alert.message).await;
        Ok(alert)
    }

    async fn persist(&self, input: NewAlertEvent) -> Result<AlertEvent, CoreError> {
        input.validate()?;
        let alert = self.store.insert(input).await?;
        tracing::info!(
            alert_id = alert.id,
            category = %alert.category,
            severity = %alert.severity,
            source = %alert.source,
            "Alert persisted"
        );
        Ok(alert)
    }

    async fn notify_admins(&self, alert: &AlertEvent) {
        self.gateway
            .notify_role(ROLE_ADMIN, &admin_payload(alert), Some(&alert.location))
            .await;
    }
}

/// Admin consumers receive the full event as JSON.
pub fn admin_payload(alert: &AlertEvent) -> String {
    serde_json::to_string(alert).unwrap_or_else(|_| alert.message.clone())
}

/// Text delivered on a matched subscriber's own topic.
pub fn subscriber_message(alert: &AlertEvent) -> String {
    format!("[{}] {}", alert.severity, alert.message)
}
