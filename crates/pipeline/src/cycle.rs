//! One monitoring cycle.
//!
//! ```text
//! fetch telemetry -> evaluate rules -> for each candidate:
//!     persist + notify admins -> match subscribers -> for each match (parallel):
//!         record per-subscriber alert, notify subscriber, escalate if due
//! ```
//!
//! Only a telemetry failure ends the cycle early. A failure while handling
//! one candidate or one subscriber is logged and counted, and the rest of
//! the cycle carries on.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;

use hazard_core::alert::{AlertCategory, AlertEvent, NewSubscriberAlert};
use hazard_core::escalation::EscalationDecision;
use hazard_core::geo::{match_subscribers, MonitoredLocation};
use hazard_core::rules;
use hazard_core::store::{SubscriberAlertStore, SubscriberRegistry};
use hazard_core::subscriber::SubscriberRecord;
use hazard_core::telemetry::TelemetrySample;
use hazard_events::NotificationGateway;

use crate::alerts::{subscriber_message, AlertService};
use crate::error::{PipelineError, TelemetryError};
use crate::escalation::EscalationController;
use crate::telemetry::TelemetryProvider;

#[derive(Debug, Clone)]
pub struct CycleSettings {
    pub location: MonitoredLocation,
    pub radius_km: f64,
    pub telemetry_timeout: Duration,
}

/// Counters for one completed cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub candidates: Vec<AlertCategory>,
    pub persisted: usize,
    pub matched: usize,
    pub notified: usize,
    pub escalated: usize,
    pub escalations_skipped: usize,
    pub failures: usize,
}

#[derive(Default)]
struct SubscriberOutcome {
    notified: bool,
    escalated: bool,
    skipped: bool,
    failures: usize,
}

pub struct MonitorCycle {
    settings: CycleSettings,
    telemetry: Arc<dyn TelemetryProvider>,
    registry: Arc<dyn SubscriberRegistry>,
    subscriber_alerts: Arc<dyn SubscriberAlertStore>,
    alerts: AlertService,
    gateway: NotificationGateway,
    escalation: Arc<EscalationController>,
}

impl MonitorCycle {
    pub fn new(
        settings: CycleSettings,
        telemetry: Arc<dyn TelemetryProvider>,
        registry: Arc<dyn SubscriberRegistry>,
        subscriber_alerts: Arc<dyn SubscriberAlertStore>,
        alerts: AlertService,
        gateway: NotificationGateway,
        escalation: Arc<EscalationController>,
    ) -> Self {
        Self {
            settings,
            telemetry,
            registry,
            subscriber_alerts,
            alerts,
            gateway,
            escalation,
        }
    }

    pub fn settings(&self) -> &CycleSettings {
        &self.settings
    }

    pub async fn run(&self) -> Result<CycleReport, PipelineError> {
        let location = &self.settings.location;
        tracing::info!(location = %location.name, "Monitoring cycle started");

        let sample = self.fetch_sample().await?;
        let candidates = rules::evaluate(&sample, &location.name);

        let mut report = CycleReport {
            candidates: candidates.iter().map(|c| c.category).collect(),
            ..Default::default()
        };

        if candidates.is_empty() {
            tracing::info!(
                location = %location.name,
                conditions = %sample.conditions_summary(),
                "No threats detected"
            );
            return Ok(report);
        }

        tracing::info!(
            location = %location.name,
            candidates = ?report.candidates,
            "Hazard candidates detected"
        );

        let mut subscribers: Option<Vec<SubscriberRecord>> = None;

        for candidate in &candidates {
            let alert = match self.alerts.record_rule_alert(location, candidate).await {
                Ok(alert) => alert,
                Err(e) => {
                    tracing::error!(category = %candidate.category, error = %e, "Failed to persist alert");
                    report.failures += 1;
                    continue;
                }
            };
            report.persisted += 1;

            if subscribers.is_none() {
                match self.registry.list_with_coordinates().await {
                    Ok(list) => subscribers = Some(list),
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to load subscriber registry");
                        report.failures += 1;
                        continue;
                    }
                }
            }
            let Some(registry) = subscribers.as_deref() else {
                continue;
            };

            let matched = match_subscribers(&alert, registry, self.settings.radius_km);
            report.matched += matched.len();

            let outcomes = join_all(matched.into_iter().map(|s| self.fan_out(&alert, s))).await;
            for outcome in outcomes {
                report.notified += usize::from(outcome.notified);
                report.escalated += usize::from(outcome.escalated);
                report.escalations_skipped += usize::from(outcome.skipped);
                report.failures += outcome.failures;
            }
        }

        tracing::info!(
            location = %location.name,
            persisted = report.persisted,
            matched = report.matched,
            notified = report.notified,
            escalated = report.escalated,
            escalations_skipped = report.escalations_skipped,
            failures = report.failures,
            "Monitoring cycle finished"
        );
        Ok(report)
    }

    async fn fetch_sample(&self) -> Result<TelemetrySample, TelemetryError> {
        let timeout = self.settings.telemetry_timeout;
        let point = self.settings.location.point;
        match tokio::time::timeout(timeout, self.telemetry.fetch(point)).await {
            Ok(result) => result,
            Err(_) => Err(TelemetryError::Timeout(timeout)),
        }
    }

    async fn fan_out(&self, alert: &AlertEvent, subscriber: &SubscriberRecord) -> SubscriberOutcome {
        let mut outcome = SubscriberOutcome::default();

        if let Err(e) = self
            .subscriber_alerts
            .insert(NewSubscriberAlert::for_alert(&subscriber.email, alert))
            .await
        {
            tracing::error!(subscriber = %subscriber.email, error = %e, "Failed to record subscriber alert");
            outcome.failures += 1;
        }

        outcome.notified = self
            .gateway
            .notify_subscriber(&subscriber.email, &subscriber_message(alert))
            .await
            .is_delivered();

        match self
            .escalation
            .escalate_if_due(subscriber, alert.category, alert.severity, Utc::now())
            .await
        {
            Ok(EscalationDecision::Approved) => outcome.escalated = true,
            Ok(EscalationDecision::CooldownActive) => outcome.skipped = true,
            Ok(EscalationDecision::Ineligible) => {}
            Err(e) => {
                tracing::error!(subscriber = %subscriber.email, error = %e, "Escalation failed");
                outcome.failures += 1;
            }
        }

        outcome
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
