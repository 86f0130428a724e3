//! Stateful half of auto-escalation.
//!
//! The controller asks the emergency-request store how many auto-generated
//! requests the subscriber has inside the cooldown window and creates one
//! when the policy approves. Check and create run under one lock so two
//! concurrent matches for the same subscriber can not both escalate.

use std::sync::Arc;

use tokio::sync::Mutex;

use hazard_core::alert::{AlertCategory, AlertSeverity};
use hazard_core::error::CoreError;
use hazard_core::escalation::{EscalationDecision, EscalationPolicy, NewEmergencyRequest};
use hazard_core::store::EmergencyRequestStore;
use hazard_core::subscriber::SubscriberRecord;
use hazard_core::types::Timestamp;

pub struct EscalationController {
    policy: EscalationPolicy,
    requests: Arc<dyn EmergencyRequestStore>,
    lock: Mutex<()>,
}

impl EscalationController {
    pub fn new(policy: EscalationPolicy, requests: Arc<dyn EmergencyRequestStore>) -> Self {
        Self {
            policy,
            requests,
            lock: Mutex::new(()),
        }
    }

    pub fn policy(&self) -> EscalationPolicy {
        self.policy
    }

    /// Whether an escalation would be approved for `subscriber` at `now`.
    ///
    /// `category` does not affect the decision: the cooldown is keyed by
    /// subscriber only, so any recent auto escalation blocks every category.
    pub async fn should_escalate(
        &self,
        subscriber: &SubscriberRecord,
        _category: AlertCategory,
        severity: AlertSeverity,
        now: Timestamp,
    ) -> Result<bool, CoreError> {
        Ok(self.decide(subscriber, severity, now).await?.is_approved())
    }

    /// Decide and, when approved, create the auto-generated emergency request.
    pub async fn escalate_if_due(
        &self,
        subscriber: &SubscriberRecord,
        category: AlertCategory,
        severity: AlertSeverity,
        now: Timestamp,
    ) -> Result<EscalationDecision, CoreError> {
        let _guard = self.lock.lock().await;

        let decision = self.decide(subscriber, severity, now).await?;
        match decision {
            EscalationDecision::Approved => {
                let request = self
                    .requests
                    .create(NewEmergencyRequest::auto_for(subscriber, category, now))
                    .await?;
                tracing::info!(
                    subscriber = %subscriber.email,
                    category = %category,
                    request_id = request.id,
                    "Auto-escalation created"
                );
            }
            EscalationDecision::CooldownActive => {
                tracing::info!(
                    subscriber = %subscriber.email,
                    category = %category,
                    "Auto-escalation skipped (cooldown active)"
                );
            }
            EscalationDecision::Ineligible => {}
        }
        Ok(decision)
    }

    async fn decide(
        &self,
        subscriber: &SubscriberRecord,
        severity: AlertSeverity,
        now: Timestamp,
    ) -> Result<EscalationDecision, CoreError> {
        if !severity.is_escalation_eligible() {
            return Ok(EscalationDecision::Ineligible);
        }
        let recent = self
            .requests
            .count_auto_since(&subscriber.email, self.policy.window_start(now))
            .await?;
        Ok(self.policy.decide(severity, recent))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::{Duration, TimeZone, Utc};
    use hazard_core::geo::GeoPoint;
    use hazard_core::memory::MemoryStore;

    use super::*;

    fn subscriber(email: &str) -> SubscriberRecord {
        SubscriberRecord {
            email: email.into(),
            location: Some(GeoPoint::new(12.97, 77.59)),
            roles: BTreeSet::new(),
            push_token: None,
        }
    }

    fn fixed_now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
    }

    fn controller() -> (EscalationController, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let controller = EscalationController::new(EscalationPolicy::default(), store.clone());
        (controller, store)
    }

    #[tokio::test]
    async fn repeat_matches_inside_cooldown_escalate_once() {
        let (controller, store) = controller();
        let sub = subscriber("u@example.com");
        let t0 = fixed_now();

        let first = controller
            .escalate_if_due(&sub, AlertCategory::Flood, AlertSeverity::High, t0)
            .await
            .unwrap();
        let second = controller
            .escalate_if_due(&sub, AlertCategory::Flood, AlertSeverity::High, t0 + Duration::minutes(5))
            .await
            .unwrap();

        assert_eq!(first, EscalationDecision::Approved);
        assert_eq!(second, EscalationDecision::CooldownActive);
        assert_eq!(store.emergency_requests().await.len(), 1);

        let third = controller
            .escalate_if_due(&sub, AlertCategory::Flood, AlertSeverity::High, t0 + Duration::minutes(31))
            .await
            .unwrap();
        assert_eq!(third, EscalationDecision::Approved);
        assert_eq!(store.emergency_requests().await.len(), 2);
    }

    #[tokio::test]
    async fn cooldown_ends_exactly_at_window_length() {
        let (controller, store) = controller();
        let sub = subscriber("u@example.com");
        let t0 = fixed_now();

        controller
            .escalate_if_due(&sub, AlertCategory::Flood, AlertSeverity::High, t0)
            .await
            .unwrap();
        let just_inside = controller
            .escalate_if_due(&sub, AlertCategory::Flood, AlertSeverity::High, t0 + Duration::minutes(30) - Duration::seconds(1))
            .await
            .unwrap();
        let at_boundary = controller
            .escalate_if_due(&sub, AlertCategory::Flood, AlertSeverity::High, t0 + Duration::minutes(30))
            .await
            .unwrap();

        assert_eq!(just_inside, EscalationDecision::CooldownActive);
        assert_eq!(at_boundary, EscalationDecision::Approved);
        let created: Vec<_> = store.emergency_requests().await.iter().map(|r| r.created_at).collect();
        assert_eq!(created, vec![t0, t0 + Duration::minutes(30)]);
    }

    #[tokio::test]
    async fn cooldown_spans_categories() {
        let (controller, store) = controller();
        let sub = subscriber("u@example.com");
        let t0 = fixed_now();

        controller
            .escalate_if_due(&sub, AlertCategory::Flood, AlertSeverity::High, t0)
            .await
            .unwrap();
        let storm = controller
            .escalate_if_due(&sub, AlertCategory::Storm, AlertSeverity::Critical, t0 + Duration::minutes(10))
            .await
            .unwrap();

        assert_eq!(storm, EscalationDecision::CooldownActive);
        assert_eq!(store.emergency_requests().await.len(), 1);
    }

    #[tokio::test]
    async fn should_escalate_ignores_category_inside_cooldown() {
        let (controller, _store) = controller();
        let sub = subscriber("u@example.com");
        let t0 = fixed_now();

        assert!(controller
            .should_escalate(&sub, AlertCategory::Storm, AlertSeverity::High, t0)
            .await
            .unwrap());
        controller
            .escalate_if_due(&sub, AlertCategory::Flood, AlertSeverity::High, t0)
            .await
            .unwrap();
        for category in [AlertCategory::Flood, AlertCategory::Storm, AlertCategory::Wildfire] {
            assert!(!controller
                .should_escalate(&sub, category, AlertSeverity::Critical, t0 + Duration::minutes(10))
                .await
                .unwrap());
        }
    }

    #[tokio::test]
    async fn cooldown_is_per_subscriber() {
        let (controller, store) = controller();
        let now = fixed_now();
        for email in ["a@example.com", "b@example.com"] {
            let decision = controller
                .escalate_if_due(&subscriber(email), AlertCategory::Flood, AlertSeverity::High, now)
                .await
                .unwrap();
            assert_eq!(decision, EscalationDecision::Approved);
        }
        assert_eq!(store.emergency_requests().await.len(), 2);
    }

    #[tokio::test]
    async fn low_severity_never_escalates() {
        let (controller, store) = controller();
        let sub = subscriber("u@example.com");
        let decision = controller
            .escalate_if_due(&sub, AlertCategory::Other, AlertSeverity::Medium, fixed_now())
            .await
            .unwrap();
        assert_eq!(decision, EscalationDecision::Ineligible);
        assert!(!controller
            .should_escalate(&sub, AlertCategory::Other, AlertSeverity::Low, fixed_now())
            .await
            .unwrap());
        assert!(store.emergency_requests().await.is_empty());
    }

    #[tokio::test]
    async fn concurrent_matches_for_one_subscriber_escalate_once() {
        let (controller, store) = controller();
        let controller = Arc::new(controller);
        let now = fixed_now();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let controller = Arc::clone(&controller);
            handles.push(tokio::spawn(async move {
                controller
                    .escalate_if_due(
                        &subscriber("u@example.com"),
                        AlertCategory::Flood,
                        AlertSeverity::Critical,
                        now,
                    )
                    .await
                    .unwrap()
            }));
        }
        let mut approved = 0;
        for handle in handles {
            if handle.await.unwrap().is_approved() {
                approved += 1;
            }
        }
        assert_eq!(approved, 1);
        assert_eq!(store.emergency_requests().await.len(), 1);
    }
}
