//! Auto-escalation cooldown policy and emergency request types.
//!
//! The decision is pure: the caller counts prior auto-generated requests for
//! the subscriber since [`EscalationPolicy::window_start`] and hands the
//! count in. The cooldown is keyed by subscriber only, so an escalation for
//! one category suppresses escalations for every other category until the
//! window has passed.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::alert::{AlertCategory, AlertSeverity};
use crate::subscriber::SubscriberRecord;
use crate::types::{DbId, Timestamp};

pub const DEFAULT_COOLDOWN_MINUTES: i64 = 30;

pub const AUTO_SOS_MESSAGE: &str = "AUTO-SOS: Severe weather danger in your area";

/// Status given to every newly created emergency request.
pub const EMERGENCY_STATUS_PENDING: &str = "PENDING";

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationDecision {
    /// Severity below HIGH.
    Ineligible,
    /// An auto-generated request already exists inside the window.
    CooldownActive,
    Approved,
}

impl EscalationDecision {
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationPolicy {
    cooldown: Duration,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self::with_cooldown_minutes(DEFAULT_COOLDOWN_MINUTES)
    }
}

impl EscalationPolicy {
    pub fn with_cooldown_minutes(minutes: i64) -> Self {
        Self {
            cooldown: Duration::minutes(minutes.max(0)),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Requests created strictly after this instant are inside the window.
    pub fn window_start(&self, now: Timestamp) -> Timestamp {
        now - self.cooldown
    }

    pub fn decide(&self, severity: AlertSeverity, recent_auto_requests: u64) -> EscalationDecision {
        if !severity.is_escalation_eligible() {
            EscalationDecision::Ineligible
        } else if recent_auto_requests > 0 {
            EscalationDecision::CooldownActive
        } else {
            EscalationDecision::Approved
        }
    }
}

// ---------------------------------------------------------------------------
// Emergency requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyRequest {
    pub id: DbId,
    pub email: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub message: String,
    pub category: AlertCategory,
    pub status: String,
    pub auto_generated: bool,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEmergencyRequest {
    pub email: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub message: String,
    pub category: AlertCategory,
    pub status: String,
    pub auto_generated: bool,
    /// Decision time; stored as the request's `created_at` so cooldown
    /// windows are measured on the same clock that opened them.
    pub requested_at: Timestamp,
}

impl NewEmergencyRequest {
    /// The request created when escalation is approved for `subscriber` at `now`.
    pub fn auto_for(subscriber: &SubscriberRecord, category: AlertCategory, now: Timestamp) -> Self {
        Self {
            email: subscriber.email.clone(),
            latitude: subscriber.location.map(|p| p.latitude),
            longitude: subscriber.location.map(|p| p.longitude),
            message: AUTO_SOS_MESSAGE.to_string(),
            category,
            status: EMERGENCY_STATUS_PENDING.to_string(),
            auto_generated: true,
            requested_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
