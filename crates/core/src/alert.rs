//! Hazard alert types: categories, severities, candidates, and persisted events.
//!
//! Category, severity, and source are closed sets. Parsing an unrecognised
//! token is a [`CoreError::Validation`], never a silent fallback, so a stray
//! string can not become a valid persisted event.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Hazard category of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertCategory {
    Flood,
    Storm,
    Wildfire,
    Other,
    Test,
}

impl AlertCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flood => "FLOOD",
            Self::Storm => "STORM",
            Self::Wildfire => "WILDFIRE",
            Self::Other => "OTHER",
            Self::Test => "TEST",
        }
    }
}

impl fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FLOOD" => Ok(Self::Flood),
            "STORM" => Ok(Self::Storm),
            "WILDFIRE" => Ok(Self::Wildfire),
            "OTHER" => Ok(Self::Other),
            "TEST" => Ok(Self::Test),
            other => Err(CoreError::Validation(format!(
                "Unknown alert category '{other}'"
            ))),
        }
    }
}

/// Alert severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }

    /// Only HIGH and CRITICAL alerts may trigger an auto-escalation.
    pub fn is_escalation_eligible(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }

    /// Derive a severity from a fixed rule label such as `FLOOD_RISK_HIGH`.
    ///
    /// `CRITICAL` wins over `HIGH`/`WARNING`; anything without a recognised
    /// token is LOW.
    pub fn from_rule_label(label: &str) -> Self {
        let upper = label.to_ascii_uppercase();
        if upper.contains("CRITICAL") {
            Self::Critical
        } else if upper.contains("HIGH") || upper.contains("WARNING") {
            Self::High
        } else if upper.contains("MEDIUM") {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertSeverity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            "CRITICAL" => Ok(Self::Critical),
            other => Err(CoreError::Validation(format!(
                "Severity must be LOW, MEDIUM, HIGH, or CRITICAL (got '{other}')"
            ))),
        }
    }
}

/// Who produced an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertSource {
    Manual,
    RuleEngine,
}

impl AlertSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "MANUAL",
            Self::RuleEngine => "RULE_ENGINE",
        }
    }
}

impl fmt::Display for AlertSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertSource {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MANUAL" => Ok(Self::Manual),
            "RULE_ENGINE" => Ok(Self::RuleEngine),
            other => Err(CoreError::Validation(format!(
                "Unknown alert source '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Candidates and events
// ---------------------------------------------------------------------------

/// An unpersisted hazard signal produced by rule evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertCandidate {
    pub category: AlertCategory,
    pub severity: AlertSeverity,
    pub message: String,
}

/// A persisted, identified hazard record.
///
/// After creation only `acknowledged` may change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub id: DbId,
    pub category: AlertCategory,
    pub severity: AlertSeverity,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub message: String,
    pub source: AlertSource,
    pub acknowledged: bool,
    pub created_at: Timestamp,
}

/// Input for persisting a new [`AlertEvent`]. Identity and timestamp are
/// assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlertEvent {
    pub category: AlertCategory,
    pub severity: AlertSeverity,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub message: String,
    pub source: AlertSource,
}

impl NewAlertEvent {
    /// Reject an alert that would violate the persisted-event invariants.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.message.trim().is_empty() {
            return Err(CoreError::Validation("Alert message is required".into()));
        }
        if self.location.trim().is_empty() {
            return Err(CoreError::Validation("Alert location is required".into()));
        }
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(CoreError::Validation(format!(
                "Latitude {} is out of range",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(CoreError::Validation(format!(
                "Longitude {} is out of range",
                self.longitude
            )));
        }
        Ok(())
    }
}

/// A copy of an alert delivered to one matched subscriber. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerSubscriberAlert {
    pub id: DbId,
    pub subscriber_email: String,
    pub alert_message: String,
    pub category: AlertCategory,
    pub severity: AlertSeverity,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSubscriberAlert {
    pub subscriber_email: String,
    pub alert_message: String,
    pub category: AlertCategory,
    pub severity: AlertSeverity,
}

impl NewSubscriberAlert {
    pub fn for_alert(subscriber_email: &str, alert: &AlertEvent) -> Self {
        Self {
            subscriber_email: subscriber_email.to_string(),
            alert_message: alert.message.clone(),
            category: alert.category,
            severity: alert.severity,
        }
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Optional criteria for listing alert events. `None` fields do not filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertFilter {
    pub category: Option<AlertCategory>,
    pub severity: Option<AlertSeverity>,
    /// Case-insensitive substring match on the location name.
    pub location: Option<String>,
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
    pub acknowledged: Option<bool>,
}

impl AlertFilter {
    pub fn matches(&self, alert: &AlertEvent) -> bool {
        if self.category.is_some_and(|c| c != alert.category) {
            return false;
        }
        if self.severity.is_some_and(|s| s != alert.severity) {
            return false;
        }
        if let Some(location) = &self.location {
            let needle = location.to_lowercase();
            if !alert.location.to_lowercase().contains(&needle) {
                return false;
            }
        }
        if self.start.is_some_and(|start| alert.created_at < start) {
            return false;
        }
        if self.end.is_some_and(|end| alert.created_at > end) {
            return false;
        }
        if self.acknowledged.is_some_and(|a| a != alert.acknowledged) {
            return false;
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
