//! Threshold rule evaluation for environmental telemetry.
//!
//! Pure logic -- no I/O. The caller fetches the sample and passes it in.
//! Each rule group is independent, so one sample can yield several
//! candidates. A missing measurement makes the dependent rule evaluate to
//! "not satisfied"; evaluation never fails.

use crate::alert::{AlertCandidate, AlertCategory, AlertSeverity};
use crate::telemetry::TelemetrySample;

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

const FLOOD_MAX_TEMP_C: f64 = 30.0;
const FLOOD_MIN_HUMIDITY: f64 = 85.0;
const FLOOD_MAX_PRESSURE_HPA: f64 = 1000.0;
const FLOOD_CONDITIONS: &[&str] = &["RAIN", "THUNDERSTORM"];

const CYCLONE_MIN_WIND_MS: f64 = 20.0;
const CYCLONE_MAX_PRESSURE_HPA: f64 = 990.0;
const CYCLONE_CONDITIONS: &[&str] = &["STORM", "THUNDERSTORM", "HURRICANE"];

const WILDFIRE_MIN_TEMP_C: f64 = 35.0;
const WILDFIRE_MAX_HUMIDITY: f64 = 25.0;
const WILDFIRE_MIN_WIND_MS: f64 = 10.0;
const WILDFIRE_CONDITIONS: &[&str] = &["CLEAR", "SUNNY"];

// ---------------------------------------------------------------------------
// Rule groups
// ---------------------------------------------------------------------------

/// The fixed set of hazard rule groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardRule {
    Flood,
    Cyclone,
    Wildfire,
}

impl HazardRule {
    /// Evaluation order; candidates are emitted in this order.
    pub const ALL: [HazardRule; 3] = [Self::Flood, Self::Cyclone, Self::Wildfire];

    /// Fixed label the rule reports when it fires.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Flood => "FLOOD_RISK_HIGH",
            Self::Cyclone => "CYCLONE_WARNING",
            Self::Wildfire => "WILDFIRE_RISK_HIGH",
        }
    }

    pub fn category(&self) -> AlertCategory {
        match self {
            Self::Flood => AlertCategory::Flood,
            Self::Cyclone => AlertCategory::Storm,
            Self::Wildfire => AlertCategory::Wildfire,
        }
    }

    pub fn severity(&self) -> AlertSeverity {
        AlertSeverity::from_rule_label(self.label())
    }

    /// Whether every sub-condition of this rule holds for `sample`.
    pub fn is_satisfied(&self, sample: &TelemetrySample) -> bool {
        match self {
            Self::Flood => flood_conditions(sample),
            Self::Cyclone => cyclone_conditions(sample),
            Self::Wildfire => wildfire_conditions(sample),
        }
    }
}

/// Cool, saturated, low-pressure air with rain.
fn flood_conditions(sample: &TelemetrySample) -> bool {
    let (Some(temp_c), Some(humidity), Some(pressure)) = (
        sample.temperature_celsius(),
        sample.humidity,
        sample.pressure,
    ) else {
        return false;
    };

    temp_c < FLOOD_MAX_TEMP_C
        && humidity > FLOOD_MIN_HUMIDITY
        && pressure < FLOOD_MAX_PRESSURE_HPA
        && sample.condition_contains_any(FLOOD_CONDITIONS)
}

fn cyclone_conditions(sample: &TelemetrySample) -> bool {
    let (Some(wind), Some(pressure)) = (sample.wind_speed, sample.pressure) else {
        return false;
    };

    wind > CYCLONE_MIN_WIND_MS
        && pressure < CYCLONE_MAX_PRESSURE_HPA
        && sample.condition_contains_any(CYCLONE_CONDITIONS)
}

/// Hot, dry, clear and windy.
fn wildfire_conditions(sample: &TelemetrySample) -> bool {
    let (Some(temp_c), Some(humidity), Some(wind)) = (
        sample.temperature_celsius(),
        sample.humidity,
        sample.wind_speed,
    ) else {
        return false;
    };

    temp_c > WILDFIRE_MIN_TEMP_C
        && humidity < WILDFIRE_MAX_HUMIDITY
        && sample.condition_contains_any(WILDFIRE_CONDITIONS)
        && wind > WILDFIRE_MIN_WIND_MS
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Evaluate all rule groups against `sample` and return one candidate per
/// satisfied group.
///
/// `location_name` is only used to compose the human-readable message.
pub fn evaluate(sample: &TelemetrySample, location_name: &str) -> Vec<AlertCandidate> {
    HazardRule::ALL
        .iter()
        .filter(|rule| rule.is_satisfied(sample))
        .map(|rule| AlertCandidate {
            category: rule.category(),
            severity: rule.severity(),
            message: format!(
                "{} detected at {location_name}. {}",
                rule.label().replace('_', " "),
                sample.conditions_summary()
            ),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
