//! Environmental telemetry sample consumed by the rule evaluator.

use serde::{Deserialize, Serialize};

/// Offset between Kelvin and Celsius.
pub const KELVIN_OFFSET: f64 = 273.15;

/// One reading for the monitored location. Every measurement is optional;
/// a missing value disables the rules that depend on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Air temperature in Kelvin.
    pub temperature: Option<f64>,
    /// Relative humidity, percent 0-100.
    pub humidity: Option<f64>,
    /// Wind speed in m/s.
    pub wind_speed: Option<f64>,
    /// Sea-level pressure in hPa.
    pub pressure: Option<f64>,
    /// Free-text category token such as `Rain` or `Clear`.
    pub condition: Option<String>,
    pub description: Option<String>,
}

impl TelemetrySample {
    pub fn temperature_celsius(&self) -> Option<f64> {
        self.temperature.map(|k| k - KELVIN_OFFSET)
    }

    /// Case-insensitive substring test against the condition token.
    ///
    /// A missing condition never matches.
    pub fn condition_contains_any(&self, needles: &[&str]) -> bool {
        match &self.condition {
            Some(condition) => {
                let upper = condition.to_uppercase();
                needles.iter().any(|n| upper.contains(n))
            }
            None => false,
        }
    }

    /// One-line human summary used in alert messages and cycle logs.
    pub fn conditions_summary(&self) -> String {
        let condition = self.condition.as_deref().unwrap_or("N/A");
        let temperature = self
            .temperature_celsius()
            .map(|c| format!("{c:.1}°C"))
            .unwrap_or_else(|| "N/A".to_string());
        format!("Current conditions: {condition}, Temperature: {temperature}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kelvin_is_converted_to_celsius() {
        let sample = TelemetrySample {
            temperature: Some(300.0),
            ..Default::default()
        };
        let celsius = sample.temperature_celsius().unwrap();
        assert!((celsius - 26.85).abs() < 1e-9);
    }

    #[test]
    fn condition_match_ignores_case() {
        let sample = TelemetrySample {
            condition: Some("Thunderstorm".into()),
            ..Default::default()
        };
        assert!(sample.condition_contains_any(&["STORM"]));
        assert!(!sample.condition_contains_any(&["CLEAR", "SUNNY"]));
    }

    #[test]
    fn missing_condition_never_matches() {
        assert!(!TelemetrySample::default().condition_contains_any(&["RAIN"]));
    }

    #[test]
    fn summary_uses_placeholders_for_missing_values() {
        assert_eq!(
            TelemetrySample::default().conditions_summary(),
            "Current conditions: N/A, Temperature: N/A"
        );
    }
}
