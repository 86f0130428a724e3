//! Telemetry provider seam and the OpenWeather current-weather client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use hazard_core::geo::GeoPoint;
use hazard_core::telemetry::TelemetrySample;

use crate::error::TelemetryError;

pub const DEFAULT_OPENWEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Returns one parsed sample for the given coordinates.
#[async_trait]
pub trait TelemetryProvider: Send + Sync {
    async fn fetch(&self, point: GeoPoint) -> Result<TelemetrySample, TelemetryError>;
}

// ---------------------------------------------------------------------------
// OpenWeather response structures
// ---------------------------------------------------------------------------

/// Subset of the current-weather response. Every field is optional; a
/// missing one becomes `None` in the sample.
#[derive(Debug, Default, Deserialize)]
pub struct OpenWeatherResponse {
    pub main: Option<OpenWeatherMain>,
    pub wind: Option<OpenWeatherWind>,
    #[serde(default)]
    pub weather: Vec<OpenWeatherCondition>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpenWeatherMain {
    /// Kelvin (the provider's default unit).
    pub temp: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpenWeatherWind {
    pub speed: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpenWeatherCondition {
    pub main: Option<String>,
    pub description: Option<String>,
}

impl From<OpenWeatherResponse> for TelemetrySample {
    fn from(response: OpenWeatherResponse) -> Self {
        let main = response.main.unwrap_or_default();
        let condition = response.weather.into_iter().next().unwrap_or_default();
        TelemetrySample {
            temperature: main.temp,
            humidity: main.humidity,
            wind_speed: response.wind.and_then(|w| w.speed),
            pressure: main.pressure,
            condition: condition.main,
            description: condition.description,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct OpenWeatherConfig {
    pub api_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

pub struct OpenWeatherClient {
    client: reqwest::Client,
    config: OpenWeatherConfig,
}

impl OpenWeatherClient {
    pub fn new(config: OpenWeatherConfig) -> Result<Self, TelemetryError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl TelemetryProvider for OpenWeatherClient {
    async fn fetch(&self, point: GeoPoint) -> Result<TelemetrySample, TelemetryError> {
        if self.config.api_key.trim().is_empty() {
            return Err(TelemetryError::NotConfigured("OPENWEATHER_API_KEY is empty"));
        }

        let response = self
            .client
            .get(&self.config.api_url)
            .query(&[
                ("lat", point.latitude.to_string()),
                ("lon", point.longitude.to_string()),
                ("appid", self.config.api_key.clone()),
            ])
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TelemetryError::Status(response.status().as_u16()));
        }

        let body: OpenWeatherResponse = response.json().await?;
        Ok(TelemetrySample::from(body))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn full_response_maps_to_sample() {
        let json = r#"{
            "weather": [{"id": 501, "main": "Rain", "description": "moderate rain"}],
            "main": {"temp": 301.0, "feels_like": 305.2, "pressure": 995, "humidity": 90},
            "wind": {"speed": 4.1, "deg": 250},
            "name": "Bengaluru"
        }"#;
        let response: OpenWeatherResponse = serde_json::from_str(json).unwrap();
        let sample = TelemetrySample::from(response);
        assert_eq!(sample.temperature, Some(301.0));
        assert_eq!(sample.humidity, Some(90.0));
        assert_eq!(sample.pressure, Some(995.0));
        assert_eq!(sample.wind_speed, Some(4.1));
        assert_eq!(sample.condition.as_deref(), Some("Rain"));
        assert_eq!(sample.description.as_deref(), Some("moderate rain"));
    }

    #[test]
    fn missing_sections_become_none() {
        let response: OpenWeatherResponse = serde_json::from_str(r#"{"name": "Nowhere"}"#).unwrap();
        assert_eq!(TelemetrySample::from(response), TelemetrySample::default());
    }

    #[tokio::test]
    async fn empty_api_key_is_not_configured() {
        let client = OpenWeatherClient::new(OpenWeatherConfig {
            api_url: DEFAULT_OPENWEATHER_URL.into(),
            api_key: String::new(),
            timeout: Duration::from_secs(1),
        })
        .unwrap();
        let result = client.fetch(GeoPoint::new(12.97, 77.59)).await;
        assert_matches!(result, Err(TelemetryError::NotConfigured(_)));
    }
}
