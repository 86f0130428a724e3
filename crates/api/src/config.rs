use std::time::Duration;

use hazard_core::escalation::DEFAULT_COOLDOWN_MINUTES;
use hazard_core::geo::{GeoPoint, MonitoredLocation, DEFAULT_MATCH_RADIUS_KM};
use hazard_pipeline::telemetry::DEFAULT_OPENWEATHER_URL;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on a single WebSocket delivery in seconds (default: `5`).
    pub delivery_timeout_secs: u64,
    /// JWT validation settings.
    pub jwt: JwtConfig,
    /// Scheduled weather monitoring.
    pub monitor: MonitorConfig,
}

/// Settings for the scheduled monitoring cycle.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Seconds between cycles (default: `600`).
    pub interval_secs: u64,
    /// Subscriber matching radius in km (default: `20`).
    pub radius_km: f64,
    pub escalation_cooldown_minutes: i64,
    pub telemetry_timeout_secs: u64,
    pub openweather_api_key: String,
    pub openweather_api_url: String,
}

impl MonitorConfig {
    pub fn location(&self) -> MonitoredLocation {
        MonitoredLocation {
            name: self.location_name.clone(),
            point: GeoPoint::new(self.latitude, self.longitude),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn telemetry_timeout(&self) -> Duration {
        Duration::from_secs(self.telemetry_timeout_secs)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            location_name: "Bengaluru".into(),
            latitude: 12.97,
            longitude: 77.59,
            interval_secs: 600,
            radius_km: DEFAULT_MATCH_RADIUS_KM,
            escalation_cooldown_minutes: DEFAULT_COOLDOWN_MINUTES,
            telemetry_timeout_secs: 10,
            openweather_api_key: String::new(),
            openweather_api_url: DEFAULT_OPENWEATHER_URL.into(),
        }
    }
}

/// Read `name`, falling back to `default`, and parse it. Panics with a
/// readable message when the value does not parse.
fn env_parse<T>(name: &str, default: &str) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(name).unwrap_or_else(|_| default.into());
    raw.trim()
        .parse()
        .unwrap_or_else(|e| panic!("{name} must be valid ({raw:?}): {e}"))
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                                            |
    /// |-------------------------------|----------------------------------------------------|
    /// | `HOST`                        | `0.0.0.0`                                          |
    /// | `PORT`                        | `8080`                                             |
    /// | `CORS_ORIGINS`                | `http://localhost:5173`                            |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                                               |
    /// | `DELIVERY_TIMEOUT_SECS`       | `5`                                                |
    /// | `MONITOR_LOCATION_NAME`       | `Bengaluru`                                        |
    /// | `MONITOR_LATITUDE`            | `12.97`                                            |
    /// | `MONITOR_LONGITUDE`           | `77.59`                                            |
    /// | `MONITOR_INTERVAL_SECS`       | `600`                                              |
    /// | `MONITOR_RADIUS_KM`           | `20`                                               |
    /// | `ESCALATION_COOLDOWN_MINUTES` | `30`                                               |
    /// | `TELEMETRY_TIMEOUT_SECS`      | `10`                                               |
    /// | `OPENWEATHER_API_KEY`         | empty                                              |
    /// | `OPENWEATHER_API_URL`         | `https://api.openweathermap.org/data/2.5/weather`  |
    ///
    /// JWT settings are read by [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_parse("PORT", "8080");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let defaults = MonitorConfig::default();
        let monitor = MonitorConfig {
            location_name: std::env::var("MONITOR_LOCATION_NAME")
                .unwrap_or(defaults.location_name),
            latitude: env_parse("MONITOR_LATITUDE", "12.97"),
            longitude: env_parse("MONITOR_LONGITUDE", "77.59"),
            interval_secs: env_parse("MONITOR_INTERVAL_SECS", "600"),
            radius_km: env_parse("MONITOR_RADIUS_KM", "20"),
            escalation_cooldown_minutes: env_parse("ESCALATION_COOLDOWN_MINUTES", "30"),
            telemetry_timeout_secs: env_parse("TELEMETRY_TIMEOUT_SECS", "10"),
            openweather_api_key: std::env::var("OPENWEATHER_API_KEY").unwrap_or_default(),
            openweather_api_url: std::env::var("OPENWEATHER_API_URL")
                .unwrap_or(defaults.openweather_api_url),
        };
        assert!(monitor.interval_secs > 0, "MONITOR_INTERVAL_SECS must be positive");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", "30"),
            delivery_timeout_secs: env_parse("DELIVERY_TIMEOUT_SECS", "5"),
            jwt: JwtConfig::from_env(),
            monitor,
        }
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery_timeout_secs)
    }
}
