use std::time::Duration;

use hazard_core::error::CoreError;

/// Error type for telemetry fetches.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("telemetry request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("telemetry provider returned HTTP {0}")]
    Status(u16),

    #[error("telemetry fetch timed out after {0:?}")]
    Timeout(Duration),

    #[error("telemetry provider is not configured: {0}")]
    NotConfigured(&'static str),
}

/// Cycle-ending failures. Per-candidate and per-subscriber failures are
/// counted in the cycle report instead.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error(transparent)]
    Core(#[from] CoreError),
}
