//! Monitoring pipeline: telemetry fetch, rule evaluation, persistence,
//! geospatial matching, escalation, and fan-out.
//!
//! - [`telemetry`] -- the provider seam and the OpenWeather client.
//! - [`alerts::AlertService`] -- validate, persist, and announce alerts.
//! - [`escalation::EscalationController`] -- cooldown-guarded auto-SOS.
//! - [`cycle::MonitorCycle`] -- one end-to-end cycle.
//! - [`runner::CycleRunner`] -- single-flight wrapper used by the scheduler
//!   and the manual trigger.

pub mod alerts;
pub mod cycle;
pub mod error;
pub mod escalation;
pub mod runner;
pub mod telemetry;

pub use alerts::AlertService;
pub use cycle::{CycleReport, CycleSettings, MonitorCycle};
pub use error::{PipelineError, TelemetryError};
pub use escalation::EscalationController;
pub use runner::{CycleRunner, RunOutcome};
pub use telemetry::{OpenWeatherClient, OpenWeatherConfig, TelemetryProvider};
