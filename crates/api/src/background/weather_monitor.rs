//! Scheduled weather monitoring.
//!
//! Ticks every `MONITOR_INTERVAL_SECS` and runs one cycle through the
//! shared [`CycleRunner`]. A tick that lands while a cycle (scheduled or
//! manual) is still running is skipped. Cycle failures are logged and the
//! loop keeps going.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use hazard_pipeline::{CycleRunner, RunOutcome};

/// Run the monitoring loop until `cancel` is triggered.
///
/// The first cycle starts immediately. A cycle in flight when `cancel` fires
/// is allowed to finish its current step; the loop exits afterwards.
pub async fn run(runner: Arc<CycleRunner>, period: Duration, cancel: CancellationToken) {
    tracing::info!(
        location = %runner.cycle().settings().location.name,
        interval_secs = period.as_secs(),
        "Weather monitor started"
    );

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Weather monitor stopping");
                break;
            }
            _ = interval.tick() => {
                match runner.try_run().await {
                    RunOutcome::Completed { report } => {
                        tracing::debug!(candidates = ?report.candidates, "Weather monitor: cycle complete");
                    }
                    RunOutcome::Failed { error } => {
                        tracing::warn!(error = %error, "Weather monitor: cycle failed, retrying next tick");
                    }
                    RunOutcome::Skipped => {
                        tracing::debug!("Weather monitor: previous cycle still running");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use hazard_core::escalation::EscalationPolicy;
    use hazard_core::geo::GeoPoint;
    use hazard_core::memory::MemoryStore;
    use hazard_core::telemetry::TelemetrySample;
    use hazard_events::NotificationGateway;
    use hazard_pipeline::{
        AlertService, CycleSettings, EscalationController, MonitorCycle, TelemetryError,
        TelemetryProvider,
    };

    use super::*;
    use crate::config::MonitorConfig;
    use crate::ws::WsManager;

    #[derive(Default)]
    struct CountingTelemetry {
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl TelemetryProvider for CountingTelemetry {
        async fn fetch(&self, _: GeoPoint) -> Result<TelemetrySample, TelemetryError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(TelemetrySample::default())
        }
    }

    fn runner(telemetry: Arc<CountingTelemetry>) -> Arc<CycleRunner> {
        let store = Arc::new(MemoryStore::new());
        let gateway = NotificationGateway::new(Arc::new(WsManager::new()), store.clone());
        let cycle = MonitorCycle::new(
            CycleSettings {
                location: MonitorConfig::default().location(),
                radius_km: 20.0,
                telemetry_timeout: Duration::from_secs(1),
            },
            telemetry,
            store.clone(),
            store.clone(),
            AlertService::new(store.clone(), gateway.clone()),
            gateway,
            Arc::new(EscalationController::new(EscalationPolicy::default(), store)),
        );
        Arc::new(CycleRunner::new(Arc::new(cycle)))
    }

    #[tokio::test]
    async fn first_cycle_runs_immediately_and_loop_stops_on_cancel() {
        let telemetry = Arc::new(CountingTelemetry::default());
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(
            runner(telemetry.clone()),
            Duration::from_secs(3600),
            cancel.clone(),
        ));

        tokio::time::timeout(Duration::from_secs(5), async {
            while telemetry.fetches.load(Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("first cycle should run without waiting a full period");

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("loop should stop")
            .unwrap();
        assert_eq!(telemetry.fetches.load(Ordering::SeqCst), 1);
    }
}
