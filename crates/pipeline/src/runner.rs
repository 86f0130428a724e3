//! Single-flight execution of [`MonitorCycle`].
//!
//! The scheduled task and the manual trigger share one runner. A call that
//! arrives while a cycle is in flight returns [`RunOutcome::Skipped`]
//! instead of starting an overlapping cycle.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::cycle::{CycleReport, MonitorCycle};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed { report: CycleReport },
    Failed { error: String },
    /// Another cycle was still running.
    Skipped,
}

pub struct CycleRunner {
    cycle: Arc<MonitorCycle>,
    in_flight: Mutex<()>,
}

impl CycleRunner {
    pub fn new(cycle: Arc<MonitorCycle>) -> Self {
        Self {
            cycle,
            in_flight: Mutex::new(()),
        }
    }

    pub fn cycle(&self) -> &MonitorCycle {
        &self.cycle
    }

    /// Run one cycle unless one is already running. Never panics on cycle
    /// failure; the error is logged and returned as [`RunOutcome::Failed`].
    pub async fn try_run(&self) -> RunOutcome {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::warn!("Monitoring cycle still running, skipping this run");
            return RunOutcome::Skipped;
        };

        match self.cycle.run().await {
            Ok(report) => RunOutcome::Completed { report },
            Err(e) => {
                tracing::error!(error = %e, "Monitoring cycle failed");
                RunOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}
