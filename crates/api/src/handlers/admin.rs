//! Admin-only operations: manual alerts, test pings, and the manual
//! monitoring trigger.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use hazard_core::alert::{AlertCategory, AlertEvent, AlertSeverity, AlertSource, NewAlertEvent};
use hazard_core::error::CoreError;
use hazard_core::roles::ROLE_ADMIN;
use hazard_events::DeliveryOutcome;
use hazard_pipeline::RunOutcome;

use crate::error::{AppError, AppResult};
use crate::extract;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Manual alerts
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/alerts`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAlertRequest {
    pub category: AlertCategory,
    pub severity: AlertSeverity,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
}

/// POST /api/v1/admin/alerts
///
/// Persists a MANUAL alert, notifies admins on the location partition and
/// broadcasts the message on the global topic.
pub async fn create_alert(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    extract::Json(input): extract::Json<CreateAlertRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AlertEvent>>)> {
    input.validate()?;

    let alert = state
        .alert_service
        .create_manual(NewAlertEvent {
            category: input.category,
            severity: input.severity,
            location: input.location.trim().to_string(),
            latitude: input.latitude,
            longitude: input.longitude,
            message: input.message.trim().to_string(),
            source: AlertSource::Manual,
        })
        .await?;

    tracing::info!(alert_id = alert.id, by = %admin.email(), "Manual alert created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: alert })))
}

// ---------------------------------------------------------------------------
// Test ping
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct TestAlertResponse {
    pub status: &'static str,
    /// Connections the ping was handed to.
    pub delivered: usize,
}

/// POST /api/v1/admin/alerts/test
///
/// Sends a `TEST_ALERT` JSON payload on the admin topic's default partition.
pub async fn send_test_alert(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<TestAlertResponse>>> {
    let payload = json!({
        "type": "TEST_ALERT",
        "message": "System working!",
        "time": Utc::now(),
    })
    .to_string();

    let outcome = state.gateway.notify_role(ROLE_ADMIN, &payload, None).await;
    let delivered = match outcome {
        DeliveryOutcome::Delivered(n) => n,
        DeliveryOutcome::Failed | DeliveryOutcome::Skipped => 0,
    };

    Ok(Json(DataResponse {
        data: TestAlertResponse {
            status: "Test alert sent",
            delivered,
        },
    }))
}

// ---------------------------------------------------------------------------
// Manual monitoring trigger
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/monitor/run
///
/// Runs one cycle through the same single-flight guard as the scheduler.
/// `409` when a cycle is already running, `502` when the cycle failed.
pub async fn run_monitor(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<DataResponse<RunOutcome>>)> {
    tracing::info!(by = %admin.email(), "Manual monitoring cycle requested");

    let outcome = state.runner.try_run().await;
    let status = match &outcome {
        RunOutcome::Completed { .. } => StatusCode::OK,
        RunOutcome::Failed { .. } => StatusCode::BAD_GATEWAY,
        RunOutcome::Skipped => {
            return Err(AppError::Core(CoreError::Conflict(
                "A monitoring cycle is already running".into(),
            )));
        }
    };
    Ok((status, Json(DataResponse { data: outcome })))
}
