//! Handlers for the `/alerts` resource.
//!
//! `latest`, `recent` and `near` are public. The personal feed needs an
//! authenticated caller; listing, the full dump and acknowledgement are
//! admin only.

use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use serde::Deserialize;

use hazard_core::alert::{AlertCategory, AlertEvent, AlertFilter, AlertSeverity, PerSubscriberAlert};
use hazard_core::geo::{alerts_near, GeoPoint, DEFAULT_NEARBY_RADIUS_KM};
use hazard_core::types::{DbId, Timestamp};

use crate::error::{AppError, AppResult};
use crate::extract::{Path, Query};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Number of alerts returned by `GET /alerts/latest`.
pub const LATEST_ALERTS_LIMIT: i64 = 20;

/// Default look-back window for `GET /alerts/recent`.
const DEFAULT_RECENT_HOURS: i64 = 24;

/// Longest look-back accepted by `GET /alerts/recent` (30 days).
const MAX_RECENT_HOURS: i64 = 24 * 30;

// ---------------------------------------------------------------------------
// Query types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /alerts/recent`.
#[derive(Debug, Deserialize)]
pub struct RecentParams {
    pub hours: Option<i64>,
}

/// Query parameters for `GET /alerts/near`.
#[derive(Debug, Deserialize)]
pub struct NearParams {
    pub lat: f64,
    #[serde(alias = "lon")]
    pub lng: f64,
    /// Radius in km. Missing or non-positive values use the 50 km default.
    pub radius: Option<f64>,
}

/// Query parameters for `GET /alerts`.
#[derive(Debug, Default, Deserialize)]
pub struct AlertListParams {
    pub category: Option<AlertCategory>,
    pub severity: Option<AlertSeverity>,
    pub location: Option<String>,
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
    pub acknowledged: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl AlertListParams {
    fn split(self) -> (AlertFilter, PaginationParams) {
        let filter = AlertFilter {
            category: self.category,
            severity: self.severity,
            location: self.location.filter(|l| !l.trim().is_empty()),
            start: self.start,
            end: self.end,
            acknowledged: self.acknowledged,
        };
        let page = PaginationParams {
            limit: self.limit,
            offset: self.offset,
        };
        (filter, page)
    }
}

// ---------------------------------------------------------------------------
// Public reads
// ---------------------------------------------------------------------------

/// GET /api/v1/alerts/latest
pub async fn latest_alerts(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<AlertEvent>>>> {
    let alerts = state.alerts.latest(LATEST_ALERTS_LIMIT).await?;
    Ok(Json(DataResponse { data: alerts }))
}

/// GET /api/v1/alerts/recent?hours=24
pub async fn recent_alerts(
    State(state): State<AppState>,
    Query(params): Query<RecentParams>,
) -> AppResult<Json<DataResponse<Vec<AlertEvent>>>> {
    let hours = params.hours.unwrap_or(DEFAULT_RECENT_HOURS);
    if !(1..=MAX_RECENT_HOURS).contains(&hours) {
        return Err(AppError::BadRequest(format!(
            "hours must be between 1 and {MAX_RECENT_HOURS}"
        )));
    }
    let since = Utc::now() - Duration::hours(hours);
    let alerts = state.alerts.created_since(since).await?;
    Ok(Json(DataResponse { data: alerts }))
}

/// GET /api/v1/alerts/near?lat=&lng=&radius=
///
/// Alerts within `radius` km (inclusive), most recent first.
pub async fn alerts_near_point(
    State(state): State<AppState>,
    Query(params): Query<NearParams>,
) -> AppResult<Json<DataResponse<Vec<AlertEvent>>>> {
    if !(-90.0..=90.0).contains(&params.lat) || !(-180.0..=180.0).contains(&params.lng) {
        return Err(AppError::BadRequest("Coordinates are out of range".into()));
    }
    let radius = params
        .radius
        .filter(|r| r.is_finite() && *r > 0.0)
        .unwrap_or(DEFAULT_NEARBY_RADIUS_KM);

    let all = state.alerts.all().await?;
    let alerts = alerts_near(GeoPoint::new(params.lat, params.lng), all, radius);
    Ok(Json(DataResponse { data: alerts }))
}

// ---------------------------------------------------------------------------
// Authenticated reads
// ---------------------------------------------------------------------------

/// GET /api/v1/alerts/my
///
/// Per-subscriber alert copies for the caller, most recent first.
pub async fn my_alerts(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<PerSubscriberAlert>>>> {
    let alerts = state.subscriber_alerts.list_for(auth.email()).await?;
    Ok(Json(DataResponse { data: alerts }))
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// GET /api/v1/alerts
///
/// Filtered, paginated listing, most recent first.
pub async fn list_alerts(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<AlertListParams>,
) -> AppResult<Json<DataResponse<Vec<AlertEvent>>>> {
    let (filter, page) = params.split();
    if let (Some(start), Some(end)) = (filter.start, filter.end) {
        if start > end {
            return Err(AppError::BadRequest("start must not be after end".into()));
        }
    }
    let alerts = state
        .alerts
        .list(&filter, page.limit(), page.offset())
        .await?;
    Ok(Json(DataResponse { data: alerts }))
}

/// GET /api/v1/alerts/all
pub async fn all_alerts(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<AlertEvent>>>> {
    let alerts = state.alerts.all().await?;
    Ok(Json(DataResponse { data: alerts }))
}

/// PUT /api/v1/alerts/{id}/acknowledge
pub async fn acknowledge_alert(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AlertEvent>>> {
    let alert = state.alerts.acknowledge(id).await?;
    tracing::info!(alert_id = id, by = %admin.email(), "Alert acknowledged");
    Ok(Json(DataResponse { data: alert }))
}
