//! Admin queries over the notification audit log.

use axum::extract::State;
use axum::Json;

use hazard_core::notification::{NotificationLogEntry, NotificationType};

use crate::error::AppResult;
use crate::extract::{Path, Query};
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/notifications?limit=
///
/// Most recent first.
pub async fn list_logs(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<NotificationLogEntry>>>> {
    let logs = state.notification_logs.list(page.limit()).await?;
    Ok(Json(DataResponse { data: logs }))
}

/// GET /api/v1/admin/notifications/type/{type}
pub async fn list_logs_by_type(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(raw_type): Path<String>,
) -> AppResult<Json<DataResponse<Vec<NotificationLogEntry>>>> {
    let notification_type: NotificationType = raw_type.parse()?;
    let logs = state.notification_logs.list_by_type(notification_type).await?;
    Ok(Json(DataResponse { data: logs }))
}

/// GET /api/v1/admin/notifications/user/{email}
pub async fn list_logs_by_recipient(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<DataResponse<Vec<NotificationLogEntry>>>> {
    let logs = state.notification_logs.list_by_recipient(email.trim()).await?;
    Ok(Json(DataResponse { data: logs }))
}
