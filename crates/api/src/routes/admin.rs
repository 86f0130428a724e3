//! Route definitions for `/admin`. Every handler requires the `ADMIN` role.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{admin, notification_log};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// POST   /alerts                       -> create_alert
/// POST   /alerts/test                  -> send_test_alert
/// GET    /notifications                -> list_logs
/// GET    /notifications/type/{type}    -> list_logs_by_type
/// GET    /notifications/user/{email}   -> list_logs_by_recipient
/// POST   /monitor/run                  -> run_monitor
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/alerts", post(admin::create_alert))
        .route("/alerts/test", post(admin::send_test_alert))
        .route("/notifications", get(notification_log::list_logs))
        .route(
            "/notifications/type/{type}",
            get(notification_log::list_logs_by_type),
        )
        .route(
            "/notifications/user/{email}",
            get(notification_log::list_logs_by_recipient),
        )
        .route("/monitor/run", post(admin::run_monitor))
}
