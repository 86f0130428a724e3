pub mod admin;
pub mod alert;
pub mod health;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws                                  WebSocket (?token= or Bearer)
///
/// /alerts                              filtered list (admin)
/// /alerts/all                          every alert (admin)
/// /alerts/latest                       latest 20 (public)
/// /alerts/recent                       last N hours (public)
/// /alerts/near                         within radius (public)
/// /alerts/my                           caller's alert copies (auth)
/// /alerts/{id}/acknowledge             acknowledge (PUT, admin)
///
/// /admin/alerts                        create manual alert (POST)
/// /admin/alerts/test                   admin test ping (POST)
/// /admin/notifications                 audit log
/// /admin/notifications/type/{type}     audit log by type
/// /admin/notifications/user/{email}    audit log by recipient
/// /admin/monitor/run                   run one cycle now (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/alerts", alert::router())
        .nest("/admin", admin::router())
}
