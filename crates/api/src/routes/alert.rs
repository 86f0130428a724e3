//! Route definitions for the `/alerts` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::alert;
use crate::state::AppState;

/// Routes mounted at `/alerts`.
///
/// ```text
/// GET    /                    -> list_alerts
/// GET    /all                 -> all_alerts
/// GET    /latest              -> latest_alerts
/// GET    /recent              -> recent_alerts
/// GET    /near                -> alerts_near_point
/// GET    /my                  -> my_alerts
/// PUT    /{id}/acknowledge    -> acknowledge_alert
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(alert::list_alerts))
        .route("/all", get(alert::all_alerts))
        .route("/latest", get(alert::latest_alerts))
        .route("/recent", get(alert::recent_alerts))
        .route("/near", get(alert::alerts_near_point))
        .route("/my", get(alert::my_alerts))
        .route("/{id}/acknowledge", put(alert::acknowledge_alert))
}
