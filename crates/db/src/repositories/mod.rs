//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument and return row models.

pub mod alert_repo;
pub mod emergency_request_repo;
pub mod notification_log_repo;
pub mod subscriber_alert_repo;
pub mod subscriber_repo;

pub use alert_repo::AlertRepo;
pub use emergency_request_repo::EmergencyRequestRepo;
pub use notification_log_repo::NotificationLogRepo;
pub use subscriber_alert_repo::SubscriberAlertRepo;
pub use subscriber_repo::SubscriberRepo;
