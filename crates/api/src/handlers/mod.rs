pub mod admin;
pub mod alert;
pub mod notification_log;
