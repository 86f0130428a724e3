//! Row models.
//!
//! Each submodule contains a `FromRow` struct matching the table and a
//! `TryFrom` conversion into the domain type. Enumerated columns are stored
//! as TEXT and parsed back through the closed domain enums, so a corrupted
//! value surfaces as an error instead of a silent default.

pub mod alert;
pub mod emergency_request;
pub mod notification_log;
pub mod subscriber;
pub mod subscriber_alert;
