//! Notification audit trail types.
//!
//! One [`NotificationLogEntry`] is written for every delivery attempt made by
//! the gateway, whether it succeeded or not.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::ROLE_ADMIN;
use crate::types::{DbId, Timestamp};

/// Transport identifier recorded for pub/sub deliveries.
pub const CHANNEL_WEBSOCKET: &str = "WEBSOCKET";

/// Addressing mode of a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    User,
    Admin,
    Broadcast,
}

impl NotificationType {
    /// Audit type for a role-scoped delivery: `ADMIN` for the admin role,
    /// `USER` for any other role.
    pub fn for_role(role: &str) -> Self {
        if role.trim().eq_ignore_ascii_case(ROLE_ADMIN) {
            Self::Admin
        } else {
            Self::User
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
            Self::Broadcast => "BROADCAST",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            "BROADCAST" => Ok(Self::Broadcast),
            other => Err(CoreError::Validation(format!(
                "Notification type must be USER, ADMIN, or BROADCAST (got '{other}')"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationLogEntry {
    pub id: DbId,
    /// Absent for role-scoped and broadcast deliveries.
    pub recipient: Option<String>,
    pub notification_type: NotificationType,
    pub channel: String,
    pub message: String,
    pub sent: bool,
    pub error: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNotificationLog {
    pub recipient: Option<String>,
    pub notification_type: NotificationType,
    pub channel: String,
    pub message: String,
    pub sent: bool,
    pub error: Option<String>,
}

impl NewNotificationLog {
    pub fn delivered(
        recipient: Option<String>,
        notification_type: NotificationType,
        message: &str,
    ) -> Self {
        Self {
            recipient,
            notification_type,
            channel: CHANNEL_WEBSOCKET.to_string(),
            message: message.to_string(),
            sent: true,
            error: None,
        }
    }

    /// A failed attempt. An empty error text is replaced so the entry always
    /// carries a reason.
    pub fn failed(
        recipient: Option<String>,
        notification_type: NotificationType,
        message: &str,
        error: impl Into<String>,
    ) -> Self {
        let mut error = error.into();
        if error.trim().is_empty() {
            error = "unknown delivery failure".to_string();
        }
        Self {
            recipient,
            notification_type,
            channel: CHANNEL_WEBSOCKET.to_string(),
            message: message.to_string(),
            sent: false,
            error: Some(error),
        }
    }
}
