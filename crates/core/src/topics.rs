//! Pub/sub destinations and per-subscription authorization.
//!
//! A destination string is parsed once, at subscribe or publish time, into
//! the closed [`Destination`] variant. Delivery matches on the variant and
//! never re-parses strings.
//!
//! ```text
//! /topic/global                              Global
//! /topic/user/{email}                        UserScoped
//! /topic/role/{role}/alerts                  RoleScoped, partition GLOBAL
//! /topic/role/{role}/alerts/{PARTITION}      RoleScoped
//! ```
//!
//! User and role topics live under disjoint prefixes, so a role named
//! `user` can not be confused with a subscriber topic.

use std::fmt;

use serde::Serialize;

use crate::identity::SessionIdentity;

pub const TOPIC_PREFIX: &str = "/topic/";
pub const TOPIC_GLOBAL: &str = "/topic/global";
pub const TOPIC_USER_PREFIX: &str = "/topic/user/";
pub const TOPIC_ROLE_PREFIX: &str = "/topic/role/";

/// Partition used when a role-scoped delivery carries no scope key.
pub const DEFAULT_PARTITION: &str = "GLOBAL";

const ROLE_TOPIC_SEGMENT: &str = "alerts";

// ---------------------------------------------------------------------------
// Destination
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Destination {
    /// Delivered to connections whose identity holds `role`.
    RoleScoped { role: String, partition: String },
    /// Delivered to the connection(s) of one subscriber.
    UserScoped { email: String },
    /// Delivered to every authenticated connection that subscribed.
    Global,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DestinationError {
    #[error("subscription request has no destination")]
    Missing,

    #[error("unsupported destination '{0}'")]
    Unsupported(String),
}

impl Destination {
    /// Role-scoped destination, partitioned by a sanitized scope key.
    pub fn role(role: &str, scope_key: Option<&str>) -> Self {
        Self::RoleScoped {
            role: role.trim().to_ascii_lowercase(),
            partition: sanitize_scope_key(scope_key),
        }
    }

    pub fn user(email: &str) -> Self {
        Self::UserScoped {
            email: email.trim().to_string(),
        }
    }

    /// Parse a client-supplied destination string.
    pub fn parse(raw: Option<&str>) -> Result<Self, DestinationError> {
        let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or(DestinationError::Missing)?;
        let unsupported = || DestinationError::Unsupported(raw.to_string());

        let rest = raw.strip_prefix(TOPIC_PREFIX).ok_or_else(unsupported)?;

        if rest == "global" {
            return Ok(Self::Global);
        }

        if let Some(email) = rest.strip_prefix("user/") {
            if email.is_empty() || email.contains('/') {
                return Err(unsupported());
            }
            return Ok(Self::user(email));
        }

        let rest = rest.strip_prefix("role/").ok_or_else(unsupported)?;
        let mut segments = rest.splitn(3, '/');
        let role = segments.next().unwrap_or_default();
        let kind = segments.next();
        let partition = segments.next();

        let valid_role = !role.is_empty()
            && role.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_role || kind != Some(ROLE_TOPIC_SEGMENT) {
            return Err(unsupported());
        }
        if partition.is_some_and(|p| p.is_empty() || p.contains('/')) {
            return Err(unsupported());
        }

        Ok(Self::role(role, partition))
    }

    /// Canonical destination string.
    pub fn path(&self) -> String {
        match self {
            Self::RoleScoped { role, partition } => {
                format!("{TOPIC_ROLE_PREFIX}{role}/{ROLE_TOPIC_SEGMENT}/{partition}")
            }
            Self::UserScoped { email } => format!("{TOPIC_USER_PREFIX}{email}"),
            Self::Global => TOPIC_GLOBAL.to_string(),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Normalise a scope key into a partition name.
///
/// Trimmed, uppercased, spaces replaced by underscores. Absent or blank keys
/// map to [`DEFAULT_PARTITION`]. `" New York "` becomes `NEW_YORK`.
pub fn sanitize_scope_key(scope_key: Option<&str>) -> String {
    match scope_key.map(str::trim).filter(|s| !s.is_empty()) {
        Some(key) => key.to_uppercase().replace(' ', "_"),
        None => DEFAULT_PARTITION.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Authorization
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubscriptionDenied {
    #[error("role '{0}' required")]
    MissingRole(String),

    #[error("user topics are restricted to their owner")]
    ForeignUserTopic,
}

/// Decide whether `identity` may subscribe to `destination`.
pub fn authorize_subscription(
    identity: &SessionIdentity,
    destination: &Destination,
) -> Result<(), SubscriptionDenied> {
    match destination {
        Destination::RoleScoped { role, .. } => {
            if identity.has_role(role) {
                Ok(())
            } else {
                Err(SubscriptionDenied::MissingRole(role.clone()))
            }
        }
        Destination::UserScoped { email } => {
            if email == identity.subject() {
                Ok(())
            } else {
                Err(SubscriptionDenied::ForeignUserTopic)
            }
        }
        Destination::Global => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
