//! Authenticated identity attached to a pub/sub connection.
//!
//! The credential validator (JWT in production) turns a bearer token into a
//! [`Credential`]; the handshake then freezes it into a [`SessionIdentity`]
//! owned by the connection for its whole lifetime.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::roles::ROLE_ADMIN;
use crate::types::Timestamp;

/// Claims resolved from a valid bearer credential.
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    pub subject: String,
    pub roles: BTreeSet<String>,
    pub expires_at: Timestamp,
}

/// Why a bearer credential was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("credential is malformed or its signature is invalid")]
    Invalid,

    #[error("credential has expired")]
    Expired,

    #[error("credential has no subject")]
    MissingSubject,
}

/// Validates bearer credentials (signature, expiry, subject).
pub trait CredentialValidator: Send + Sync {
    fn validate(&self, token: &str) -> Result<Credential, CredentialError>;
}

/// Immutable identity of one connection: subject plus role set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionIdentity {
    subject: String,
    roles: BTreeSet<String>,
}

impl SessionIdentity {
    pub fn new(subject: impl Into<String>, roles: impl IntoIterator<Item = String>) -> Self {
        Self {
            subject: subject.into(),
            roles: roles.into_iter().collect(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    /// Role names are compared case-insensitively.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }
}

impl From<Credential> for SessionIdentity {
    fn from(credential: Credential) -> Self {
        Self {
            subject: credential.subject,
            roles: credential.roles,
        }
    }
}
