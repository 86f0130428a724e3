//! Well-known role name constants.
//!
//! These must match the `roles` claim minted by the credential issuer.

pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_USER: &str = "USER";
