//! Authentication primitives.
//!
//! - [`jwt`] -- HS256 access-token validation (and minting for tests and
//!   local tooling).

pub mod jwt;
