//! Domain model and pure logic for the hazard alerting service.
//!
//! Nothing in this crate performs network or database I/O. Collaborators
//! (stores, the subscriber registry, the credential validator) are traits in
//! [`store`] and [`identity`] so the pipeline and API crates can inject
//! PostgreSQL, JWT, or in-memory implementations.

pub mod alert;
pub mod error;
pub mod escalation;
pub mod geo;
pub mod identity;
pub mod memory;
pub mod notification;
pub mod roles;
pub mod rules;
pub mod store;
pub mod subscriber;
pub mod telemetry;
pub mod topics;
pub mod types;
