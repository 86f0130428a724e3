//! Hazard notification delivery.
//!
//! - [`NotificationGateway`] -- the three delivery operations (subscriber,
//!   role-scoped, broadcast), each bounded by a timeout and audit-logged.
//! - [`Transport`] -- the seam to the connection layer that actually pushes
//!   frames to subscribed clients.

pub mod gateway;
pub mod transport;

pub use gateway::{DeliveryOutcome, NotificationGateway};
pub use transport::{DeliveryError, Transport};
