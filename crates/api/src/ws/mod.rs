//! WebSocket pub/sub surface.
//!
//! Connections authenticate during the HTTP upgrade, then subscribe to
//! destinations with JSON frames. [`WsManager`] holds the per-connection
//! identity and subscription set and is the [`hazard_events::Transport`]
//! the notification gateway publishes through.

mod handler;
mod heartbeat;
pub mod manager;
pub mod protocol;

pub use handler::{ws_handler, HandshakeError};
pub use heartbeat::start_heartbeat;
pub use manager::{SubscribeError, WsManager};
