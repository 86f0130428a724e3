//! JSON frames exchanged over the WebSocket.
//!
//! ```text
//! client -> server   {"type":"subscribe","destination":"/topic/global"}
//!                    {"type":"unsubscribe","destination":"/topic/global"}
//! server -> client   {"type":"message","destination":"...","body":"...","timestamp":"..."}
//! ```

use serde::{Deserialize, Serialize};

use hazard_core::types::Timestamp;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Subscribe {
        #[serde(default)]
        destination: Option<String>,
    },
    Unsubscribe {
        #[serde(default)]
        destination: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    Message {
        destination: String,
        body: String,
        timestamp: Timestamp,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_frame_without_destination_parses_as_none() {
        let frame: ClientFrame = serde_json::from_str(r#"{"type":"subscribe"}"#).unwrap();
        assert_eq!(frame, ClientFrame::Subscribe { destination: None });
    }

    #[test]
    fn unknown_frame_type_is_an_error() {
        assert!(serde_json::from_str::<ClientFrame>(r#"{"type":"publish"}"#).is_err());
    }

    #[test]
    fn message_frame_is_tagged() {
        let frame = ServerFrame::Message {
            destination: "/topic/global".into(),
            body: "hello".into(),
            timestamp: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "message");
        assert_eq!(json["destination"], "/topic/global");
        assert_eq!(json["body"], "hello");
    }
}
