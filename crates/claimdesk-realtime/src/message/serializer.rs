//! JSON serialization for realtime frames.

use super::types::{ClientFrame, ServerEvent};

/// Serialize an outbound frame.
pub fn serialize_frame(frame: &ClientFrame) -> Result<String, serde_json::Error> {
    serde_json::to_string(frame)
}

/// Deserialize an inbound event.
pub fn deserialize_event(text: &str) -> Result<ServerEvent, serde_json::Error> {
    serde_json::from_str(text)
}
