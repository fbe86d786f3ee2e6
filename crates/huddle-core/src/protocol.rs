//! Reserved control messages.
//!
//! Peer payloads are opaque to the relay; these are the only messages the
//! relay produces on its own. The wire form is a JSON envelope with a
//! `type` tag so clients can dispatch on it alongside their own signaling
//! messages (offers, answers, candidates).

use serde::Serialize;

/// Control messages originated by the relay itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    /// A member of the room disconnected; remaining peers should tear down
    /// their peer connection to it.
    EndCall,
}

impl ControlMessage {
    /// Serialized wire form of the message.
    pub fn to_payload(self) -> String {
        // A tagged unit variant cannot fail to serialize
        serde_json::to_string(&self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_call_wire_form() {
        assert_eq!(ControlMessage::EndCall.to_payload(), r#"{"type":"end_call"}"#);
    }
}
