//! Relay session state machine.
//!
//! Sans-IO driver in the event → action style: the runtime feeds
//! [`SessionEvent`]s in and executes the returned [`RelayAction`]s. The
//! driver owns the [`RoomRegistry`], so the owner of the driver serializes
//! membership mutation and fan-out ordering across all sessions.
//!
//! Per session the lifecycle is CONNECTING → JOINED → CLOSED: the runtime
//! emits `Joined` once the transport handshake completes, `MessageReceived`
//! for every inbound text frame, and `Disconnected` exactly when the
//! transport closes - whether by peer close, transport error, failed send,
//! or task cancellation. All close causes converge on the same cleanup.

use uuid::Uuid;

use crate::{protocol::ControlMessage, registry::RoomRegistry};

/// Events fed to the driver by the runtime.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Transport handshake completed; the session enters its room.
    Joined {
        /// Session assigned by the runtime
        session_id: Uuid,
        /// Room key extracted from the connection target
        room_key: String,
    },

    /// A text frame arrived from the session.
    MessageReceived {
        /// Session that sent the frame
        session_id: Uuid,
        /// Opaque payload, forwarded verbatim
        payload: String,
    },

    /// The session's transport closed.
    Disconnected {
        /// Session that went away
        session_id: Uuid,
    },
}

/// Actions for the runtime to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayAction {
    /// Hand `payload` to the session's outbound channel.
    Deliver {
        /// Recipient session
        session_id: Uuid,
        /// Text to send
        payload: String,
    },
}

/// Routes messages between the sessions of a room.
///
/// Broadcast reads a membership snapshot at the instant of the call, so a
/// message reaches exactly the sessions that were members when the driver
/// processed it. Failed deliveries are the runtime's concern: it reports
/// them back as `Disconnected`, which cascades into the normal leave path.
#[derive(Debug, Default)]
pub struct RelayDriver {
    registry: RoomRegistry,
}

impl RelayDriver {
    /// Create a new driver with an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Membership view, for diagnostics and tests.
    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// Process one session event and return the deliveries it causes.
    pub fn process_event(&mut self, event: SessionEvent) -> Vec<RelayAction> {
        match event {
            SessionEvent::Joined { session_id, room_key } => {
                self.registry.join(&room_key, session_id);
                tracing::debug!(%session_id, %room_key, "session joined");
                Vec::new()
            },

            SessionEvent::MessageReceived { session_id, payload } => {
                // Race with this session's own disconnect: drop silently
                let Some(room_key) = self.registry.room_of(session_id) else {
                    tracing::debug!(%session_id, "message from unknown session dropped");
                    return Vec::new();
                };

                let recipients: Vec<Uuid> =
                    self.registry.members(room_key).filter(|id| *id != session_id).collect();
                tracing::debug!(%session_id, %room_key, recipients = recipients.len(), "fan-out");

                recipients
                    .into_iter()
                    .map(|id| RelayAction::Deliver { session_id: id, payload: payload.clone() })
                    .collect()
            },

            SessionEvent::Disconnected { session_id } => {
                let Some(outcome) = self.registry.leave(session_id) else {
                    return Vec::new();
                };
                tracing::debug!(
                    %session_id,
                    room_key = %outcome.room_key,
                    remaining = outcome.remaining.len(),
                    "session left"
                );

                let payload = ControlMessage::EndCall.to_payload();
                outcome
                    .remaining
                    .into_iter()
                    .map(|id| RelayAction::Deliver { session_id: id, payload: payload.clone() })
                    .collect()
            },
        }
    }
}
