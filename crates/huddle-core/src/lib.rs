//! Core logic for the huddle signaling relay.
//!
//! Peers join a named room and every message a peer sends is fanned out
//! verbatim to the other members of that room. Payloads are opaque text;
//! the relay tracks membership and routes, nothing more.
//!
//! # Architecture
//!
//! The crate is sans-IO: [`RelayDriver`] consumes [`SessionEvent`]s produced
//! by an external runtime and returns [`RelayAction`]s for that runtime to
//! execute. The driver owns the [`RoomRegistry`], so whoever owns the driver
//! (typically behind a mutex) gets serialized membership mutation and
//! fan-out ordering for free.
//!
//! # Components
//!
//! - [`RoomRegistry`]: room → members mapping with a reverse index for
//!   disconnect cleanup
//! - [`RelayDriver`]: per-session lifecycle and broadcast decisions
//! - [`ControlMessage`]: the reserved payloads the relay itself produces

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod protocol;
mod registry;
mod relay;

pub use protocol::ControlMessage;
pub use registry::{LeaveOutcome, RoomRegistry};
pub use relay::{RelayAction, RelayDriver, SessionEvent};
