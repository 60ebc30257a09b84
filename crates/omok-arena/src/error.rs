//! Unified error type for the omok-arena server.

use omok_protocol::ProtocolError;
use omok_room::RoomError;
use omok_transport::TransportError;

/// Top-level error that wraps the crate-specific errors.
///
/// The `#[from]` attributes auto-generate `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, not joinable, invalid move).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The coordinator task is gone; no commands can be processed.
    #[error("coordinator unavailable")]
    CoordinatorGone,
}
