//! Wire protocol for omok-arena.
//!
//! This crate defines the language that clients and the server speak:
//!
//! - **Types** ([`ClientCommand`], [`ServerEvent`], [`Board`],
//!   [`MatchSnapshot`], etc.) — the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong doing that.
//!
//! The protocol layer sits between transport (raw frames) and the game
//! core. It doesn't know about connections or rooms — it only knows how
//! to describe and serialize messages.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Board, ClientCommand, MatchPhase, MatchSnapshot, Outcome, Participant,
    PlayerId, Position, Role, RoomId, RoomStatus, RoomSummary, ServerEvent,
    Stone, BOARD_SIZE,
};
