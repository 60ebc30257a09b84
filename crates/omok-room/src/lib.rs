//! Room coordination core for omok-arena.
//!
//! One host plays an independent, simultaneous board against each of
//! several challengers. This crate owns everything stateful about that:
//!
//! - [`board`] — pure move/win/draw rules over a board
//! - [`Room`] — one host, its challengers, one match per challenger,
//!   turn arbitration and the pending-reply set
//! - [`RoomDirectory`] — registry of all rooms plus the participant →
//!   room reverse index
//! - [`RoomError`] — why an operation was rejected
//!
//! The crate is purely synchronous: callers (the server's coordinator
//! task) serialize access, so no operation here blocks, suspends, or
//! locks.

pub mod board;
mod directory;
mod error;
mod room;

pub use directory::{Departure, RoomDirectory};
pub use error::RoomError;
pub use room::Room;
