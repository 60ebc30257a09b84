//! # omok-arena
//!
//! A one-host-vs-many-challengers Gomoku server.
//!
//! A single host plays an independent, simultaneous 15×15 board against
//! each challenger in the room: the host's moves are replicated onto
//! every live board, while each challenger's replies land only on their
//! own. First five-in-a-row on a board ends that board's match.
//!
//! This crate is the serving layer. It wires the workspace together:
//!
//! - `omok-transport` accepts WebSocket connections,
//! - `omok-protocol` frames commands and events as JSON,
//! - `omok-gateway` tracks who is connected and who hears what,
//! - `omok-room` owns the rules, the rooms, and the directory,
//! - the coordinator task in here serializes every command and decides
//!   the fan-out.

mod coordinator;
mod error;
mod handler;
mod server;

pub use error::ArenaError;
pub use server::{Server, ServerBuilder};
