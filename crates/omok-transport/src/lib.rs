//! Transport layer for omok-arena.
//!
//! Accepts WebSocket connections and exposes them as a pair of owned
//! halves — a sender and a receiver — so a writer task and a reader task
//! can run concurrently per connection without sharing a lock.
//!
//! The transport moves opaque frames; it never looks inside them.
//! Framing is JSON text on the wire (one command or event per frame),
//! but that is the protocol layer's business.
//!
//! # Feature flags
//!
//! - `websocket` (default) — WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{
    ConnectionReceiver, ConnectionSender, WebSocketConnection,
    WebSocketListener,
};

use std::fmt;

/// Opaque identifier for a connection, for log correlation only —
/// game-level identity is the gateway's `PlayerId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;
}
