//! Session gateway for omok-arena.
//!
//! The gateway is the boundary between connections and the game core:
//! it assigns each accepted connection its [`PlayerId`], owns the
//! outbound event channel per peer, and groups peers by room so the
//! coordinator can broadcast without knowing about sockets.
//!
//! There is deliberately no authentication and no reconnection here —
//! identity lives exactly as long as the connection does.
//!
//! [`PlayerId`]: omok_protocol::PlayerId

mod gateway;

pub use gateway::{EventSender, Gateway};
