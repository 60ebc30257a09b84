//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding wire messages.
///
/// The inner `serde_json::Error` is wrapped so callers deal with
/// `ProtocolError` uniformly regardless of which codec produced it.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed. Common causes: malformed JSON, a missing
    /// field, an unknown `type` tag, or a truncated frame.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
