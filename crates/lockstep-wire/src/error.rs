//! Crate-local error type.

use thiserror::Error;

/// Errors surfaced while framing or parsing wire messages (spec.md §7).
#[derive(Debug, Error)]
pub enum WireError {
    /// The length prefix exceeds [`crate::framing::MAX_FRAME_LEN`], or the
    /// tag byte names a message type outside the closed set. Local
    /// recovery: drop the frame, log, keep reading.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// Parsing recovered no valid tag byte and the following bytes do not
    /// look like a plausible length prefix either. Local recovery:
    /// disconnect -- the stream can no longer be trusted to realign.
    #[error("stream desynchronised")]
    StreamDesynchronised,

    /// A payload of a recognised message type failed to decode as its
    /// expected protobuf shape.
    #[error("failed to decode {message_type} payload: {source}")]
    Decode { message_type: &'static str, #[source] source: prost::DecodeError },
}
