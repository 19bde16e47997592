//! Error types shared across the firmware.
//!
//! Every variant is `Copy` so errors can be handed to the controller,
//! logged and dropped without allocation.  None of them is fatal: the
//! schedule controller absorbs all of them and keeps running.

use core::fmt;

use crate::rpc::http::HttpStatus;

// ---------------------------------------------------------------------------
// Buffer errors
// ---------------------------------------------------------------------------

/// A fixed-capacity [`ByteSink`](crate::buffer::ByteSink) ran out of room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferFull;

impl fmt::Display for BufferFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buffer full")
    }
}

impl std::error::Error for BufferFull {}

// ---------------------------------------------------------------------------
// Codec errors
// ---------------------------------------------------------------------------

/// Failures while decoding a binary message from a byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The stream ended in the middle of a key, varint or length-delimited field.
    Truncated,
    /// A field key carried a wire type outside the recognized encodings.
    UnknownWireType(u8),
    /// A field key carried tag number zero.
    InvalidTag,
    /// A varint ran past ten bytes.
    VarintOverflow,
    /// A known field arrived with the wrong wire type.
    WireTypeMismatch { tag: u32 },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated => write!(f, "message truncated"),
            Self::UnknownWireType(wt) => write!(f, "unknown wire type {wt}"),
            Self::InvalidTag => write!(f, "invalid field tag 0"),
            Self::VarintOverflow => write!(f, "varint overflow"),
            Self::WireTypeMismatch { tag } => write!(f, "wrong wire type for field {tag}"),
        }
    }
}

impl std::error::Error for DecodeError {}

// ---------------------------------------------------------------------------
// Check-in errors
// ---------------------------------------------------------------------------

/// Classified failure of one check-in round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInError {
    /// Connect refused, send failed, or the connection dropped before the
    /// response headers completed.
    Transport,
    /// The server answered with a status other than 200.
    BadStatus(HttpStatus),
    /// Status was OK but the body did not decode.
    MalformedBody(DecodeError),
    /// The request or response did not fit the I/O buffer.
    BufferOverflow,
}

impl fmt::Display for CheckInError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "transport failure"),
            Self::BadStatus(status) => write!(f, "bad HTTP status: {status}"),
            Self::MalformedBody(e) => write!(f, "malformed body: {e}"),
            Self::BufferOverflow => write!(f, "I/O buffer overflow"),
        }
    }
}

impl std::error::Error for CheckInError {}

impl From<DecodeError> for CheckInError {
    fn from(e: DecodeError) -> Self {
        Self::MalformedBody(e)
    }
}

impl From<BufferFull> for CheckInError {
    fn from(_: BufferFull) -> Self {
        Self::BufferOverflow
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from loading or validating [`FeederConfig`](crate::config::FeederConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The JSON blob could not be parsed.
    Parse,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse => write!(f, "config parse error"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
