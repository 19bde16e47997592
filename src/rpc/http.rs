//! Minimal HTTP/1.0 envelope: request writer and incremental response parser.
//!
//! The parser is pure and byte-driven.  It never sees the transport; the
//! caller pulls bytes from wherever they come from and pushes them in one
//! at a time.
//!
//! ```text
//!  StatusLine ──CRLF──▶ Headers ──CRLFCRLF──▶ Body ──disconnect──▶ Done
//!  Version ─SP─▶ Code (3 bytes verbatim) ─▶ Reason
//! ```
//!
//! Line ends are found with a rolling counter: `\r` at an even count and
//! `\n` at an odd count increment it, anything else resets it.  A count of
//! 2 ends a line, 4 ends the header block.

use core::fmt::{self, Write as _};

use super::codec::Message;
use crate::buffer::ByteSink;
use crate::error::BufferFull;

/// Length of the numeric status code in the status line.
const STATUS_CODE_LEN: usize = 3;

// ---------------------------------------------------------------------------
// Status classification
// ---------------------------------------------------------------------------

/// Closed classification of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpStatus {
    Ok,
    BadRequest,
    ServerError,
    Unavailable,
    /// Any other three-byte code.
    Unknown,
    /// The stream ended before the header block completed.
    TransportError,
}

impl HttpStatus {
    /// Classify the three status-code bytes exactly as received.
    pub fn from_code(code: &[u8; STATUS_CODE_LEN]) -> Self {
        match code {
            b"200" => Self::Ok,
            b"400" => Self::BadRequest,
            b"500" => Self::ServerError,
            b"503" => Self::Unavailable,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ok => "200 OK",
            Self::BadRequest => "400 Bad Request",
            Self::ServerError => "500 Internal Server Error",
            Self::Unavailable => "503 Service Unavailable",
            Self::Unknown => "unknown status",
            Self::TransportError => "transport error",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Response parser
// ---------------------------------------------------------------------------

/// Position inside the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusField {
    Version,
    /// Capturing the code; `captured` bytes stored so far.
    Code { captured: u8 },
    Reason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    StatusLine(StatusField),
    Headers,
    Body,
    Done,
}

/// Byte-at-a-time HTTP response parser.
#[derive(Debug, Clone)]
pub struct HttpResponseParser {
    state: ParseState,
    line_end: u8,
    code: [u8; STATUS_CODE_LEN],
    status: Option<HttpStatus>,
}

impl Default for HttpResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpResponseParser {
    pub const fn new() -> Self {
        Self {
            state: ParseState::StatusLine(StatusField::Version),
            line_end: 0,
            code: [0; STATUS_CODE_LEN],
            status: None,
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Classification, available once the header block has ended.
    pub fn status(&self) -> Option<HttpStatus> {
        self.status
    }

    /// Consume one byte.  Body bytes are appended to `body`.
    pub fn feed<S: ByteSink>(&mut self, byte: u8, body: &mut S) -> Result<(), BufferFull> {
        match self.state {
            ParseState::Done => Ok(()),
            ParseState::Body => body.put(byte),
            ParseState::StatusLine(StatusField::Code { captured }) => {
                self.capture_code(captured, byte);
                Ok(())
            }
            ParseState::StatusLine(_) | ParseState::Headers => {
                self.header_byte(byte);
                Ok(())
            }
        }
    }

    /// Signal end of stream and return the final classification.
    pub fn finish(&mut self) -> HttpStatus {
        self.state = ParseState::Done;
        self.status.unwrap_or(HttpStatus::TransportError)
    }

    fn capture_code(&mut self, captured: u8, byte: u8) {
        let idx = usize::from(captured);
        self.code[idx] = byte;
        self.state = if idx + 1 == STATUS_CODE_LEN {
            ParseState::StatusLine(StatusField::Reason)
        } else {
            ParseState::StatusLine(StatusField::Code { captured: captured + 1 })
        };
    }

    fn header_byte(&mut self, byte: u8) {
        self.line_end = match byte {
            b'\r' if self.line_end % 2 == 0 => self.line_end + 1,
            b'\n' if self.line_end % 2 == 1 => self.line_end + 1,
            _ => 0,
        };

        if self.line_end >= 4 {
            let status = HttpStatus::from_code(&self.code);
            log::debug!("HTTP | headers complete, status {status}");
            self.status = Some(status);
            self.state = ParseState::Body;
            return;
        }
        if self.line_end == 2 {
            if let ParseState::StatusLine(_) = self.state {
                self.state = ParseState::Headers;
            }
            return;
        }

        if byte == b' ' {
            if let ParseState::StatusLine(StatusField::Version) = self.state {
                self.state = ParseState::StatusLine(StatusField::Code { captured: 0 });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Request writer
// ---------------------------------------------------------------------------

/// Write `GET <path> HTTP/1.0` with Host and Content-Length headers, then
/// the encoded `body`.  Content-Length comes from [`Message::encoded_len`].
pub fn write_request<S: ByteSink, M: Message>(
    sink: &mut S,
    host: &str,
    path: &str,
    body: &M,
) -> Result<(), BufferFull> {
    let mut content_length: heapless::String<20> = heapless::String::new();
    write!(content_length, "{}", body.encoded_len()).map_err(|_| BufferFull)?;

    sink.put_slice(b"GET ")?;
    sink.put_slice(path.as_bytes())?;
    sink.put_slice(b" HTTP/1.0\r\nHost: ")?;
    sink.put_slice(host.as_bytes())?;
    sink.put_slice(b"\r\nContent-Length: ")?;
    sink.put_slice(content_length.as_bytes())?;
    sink.put_slice(b"\r\n\r\n")?;
    body.encode(sink)
}
