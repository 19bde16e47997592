//! Plain TCP transport adapter.
//!
//! Implements [`Transport`](crate::rpc::transport::Transport) as a TCP
//! client over `std::net`, which ESP-IDF provides on top of lwIP, so the
//! same code runs on device and on the host.
//!
//! ## Connection model
//!
//! 1. `connect()` resolves `host:port` and opens a blocking stream,
//!    trying each resolved address in turn.
//! 2. `send()` writes the whole request and flushes.
//! 3. `read_byte()` pulls from a buffered reader.  EOF, a reset, or an
//!    expired read timeout all report end of stream.
//! 4. `close()` shuts the socket down and drops it; safe to repeat.

use core::fmt;
use core::time::Duration;
use std::io::{BufReader, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};

use log::{debug, warn};

use crate::rpc::transport::Transport;

// ───────────────────────────────────────────────────────────────
// Error type
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcpTransportError {
    /// Name resolution produced no address.
    Resolve,
    /// Every resolved address refused or timed out.
    Connect,
    /// Write failed on an open stream.
    Io,
    /// Operation requires an open connection.
    NotConnected,
}

impl fmt::Display for TcpTransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolve => write!(f, "host name did not resolve"),
            Self::Connect => write!(f, "connection refused"),
            Self::Io => write!(f, "TCP I/O error"),
            Self::NotConnected => write!(f, "not connected"),
        }
    }
}

impl std::error::Error for TcpTransportError {}

// ───────────────────────────────────────────────────────────────
// TcpTransport
// ───────────────────────────────────────────────────────────────

pub struct TcpTransport {
    timeout: Option<Duration>,
    stream: Option<BufReader<TcpStream>>,
}

impl TcpTransport {
    /// `timeout` bounds connect, each read and each write; `None` blocks.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout, stream: None }
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn open(&self, host: &str, port: u16) -> Result<TcpStream, TcpTransportError> {
        let addrs = (host, port).to_socket_addrs().map_err(|e| {
            warn!("TCP | resolve {}:{} failed: {}", host, port, e);
            TcpTransportError::Resolve
        })?;

        let mut resolved = false;
        for addr in addrs {
            resolved = true;
            let attempt = match self.timeout {
                Some(t) => TcpStream::connect_timeout(&addr, t),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(stream) => return Ok(stream),
                Err(e) => debug!("TCP | connect {} failed: {}", addr, e),
            }
        }
        Err(if resolved { TcpTransportError::Connect } else { TcpTransportError::Resolve })
    }
}

impl Transport for TcpTransport {
    type Error = TcpTransportError;

    fn connect(&mut self, host: &str, port: u16) -> Result<(), TcpTransportError> {
        self.close();
        let stream = self.open(host, port)?;
        stream
            .set_read_timeout(self.timeout)
            .and_then(|()| stream.set_write_timeout(self.timeout))
            .and_then(|()| stream.set_nodelay(true))
            .map_err(|_| TcpTransportError::Io)?;
        debug!("TCP | connected to {}:{}", host, port);
        self.stream = Some(BufReader::new(stream));
        Ok(())
    }

    fn send(&mut self, data: &[u8]) -> Result<(), TcpTransportError> {
        let stream = self.stream.as_mut().ok_or(TcpTransportError::NotConnected)?.get_mut();
        stream.write_all(data).and_then(|()| stream.flush()).map_err(|e| {
            warn!("TCP | write failed: {}", e);
            TcpTransportError::Io
        })
    }

    fn read_byte(&mut self) -> Option<u8> {
        let reader = self.stream.as_mut()?;
        let mut byte = [0u8; 1];
        loop {
            match reader.read(&mut byte) {
                Ok(0) => return None,
                Ok(_) => return Some(byte[0]),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => {
                    debug!("TCP | read ended: {}", e);
                    return None;
                }
            }
        }
    }

    fn close(&mut self) {
        if let Some(reader) = self.stream.take() {
            let _ = reader.get_ref().shutdown(Shutdown::Both);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Tests (host only)
// ───────────────────────────────────────────────────────────────
