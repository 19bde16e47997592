//! Transport abstraction: a connect/send/receive byte stream.
//!
//! Concrete implementations:
//! - TCP socket over WiFi ([`TcpTransport`](crate::adapters::tcp_transport::TcpTransport))
//! - in-memory scripts in tests
//!
//! The check-in client is generic over `Transport`, so a new link needs
//! zero changes to the protocol logic.  Reads are blocking; a transport
//! with a timeout reports expiry as end of stream.

/// Byte-oriented, connection-based transport channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Open a connection to `host:port`.
    fn connect(&mut self, host: &str, port: u16) -> Result<(), Self::Error>;

    /// Write all of `data` to the open connection.
    fn send(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Block for the next byte.  `None` means the peer disconnected
    /// (or the read timed out).
    fn read_byte(&mut self) -> Option<u8>;

    /// Release the connection.  Must be safe to call more than once.
    fn close(&mut self);
}

/// Open connection that is closed on every exit path.
pub struct Connection<'a, T: Transport> {
    transport: &'a mut T,
}

impl<'a, T: Transport> Connection<'a, T> {
    pub fn open(transport: &'a mut T, host: &str, port: u16) -> Result<Self, T::Error> {
        transport.connect(host, port)?;
        Ok(Self { transport })
    }

    pub fn send(&mut self, data: &[u8]) -> Result<(), T::Error> {
        self.transport.send(data)
    }

    pub fn read_byte(&mut self) -> Option<u8> {
        self.transport.read_byte()
    }
}

impl<T: Transport> Drop for Connection<'_, T> {
    fn drop(&mut self) {
        self.transport.close();
    }
}

/// A null transport that refuses every connection.
/// Useful as a default when no network is configured.
pub struct NullTransport;

impl Transport for NullTransport {
    type Error = ();

    fn connect(&mut self, _host: &str, _port: u16) -> Result<(), ()> {
        Err(())
    }

    fn send(&mut self, _data: &[u8]) -> Result<(), ()> {
        Err(())
    }

    fn read_byte(&mut self) -> Option<u8> {
        None
    }

    fn close(&mut self) {}
}
