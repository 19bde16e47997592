//! Byte sink/source abstractions used as the I/O buffer contract.
//!
//! The codec, the HTTP envelope writer and the response parser never own
//! a buffer: the caller hands them something that implements
//! [`ByteSink`] (append side) or [`ByteSource`] (pull side).
//!
//! | Type                   | Sink | Source | Growth                 |
//! |------------------------|------|--------|------------------------|
//! | `Vec<u8>`              | yes  |        | amortized doubling     |
//! | `heapless::Vec<u8, N>` | yes  |        | fixed, `BufferFull`    |
//! | `&[u8]`                |      | yes    | consumed from the front|

use crate::error::BufferFull;

/// Append-only byte buffer.
pub trait ByteSink {
    /// Append one byte.
    fn put(&mut self, byte: u8) -> Result<(), BufferFull>;

    /// Number of bytes written so far.
    fn written(&self) -> usize;

    /// Append a slice.
    fn put_slice(&mut self, bytes: &[u8]) -> Result<(), BufferFull> {
        for &b in bytes {
            self.put(b)?;
        }
        Ok(())
    }
}

impl ByteSink for Vec<u8> {
    fn put(&mut self, byte: u8) -> Result<(), BufferFull> {
        self.push(byte);
        Ok(())
    }

    fn written(&self) -> usize {
        self.len()
    }

    fn put_slice(&mut self, bytes: &[u8]) -> Result<(), BufferFull> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

impl<const N: usize> ByteSink for heapless::Vec<u8, N> {
    fn put(&mut self, byte: u8) -> Result<(), BufferFull> {
        self.push(byte).map_err(|_| BufferFull)
    }

    fn written(&self) -> usize {
        self.len()
    }

    fn put_slice(&mut self, bytes: &[u8]) -> Result<(), BufferFull> {
        self.extend_from_slice(bytes).map_err(|_| BufferFull)
    }
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    fn put(&mut self, byte: u8) -> Result<(), BufferFull> {
        (**self).put(byte)
    }

    fn written(&self) -> usize {
        (**self).written()
    }

    fn put_slice(&mut self, bytes: &[u8]) -> Result<(), BufferFull> {
        (**self).put_slice(bytes)
    }
}

/// Sequential byte source.  `None` means end of stream.
pub trait ByteSource {
    fn next_byte(&mut self) -> Option<u8>;
}

impl ByteSource for &[u8] {
    fn next_byte(&mut self) -> Option<u8> {
        let (&first, rest) = self.split_first()?;
        *self = rest;
        Some(first)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn next_byte(&mut self) -> Option<u8> {
        (**self).next_byte()
    }
}
