//! Streaming protobuf-compatible field codec.
//!
//! Wire format of one field:
//! ```text
//! ┌──────────────────────────┬─────────────────────────────────┐
//! │ key varint               │ value                           │
//! │ (tag << 3) | wire_type   │ varint | 8B | len + bytes | 4B  │
//! └──────────────────────────┴─────────────────────────────────┘
//! ```
//!
//! Encoding pushes into any [`ByteSink`]; decoding pulls from any
//! [`ByteSource`] one byte at a time, so a message is consumed as it
//! arrives and never needs to be materialised first.  Length-delimited
//! fields are written size-first: the payload length comes from
//! [`Message::encoded_len`] rather than from a scratch buffer.

use crate::buffer::{ByteSink, ByteSource};
use crate::error::{BufferFull, DecodeError};

/// Longest legal varint (64-bit value).
const MAX_VARINT_LEN: usize = 10;

// ---------------------------------------------------------------------------
// Wire types and keys
// ---------------------------------------------------------------------------

/// The four recognized wire encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    Fixed32 = 5,
}

impl TryFrom<u8> for WireType {
    type Error = DecodeError;

    fn try_from(raw: u8) -> Result<Self, DecodeError> {
        match raw {
            0 => Ok(Self::Varint),
            1 => Ok(Self::Fixed64),
            2 => Ok(Self::LengthDelimited),
            5 => Ok(Self::Fixed32),
            other => Err(DecodeError::UnknownWireType(other)),
        }
    }
}

/// A decoded field key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldKey {
    pub tag: u32,
    pub wire_type: WireType,
}

impl FieldKey {
    fn raw(tag: u32, wire_type: WireType) -> u64 {
        (u64::from(tag) << 3) | wire_type as u64
    }
}

/// Encoded size of `value` as a varint.
pub const fn varint_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Encoded size of a field key.
pub const fn key_len(tag: u32) -> usize {
    varint_len((tag as u64) << 3)
}

/// Write `value` as a base-128 varint.
pub fn encode_varint<S: ByteSink + ?Sized>(mut value: u64, sink: &mut S) -> Result<(), BufferFull> {
    while value >= 0x80 {
        sink.put((value as u8) | 0x80)?;
        value >>= 7;
    }
    sink.put(value as u8)
}

// ---------------------------------------------------------------------------
// Message trait
// ---------------------------------------------------------------------------

/// A schema message that can be encoded to a sink and decoded from a source.
pub trait Message: Default {
    /// Exact number of bytes [`encode`](Message::encode) will write.
    fn encoded_len(&self) -> usize;

    /// Write every present field.
    fn encode_fields<S: ByteSink>(&self, w: &mut FieldWriter<S>) -> Result<(), BufferFull>;

    /// Consume the value of one field.
    ///
    /// Returns `Ok(false)` when the tag is not part of the schema; the
    /// caller then skips the value by its wire type.
    fn merge_field<R: ByteSource>(
        &mut self,
        key: FieldKey,
        r: &mut FieldReader<R>,
    ) -> Result<bool, DecodeError>;

    fn encode<S: ByteSink>(&self, sink: S) -> Result<(), BufferFull> {
        let mut w = FieldWriter::new(sink);
        self.encode_fields(&mut w)
    }

    /// Decode until the source reports end of stream.
    fn decode<R: ByteSource>(source: R) -> Result<Self, DecodeError> {
        let mut r = FieldReader::new(source);
        let mut msg = Self::default();
        while let Some(key) = r.next_key()? {
            if !msg.merge_field(key, &mut r)? {
                r.skip(key.wire_type)?;
            }
        }
        Ok(msg)
    }
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Field-level encoder over a [`ByteSink`].
pub struct FieldWriter<S> {
    sink: S,
}

impl<S: ByteSink> FieldWriter<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn into_inner(self) -> S {
        self.sink
    }

    fn key(&mut self, tag: u32, wire_type: WireType) -> Result<(), BufferFull> {
        encode_varint(FieldKey::raw(tag, wire_type), &mut self.sink)
    }

    pub fn uint64(&mut self, tag: u32, value: u64) -> Result<(), BufferFull> {
        self.key(tag, WireType::Varint)?;
        encode_varint(value, &mut self.sink)
    }

    pub fn uint32(&mut self, tag: u32, value: u32) -> Result<(), BufferFull> {
        self.uint64(tag, u64::from(value))
    }

    pub fn bool(&mut self, tag: u32, value: bool) -> Result<(), BufferFull> {
        self.uint64(tag, u64::from(value))
    }

    pub fn bytes(&mut self, tag: u32, value: &[u8]) -> Result<(), BufferFull> {
        self.key(tag, WireType::LengthDelimited)?;
        encode_varint(value.len() as u64, &mut self.sink)?;
        self.sink.put_slice(value)
    }

    /// Write a nested message: key, then its precomputed length, then its fields.
    pub fn message<M: Message>(&mut self, tag: u32, value: &M) -> Result<(), BufferFull> {
        self.key(tag, WireType::LengthDelimited)?;
        encode_varint(value.encoded_len() as u64, &mut self.sink)?;
        let mut nested = FieldWriter::new(&mut self.sink);
        value.encode_fields(&mut nested)
    }
}

/// Encoded size of a varint-typed field.
pub const fn uint64_field_len(tag: u32, value: u64) -> usize {
    key_len(tag) + varint_len(value)
}

/// Encoded size of a length-delimited field carrying `len` payload bytes.
pub const fn length_delimited_field_len(tag: u32, len: usize) -> usize {
    key_len(tag) + varint_len(len as u64) + len
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Forward-only field decoder over a [`ByteSource`].
pub struct FieldReader<R> {
    source: R,
}

impl<R: ByteSource> FieldReader<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    fn byte(&mut self) -> Result<u8, DecodeError> {
        self.source.next_byte().ok_or(DecodeError::Truncated)
    }

    fn varint_from(&mut self, first: u8) -> Result<u64, DecodeError> {
        let mut value = u64::from(first & 0x7F);
        let mut byte = first;
        let mut i = 1;
        while byte & 0x80 != 0 {
            if i == MAX_VARINT_LEN {
                return Err(DecodeError::VarintOverflow);
            }
            byte = self.byte()?;
            value |= u64::from(byte & 0x7F) << (7 * i);
            i += 1;
        }
        Ok(value)
    }

    /// Next field key, or `None` at a clean end of stream.
    pub fn next_key(&mut self) -> Result<Option<FieldKey>, DecodeError> {
        let Some(first) = self.source.next_byte() else {
            return Ok(None);
        };
        let raw = self.varint_from(first)?;
        let wire_type = WireType::try_from((raw & 0x7) as u8)?;
        let tag = u32::try_from(raw >> 3).map_err(|_| DecodeError::InvalidTag)?;
        if tag == 0 {
            return Err(DecodeError::InvalidTag);
        }
        Ok(Some(FieldKey { tag, wire_type }))
    }

    pub fn read_varint(&mut self) -> Result<u64, DecodeError> {
        let first = self.byte()?;
        self.varint_from(first)
    }

    pub fn read_uint64(&mut self, key: FieldKey) -> Result<u64, DecodeError> {
        expect(key, WireType::Varint)?;
        self.read_varint()
    }

    /// uint32 fields keep the low 32 bits of the varint.
    pub fn read_uint32(&mut self, key: FieldKey) -> Result<u32, DecodeError> {
        Ok(self.read_uint64(key)? as u32)
    }

    pub fn read_bool(&mut self, key: FieldKey) -> Result<bool, DecodeError> {
        Ok(self.read_uint64(key)? != 0)
    }

    /// Read a length-delimited payload into `sink`.
    pub fn read_bytes<S: ByteSink>(&mut self, key: FieldKey, sink: &mut S) -> Result<(), DecodeError> {
        expect(key, WireType::LengthDelimited)?;
        let len = self.read_varint()?;
        for _ in 0..len {
            let b = self.byte()?;
            sink.put(b).map_err(|_| DecodeError::Truncated)?;
        }
        Ok(())
    }

    /// Discard the value of a field by its wire type.
    pub fn skip(&mut self, wire_type: WireType) -> Result<(), DecodeError> {
        let count = match wire_type {
            WireType::Varint => {
                self.read_varint()?;
                return Ok(());
            }
            WireType::Fixed64 => 8,
            WireType::Fixed32 => 4,
            WireType::LengthDelimited => self.read_varint()?,
        };
        for _ in 0..count {
            self.byte()?;
        }
        Ok(())
    }
}

fn expect(key: FieldKey, wire_type: WireType) -> Result<(), DecodeError> {
    if key.wire_type == wire_type {
        Ok(())
    } else {
        Err(DecodeError::WireTypeMismatch { tag: key.tag })
    }
}
