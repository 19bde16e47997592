//! Check-in request/response schema.
//!
//! | Message  | Field                   | Tag | Type   | Default |
//! |----------|-------------------------|-----|--------|---------|
//! | Request  | time_since_last_feed_ms | 1   | uint64 | —       |
//! | Response | checkin_interval_ms     | 1   | uint64 | 10000   |
//! | Response | feed_interval_ms        | 2   | uint64 | —       |
//! | Response | scoops_to_feed          | 3   | uint32 | —       |
//! | Response | feeding_ack             | 4   | bool   | —       |
//!
//! Every field is optional: `None` means the field was absent on the
//! wire, which is distinct from a present zero.

use core::time::Duration;

use super::codec::{FieldKey, FieldReader, FieldWriter, Message, uint64_field_len};
use crate::buffer::{ByteSink, ByteSource};
use crate::error::{BufferFull, DecodeError};

/// Check-in interval used when the server omits it.
pub const DEFAULT_CHECKIN_INTERVAL_MS: u64 = 10_000;

const REQ_TIME_SINCE_LAST_FEED: u32 = 1;

const RESP_CHECKIN_INTERVAL: u32 = 1;
const RESP_FEED_INTERVAL: u32 = 2;
const RESP_SCOOPS_TO_FEED: u32 = 3;
const RESP_FEEDING_ACK: u32 = 4;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Device → server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckInRequest {
    /// Present iff a feeding happened that the server has not acknowledged.
    pub time_since_last_feed_ms: Option<u64>,
}

impl Message for CheckInRequest {
    fn encoded_len(&self) -> usize {
        self.time_since_last_feed_ms
            .map_or(0, |v| uint64_field_len(REQ_TIME_SINCE_LAST_FEED, v))
    }

    fn encode_fields<S: ByteSink>(&self, w: &mut FieldWriter<S>) -> Result<(), BufferFull> {
        if let Some(v) = self.time_since_last_feed_ms {
            w.uint64(REQ_TIME_SINCE_LAST_FEED, v)?;
        }
        Ok(())
    }

    fn merge_field<R: ByteSource>(
        &mut self,
        key: FieldKey,
        r: &mut FieldReader<R>,
    ) -> Result<bool, DecodeError> {
        match key.tag {
            REQ_TIME_SINCE_LAST_FEED => self.time_since_last_feed_ms = Some(r.read_uint64(key)?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// Server → device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckInResponse {
    pub checkin_interval_ms: Option<u64>,
    pub feed_interval_ms: Option<u64>,
    pub scoops_to_feed: Option<u32>,
    pub feeding_ack: Option<bool>,
}

impl CheckInResponse {
    /// Delay until the next check-in, falling back to the protocol default.
    pub fn checkin_interval(&self) -> Duration {
        Duration::from_millis(self.checkin_interval_ms.unwrap_or(DEFAULT_CHECKIN_INTERVAL_MS))
    }

    /// Delay until the next feeding; `None` means no feeding is scheduled.
    pub fn feed_interval(&self) -> Option<Duration> {
        self.feed_interval_ms.map(Duration::from_millis)
    }

    /// Whether the server recorded the feeding reported in the request.
    pub fn feeding_acknowledged(&self) -> bool {
        self.feeding_ack.unwrap_or(false)
    }
}

impl Message for CheckInResponse {
    fn encoded_len(&self) -> usize {
        let mut len = 0;
        if let Some(v) = self.checkin_interval_ms {
            len += uint64_field_len(RESP_CHECKIN_INTERVAL, v);
        }
        if let Some(v) = self.feed_interval_ms {
            len += uint64_field_len(RESP_FEED_INTERVAL, v);
        }
        if let Some(v) = self.scoops_to_feed {
            len += uint64_field_len(RESP_SCOOPS_TO_FEED, u64::from(v));
        }
        if let Some(v) = self.feeding_ack {
            len += uint64_field_len(RESP_FEEDING_ACK, u64::from(v));
        }
        len
    }

    fn encode_fields<S: ByteSink>(&self, w: &mut FieldWriter<S>) -> Result<(), BufferFull> {
        if let Some(v) = self.checkin_interval_ms {
            w.uint64(RESP_CHECKIN_INTERVAL, v)?;
        }
        if let Some(v) = self.feed_interval_ms {
            w.uint64(RESP_FEED_INTERVAL, v)?;
        }
        if let Some(v) = self.scoops_to_feed {
            w.uint32(RESP_SCOOPS_TO_FEED, v)?;
        }
        if let Some(v) = self.feeding_ack {
            w.bool(RESP_FEEDING_ACK, v)?;
        }
        Ok(())
    }

    fn merge_field<R: ByteSource>(
        &mut self,
        key: FieldKey,
        r: &mut FieldReader<R>,
    ) -> Result<bool, DecodeError> {
        match key.tag {
            RESP_CHECKIN_INTERVAL => self.checkin_interval_ms = Some(r.read_uint64(key)?),
            RESP_FEED_INTERVAL => self.feed_interval_ms = Some(r.read_uint64(key)?),
            RESP_SCOOPS_TO_FEED => self.scoops_to_feed = Some(r.read_uint32(key)?),
            RESP_FEEDING_ACK => self.feeding_ack = Some(r.read_bool(key)?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}
