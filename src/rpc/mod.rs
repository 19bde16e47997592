//! Check-in protocol stack.
//!
//! Compact binary messages carried in a minimal HTTP/1.0 envelope.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Check-in Stack                         │
//! │                                                             │
//! │  ┌───────────┐   ┌───────────┐   ┌──────────────────────┐   │
//! │  │ messages  │──▶│  codec    │──▶│ http (envelope)      │   │
//! │  │ (schema)  │   │ (fields)  │   │ write_request        │   │
//! │  └───────────┘   └───────────┘   └──────────┬───────────┘   │
//! │        ▲                                    ▼               │
//! │  ┌───────────┐   ┌───────────┐   ┌──────────────────────┐   │
//! │  │  client   │◀──│  parser   │◀──│ Transport (trait)    │   │
//! │  │ (round    │   │ (byte at  │   │ connect/send/read    │   │
//! │  │  trip)    │   │  a time)  │   └──────────────────────┘   │
//! │  └───────────┘   └───────────┘                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod client;
pub mod codec;
pub mod http;
pub mod messages;
pub mod transport;
