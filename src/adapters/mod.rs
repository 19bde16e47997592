//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter         | Implements | Connects to                 |
//! |-----------------|------------|-----------------------------|
//! | `log_sink`      | EventSink  | Serial log output           |
//! | `tcp_transport` | Transport  | TCP socket (lwIP / host)    |
//! | `time`          | TimePort   | ESP32 system timer / host   |

pub mod log_sink;
pub mod tcp_transport;
pub mod time;
