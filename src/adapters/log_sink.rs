//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (ESP-IDF UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::Fed { scoops } => {
                info!("FEED | dispensed {} scoop(s)", scoops);
            }
            AppEvent::CheckInSucceeded(s) => {
                info!(
                    "CHECKIN | ok rtt={}ms | next_checkin={}ms next_feed={} scoops={} ack={}",
                    s.round_trip.as_millis(),
                    s.next_checkin.as_millis(),
                    s.next_feed
                        .map_or_else(|| "none".into(), |d| format!("{}ms", d.as_millis())),
                    s.scoops,
                    s.feeding_acknowledged,
                );
            }
            AppEvent::CheckInFailed { error, retry_in } => {
                warn!("CHECKIN | failed: {} | retry in {}ms", error, retry_in.as_millis());
            }
        }
    }
}
