//! Outbound application events.
//!
//! The [`ScheduleController`](super::service::ScheduleController) emits
//! these through the [`EventSink`](super::ports::EventSink) port.  Adapters
//! on the other side decide what to do with them.

use core::time::Duration;

use crate::error::CheckInError;
use crate::fsm::StateId;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The controller has started (carries initial state).
    Started(StateId),

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// The actuator dispensed `scoops`.
    Fed { scoops: u32 },

    /// A check-in round trip succeeded and the schedule was updated.
    CheckInSucceeded(CheckInSummary),

    /// A check-in failed; the retry backoff is in effect.
    CheckInFailed { error: CheckInError, retry_in: Duration },
}

/// Schedule values adopted from a successful check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckInSummary {
    pub next_checkin: Duration,
    pub next_feed: Option<Duration>,
    pub scoops: u32,
    pub feeding_acknowledged: bool,
    pub round_trip: Duration,
}
