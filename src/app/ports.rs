//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ScheduleController (domain)
//! ```
//!
//! Driven adapters (feeder servo, status LED, clock, event sinks)
//! implement these traits.  The
//! [`ScheduleController`](super::service::ScheduleController) consumes them
//! via generics, so the domain core never touches hardware directly.
//!
//! None of the ports return errors: failures behind them are absorbed by
//! the adapter and the controller keeps running.

use core::time::Duration;

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: dispenses food.
pub trait ActuatorPort {
    /// Perform `cycles` physical cycles, blocking until the last one settles.
    fn actuate(&mut self, cycles: u32);
}

// ───────────────────────────────────────────────────────────────
// Status port (driven adapter: domain → indicator)
// ───────────────────────────────────────────────────────────────

/// Discrete phase reported to the status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPhase {
    Connecting,
    Sending,
    Awaiting,
    Parsing,
    Success,
    Failure,
    Feeding,
}

/// Fire-and-forget status output.  Purely observational.
pub trait StatusPort {
    fn signal(&mut self, phase: StatusPhase);
}

// ───────────────────────────────────────────────────────────────
// Time port (driven adapter: domain ↔ monotonic clock)
// ───────────────────────────────────────────────────────────────

/// Monotonic clock plus the blocking idle wait.
pub trait TimePort {
    /// Time since an arbitrary fixed origin.
    fn now(&self) -> Duration;

    /// Block for `duration`.  Never called with zero.
    fn sleep(&mut self, duration: Duration);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
