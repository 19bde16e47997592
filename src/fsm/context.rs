//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to: the schedule, the action chosen for this tick, and timing.

use crate::schedule::{Action, ScheduleState};

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Ticks elapsed since the current state was entered.
    pub ticks_in_state: u64,
    /// Monotonic total tick count.
    pub total_ticks: u64,

    // -- Schedule --
    /// Both countdown timers and the feeding bookkeeping.
    pub schedule: ScheduleState,

    // -- Output --
    /// Action chosen by the most recent `on_update`; executed by the controller.
    pub action: Action,
}

impl FsmContext {
    pub fn new(schedule: ScheduleState) -> Self {
        let action = schedule.next_action();
        Self {
            ticks_in_state: 0,
            total_ticks: 0,
            schedule,
            action,
        }
    }
}
