//! Feeding / check-in schedule: two countdown timers and the decision of
//! what to do next.
//!
//! ```text
//!   next_feed    ──[advance]──▶ due ─┐
//!                                    ├──▶ next_action(): Feed | CheckIn | Wait(min)
//!   next_checkin ──[advance]──▶ due ─┘
//! ```
//!
//! [`ScheduleState`] is owned by the controller and only changed through
//! the methods below.  It performs no I/O and reads no clock: elapsed time
//! is always handed in by the caller.

use core::time::Duration;

use log::debug;

use crate::rpc::messages::{CheckInRequest, CheckInResponse};

// ---------------------------------------------------------------------------
// Countdown
// ---------------------------------------------------------------------------

/// A one-shot countdown timer.
///
/// Once due it stays due and accumulates how far past zero it has run,
/// which orders two timers that expire during the same wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: Duration,
    overdue: Option<Duration>,
}

impl Countdown {
    /// A timer that fires after `duration`.  Zero means due immediately.
    pub const fn starting_at(duration: Duration) -> Self {
        if duration.is_zero() {
            Self::due_now()
        } else {
            Self { remaining: duration, overdue: None }
        }
    }

    pub const fn due_now() -> Self {
        Self { remaining: Duration::ZERO, overdue: Some(Duration::ZERO) }
    }

    pub fn is_due(&self) -> bool {
        self.overdue.is_some()
    }

    /// Time left until due; zero once due.
    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// How long ago the timer reached zero.
    pub fn overdue(&self) -> Option<Duration> {
        self.overdue
    }

    /// Consume `dt`.  Returns `true` only on the call that makes it due.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if let Some(over) = self.overdue {
            self.overdue = Some(over.saturating_add(dt));
            return false;
        }
        if dt >= self.remaining {
            self.overdue = Some(dt - self.remaining);
            self.remaining = Duration::ZERO;
            true
        } else {
            self.remaining -= dt;
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// What the controller must do on this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Feed { scoops: u32 },
    CheckIn,
    /// Block for this long.  Never zero.
    Wait(Duration),
}

// ---------------------------------------------------------------------------
// ScheduleState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleState {
    next_feed: Option<Countdown>,
    next_checkin: Countdown,
    time_since_last_feed: Option<Duration>,
    scoops_to_feed: u32,
    min_scoops: u32,
    checkin_interval: Duration,
    feed_interval: Option<Duration>,
}

impl ScheduleState {
    /// Boot state: check-in due now, no feeding scheduled.
    pub fn new(min_scoops: u32) -> Self {
        let min_scoops = min_scoops.max(1);
        Self {
            next_feed: None,
            next_checkin: Countdown::due_now(),
            time_since_last_feed: None,
            scoops_to_feed: min_scoops,
            min_scoops,
            checkin_interval: Duration::ZERO,
            feed_interval: None,
        }
    }

    pub fn feed_due(&self) -> bool {
        self.next_feed.is_some_and(|c| c.is_due())
    }

    pub fn checkin_due(&self) -> bool {
        self.next_checkin.is_due()
    }

    /// A feeding happened that the server has not acknowledged yet.
    pub fn has_fed(&self) -> bool {
        self.time_since_last_feed.is_some()
    }

    pub fn time_to_next_feed(&self) -> Option<Duration> {
        self.next_feed.map(|c| c.remaining())
    }

    pub fn time_to_next_checkin(&self) -> Duration {
        self.next_checkin.remaining()
    }

    pub fn time_since_last_feed(&self) -> Option<Duration> {
        self.time_since_last_feed
    }

    pub fn scoops_to_feed(&self) -> u32 {
        self.scoops_to_feed
    }

    /// Last check-in interval adopted from the server (zero before the first).
    pub fn checkin_interval(&self) -> Duration {
        self.checkin_interval
    }

    pub fn feed_interval(&self) -> Option<Duration> {
        self.feed_interval
    }

    /// Decide the next action.
    ///
    /// When both timers are due the one that expired first (larger overdue)
    /// wins; an exact tie goes to feeding.
    pub fn next_action(&self) -> Action {
        let feed_over = self.next_feed.and_then(|c| c.overdue());
        match (feed_over, self.next_checkin.overdue()) {
            (Some(feed), Some(checkin)) if checkin > feed => Action::CheckIn,
            (Some(_), _) => Action::Feed { scoops: self.scoops_to_feed },
            (None, Some(_)) => Action::CheckIn,
            (None, None) => {
                let checkin = self.next_checkin.remaining();
                let wait = self
                    .time_to_next_feed()
                    .map_or(checkin, |feed| feed.min(checkin));
                Action::Wait(wait)
            }
        }
    }

    /// Let `dt` pass on both timers.
    pub fn advance(&mut self, dt: Duration) {
        if let Some(feed) = self.next_feed.as_mut() {
            if feed.advance(dt) {
                debug!("SCHED | feed timer expired");
            }
        }
        if self.next_checkin.advance(dt) {
            debug!("SCHED | check-in timer expired");
        }
        if let Some(since) = self.time_since_last_feed.as_mut() {
            *since = since.saturating_add(dt);
        }
    }

    /// A feeding just completed: clear the feed timer and check in promptly.
    pub fn record_feeding(&mut self) {
        self.next_feed = None;
        self.time_since_last_feed = Some(Duration::ZERO);
        self.next_checkin = Countdown::due_now();
    }

    /// Snapshot for the next check-in.
    pub fn request(&self) -> CheckInRequest {
        CheckInRequest {
            time_since_last_feed_ms: self
                .time_since_last_feed
                .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
        }
    }

    /// Adopt the server's schedule after a successful round trip that took `elapsed`.
    pub fn apply_checkin_success(&mut self, resp: &CheckInResponse, elapsed: Duration) {
        self.checkin_interval = resp.checkin_interval();
        self.feed_interval = resp.feed_interval();
        self.next_checkin = Countdown::starting_at(self.checkin_interval);
        self.next_feed = self.feed_interval.map(Countdown::starting_at);
        self.scoops_to_feed = resp.scoops_to_feed.unwrap_or(0).max(self.min_scoops);

        if resp.feeding_acknowledged() {
            self.time_since_last_feed = None;
        } else if let Some(since) = self.time_since_last_feed.as_mut() {
            *since = since.saturating_add(elapsed);
        }
        debug!(
            "SCHED | adopted checkin={:?} feed={:?} scoops={}",
            self.checkin_interval, self.feed_interval, self.scoops_to_feed
        );
    }

    /// Keep the prior schedule and retry after `backoff`.
    pub fn apply_checkin_failure(&mut self, backoff: Duration, elapsed: Duration) {
        if let Some(feed) = self.next_feed.as_mut() {
            if feed.advance(elapsed) {
                debug!("SCHED | feed timer expired during failed check-in");
            }
        }
        if let Some(since) = self.time_since_last_feed.as_mut() {
            *since = since.saturating_add(elapsed);
        }
        self.next_checkin = Countdown::starting_at(backoff);
    }
}
