//! Application service — the hexagonal core.
//!
//! [`ScheduleController`] owns the FSM, the schedule, and the check-in
//! client.  All I/O flows through port traits injected at call sites,
//! making the whole controller testable with mock adapters.
//!
//! ```text
//!    TimePort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                 │   ScheduleController     │
//! ActuatorPort ◀──│  FSM · Schedule · Client │──▶ StatusPort
//!                 └────────────┬─────────────┘
//!                              ▼
//!                          Transport
//! ```
//!
//! Nothing here returns an error: actuator, transport and protocol
//! failures are absorbed into the schedule and the loop keeps going.

use core::time::Duration;

use log::{info, warn};

use crate::config::FeederConfig;
use crate::fsm::context::FsmContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::rpc::client::{CheckInClient, Endpoint};
use crate::rpc::transport::Transport;
use crate::schedule::{Action, ScheduleState};

use super::events::{AppEvent, CheckInSummary};
use super::ports::{ActuatorPort, EventSink, StatusPhase, StatusPort, TimePort};

// ───────────────────────────────────────────────────────────────
// ScheduleController
// ───────────────────────────────────────────────────────────────

/// Top-level feeding / check-in controller.
pub struct ScheduleController<T: Transport> {
    fsm: Fsm,
    ctx: FsmContext,
    client: CheckInClient<T>,
    retry_backoff: Duration,
}

impl<T: Transport> ScheduleController<T> {
    /// Construct the controller from configuration.
    ///
    /// Does **not** start the FSM; call [`start`](Self::start) next.
    pub fn new(config: &FeederConfig, transport: T) -> Self {
        let client = CheckInClient::new(transport, Endpoint::from(config));
        Self::with_client(client, config.min_scoops_per_feeding, config.retry_backoff())
    }

    pub fn with_client(client: CheckInClient<T>, min_scoops: u32, retry_backoff: Duration) -> Self {
        let ctx = FsmContext::new(ScheduleState::new(min_scoops));
        let fsm = Fsm::new(build_state_table(), StateId::Idle);
        Self { fsm, ctx, client, retry_backoff }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("ScheduleController started in {:?}", self.fsm.current_state());
    }

    /// Start, then tick forever.
    pub fn run(
        &mut self,
        actuator: &mut impl ActuatorPort,
        status: &mut impl StatusPort,
        clock: &mut impl TimePort,
        sink: &mut impl EventSink,
    ) -> ! {
        self.start(sink);
        loop {
            self.tick(actuator, status, clock, sink);
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle: FSM picks the action, the controller performs it.
    ///
    /// Returns the state the tick ran in.
    pub fn tick(
        &mut self,
        actuator: &mut impl ActuatorPort,
        status: &mut impl StatusPort,
        clock: &mut impl TimePort,
        sink: &mut impl EventSink,
    ) -> StateId {
        let prev_state = self.fsm.current_state();
        self.fsm.tick(&mut self.ctx);
        let state = self.fsm.current_state();
        if state != prev_state {
            sink.emit(&AppEvent::StateChanged { from: prev_state, to: state });
        }

        match self.ctx.action {
            Action::Feed { scoops } => self.feed(scoops, actuator, status, &*clock, sink),
            Action::CheckIn => self.check_in(status, &*clock, sink),
            Action::Wait(duration) => self.wait(duration, clock),
        }
        state
    }

    fn feed(
        &mut self,
        scoops: u32,
        actuator: &mut impl ActuatorPort,
        status: &mut impl StatusPort,
        clock: &impl TimePort,
        sink: &mut impl EventSink,
    ) {
        status.signal(StatusPhase::Feeding);
        let started = clock.now();
        actuator.actuate(scoops);
        let elapsed = clock.now().saturating_sub(started);

        self.ctx.schedule.advance(elapsed);
        self.ctx.schedule.record_feeding();
        sink.emit(&AppEvent::Fed { scoops });
    }

    fn check_in(&mut self, status: &mut impl StatusPort, clock: &impl TimePort, sink: &mut impl EventSink) {
        let request = self.ctx.schedule.request();
        let (result, elapsed) = self.client.perform_checkin(&request, status, clock);
        let schedule = &mut self.ctx.schedule;

        match result {
            Ok(resp) => {
                schedule.apply_checkin_success(&resp, elapsed);
                sink.emit(&AppEvent::CheckInSucceeded(CheckInSummary {
                    next_checkin: schedule.time_to_next_checkin(),
                    next_feed: schedule.time_to_next_feed(),
                    scoops: schedule.scoops_to_feed(),
                    feeding_acknowledged: resp.feeding_acknowledged(),
                    round_trip: elapsed,
                }));
            }
            Err(error) => {
                warn!("Check-in failed ({}), retrying in {:?}", error, self.retry_backoff);
                schedule.apply_checkin_failure(self.retry_backoff, elapsed);
                sink.emit(&AppEvent::CheckInFailed { error, retry_in: self.retry_backoff });
            }
        }
    }

    fn wait(&mut self, duration: Duration, clock: &mut impl TimePort) {
        if duration.is_zero() {
            // Due now: re-enter the tick instead of sleeping.
            self.ctx.schedule.advance(Duration::ZERO);
            return;
        }
        let started = clock.now();
        clock.sleep(duration);
        let measured = clock.now().saturating_sub(started);
        self.ctx.schedule.advance(measured.max(duration));
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn current_state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn schedule(&self) -> &ScheduleState {
        &self.ctx.schedule
    }

    pub fn client(&self) -> &CheckInClient<T> {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut CheckInClient<T> {
        &mut self.client
    }
}
