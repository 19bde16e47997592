//! Integration tests for the ScheduleController → FSM → client pipeline.
//!
//! A scripted transport plays the server, a virtual clock makes waits
//! instant, and the mock feeder records every dispense.

use std::time::Duration;

use crate::mock_hw::{
    FakeClock, MockFeeder, MockStatus, RecordingSink, Reply, ScriptedTransport, http_reply, ok_reply, schedule,
};

use catfeeder::app::events::AppEvent;
use catfeeder::app::ports::StatusPhase;
use catfeeder::app::service::ScheduleController;
use catfeeder::config::FeederConfig;
use catfeeder::error::{CheckInError, DecodeError};
use catfeeder::fsm::StateId;
use catfeeder::rpc::client::{CheckInClient, Endpoint};
use catfeeder::rpc::http::HttpStatus;
use catfeeder::rpc::messages::CheckInResponse;

const BACKOFF: Duration = Duration::from_secs(30);

const fn secs(v: u64) -> Duration {
    Duration::from_secs(v)
}

struct Rig {
    app: ScheduleController<ScriptedTransport>,
    feeder: MockFeeder,
    status: MockStatus,
    clock: FakeClock,
    sink: RecordingSink,
}

impl Rig {
    fn new(min_scoops: u32, script: Vec<Reply>) -> Self {
        Self::with_clock(min_scoops, script, FakeClock::new())
    }

    fn with_clock(min_scoops: u32, script: Vec<Reply>, clock: FakeClock) -> Self {
        let client = CheckInClient::new(ScriptedTransport::new(script), Endpoint::new("feeder.test", "/photon", 80));
        let mut app = ScheduleController::with_client(client, min_scoops, BACKOFF);
        let mut sink = RecordingSink::default();
        app.start(&mut sink);
        Self { app, feeder: MockFeeder::new(), status: MockStatus::default(), clock, sink }
    }

    fn tick(&mut self) -> StateId {
        self.app
            .tick(&mut self.feeder, &mut self.status, &mut self.clock, &mut self.sink)
    }

    fn transport(&self) -> &ScriptedTransport {
        self.app.client().transport()
    }
}

// ── Boot ─────────────────────────────────────────────────────

#[test]
fn first_tick_checks_in_without_waiting() {
    let mut rig = Rig::new(1, vec![ok_reply(&schedule(60_000, None, None))]);
    assert_eq!(rig.app.current_state(), StateId::Idle);

    assert_eq!(rig.tick(), StateId::CheckingIn);
    assert!(rig.clock.sleeps.is_empty());
    assert_eq!(rig.transport().connects, 1);
    assert_eq!(
        rig.sink.events[..2],
        [
            AppEvent::Started(StateId::Idle),
            AppEvent::StateChanged { from: StateId::Idle, to: StateId::CheckingIn },
        ]
    );
}

#[test]
fn boot_request_reports_no_feeding() {
    let mut rig = Rig::new(1, vec![ok_reply(&schedule(60_000, None, None))]);
    rig.tick();

    let req = String::from_utf8(rig.transport().requests[0].clone()).unwrap();
    assert!(req.starts_with("GET /photon HTTP/1.0\r\nHost: feeder.test\r\n"));
    assert!(req.ends_with("Content-Length: 0\r\n\r\n"));
}

#[test]
fn config_endpoint_reaches_the_wire() {
    let transport = ScriptedTransport::new([ok_reply(&schedule(60_000, None, None))]);
    let mut app = ScheduleController::new(&FeederConfig::default(), transport);
    let (mut feeder, mut status, mut clock, mut sink) =
        (MockFeeder::new(), MockStatus::default(), FakeClock::new(), RecordingSink::default());
    app.start(&mut sink);
    app.tick(&mut feeder, &mut status, &mut clock, &mut sink);

    let req = String::from_utf8(app.client().transport().requests[0].clone()).unwrap();
    assert!(req.starts_with("GET /photon HTTP/1.0\r\nHost: catfeeder.local\r\n"));
}

// ── Full feeding cycle ───────────────────────────────────────

#[test]
fn scheduled_feed_then_prompt_checkin() {
    let ack = CheckInResponse { feeding_ack: Some(true), ..schedule(60_000, Some(10_000), Some(1)) };
    let mut rig = Rig::new(1, vec![ok_reply(&schedule(60_000, Some(5_000), Some(2))), ok_reply(&ack)]);

    assert_eq!(rig.tick(), StateId::CheckingIn);
    assert_eq!(rig.tick(), StateId::Waiting);
    assert_eq!(rig.clock.sleeps, [secs(5)]);

    assert_eq!(rig.tick(), StateId::Feeding);
    assert_eq!(rig.feeder.calls, [2]);
    assert!(rig.app.schedule().checkin_due(), "feeding must trigger a check-in");
    assert_eq!(rig.app.schedule().time_since_last_feed(), Some(Duration::ZERO));

    assert_eq!(rig.tick(), StateId::CheckingIn);
    // time_since_last_feed_ms = 0, tag 1 varint
    assert!(rig.transport().requests[1].ends_with(b"Content-Length: 2\r\n\r\n\x08\x00"));
    assert!(!rig.app.schedule().has_fed(), "ack clears the feeding report");
    assert_eq!(rig.app.schedule().time_to_next_feed(), Some(secs(10)));
    assert_eq!(rig.sink.fed_count(), 1);
}

#[test]
fn unacknowledged_feeding_ages_by_round_trip() {
    let mut rig = Rig::with_clock(
        1,
        vec![ok_reply(&schedule(60_000, Some(0), Some(1))), ok_reply(&schedule(60_000, None, None))],
        FakeClock::with_tick(Duration::from_millis(5)),
    );

    rig.tick(); // check-in, feed due now
    assert_eq!(rig.tick(), StateId::Feeding);
    rig.tick(); // report the feeding, server does not ack

    assert_eq!(rig.app.schedule().time_since_last_feed(), Some(Duration::from_millis(5)));
}

#[test]
fn zero_scoops_clamped_to_minimum() {
    let mut rig = Rig::new(2, vec![ok_reply(&schedule(60_000, Some(0), Some(0)))]);

    rig.tick();
    assert!(rig.app.schedule().feed_due(), "zero feed interval is due immediately");
    assert_eq!(rig.tick(), StateId::Feeding);
    assert_eq!(rig.feeder.calls, [2]);
}

#[test]
fn absent_scoops_use_minimum() {
    let mut rig = Rig::new(3, vec![ok_reply(&schedule(60_000, Some(0), None))]);
    rig.tick();
    rig.tick();
    assert_eq!(rig.feeder.calls, [3]);
}

#[test]
fn absent_feed_interval_cancels_pending_feed() {
    let mut rig = Rig::new(
        1,
        vec![ok_reply(&schedule(60_000, Some(100_000), None)), ok_reply(&schedule(60_000, None, None))],
    );

    rig.tick();
    assert_eq!(rig.tick(), StateId::Waiting);
    assert_eq!(rig.tick(), StateId::CheckingIn);
    assert_eq!(rig.app.schedule().time_to_next_feed(), None);

    assert_eq!(rig.tick(), StateId::Waiting);
    assert_eq!(rig.clock.sleeps, [secs(60), secs(60)]);
    assert!(rig.feeder.calls.is_empty());
}

#[test]
fn simultaneous_expiry_feeds_first() {
    let mut rig = Rig::new(1, vec![ok_reply(&schedule(5_000, Some(5_000), Some(1)))]);

    rig.tick();
    assert_eq!(rig.tick(), StateId::Waiting);
    assert!(rig.app.schedule().feed_due() && rig.app.schedule().checkin_due());

    assert_eq!(rig.tick(), StateId::Feeding);
    assert_eq!(rig.tick(), StateId::CheckingIn);
}

#[test]
fn missing_checkin_interval_uses_default() {
    let resp = CheckInResponse { checkin_interval_ms: None, ..CheckInResponse::default() };
    let mut rig = Rig::new(1, vec![ok_reply(&resp)]);

    rig.tick();
    assert_eq!(rig.app.schedule().time_to_next_checkin(), secs(10));
}

// ── Failure handling ─────────────────────────────────────────

#[test]
fn refused_connection_backs_off() {
    let mut rig = Rig::new(1, vec![Reply::Refuse]);

    assert_eq!(rig.tick(), StateId::CheckingIn);
    assert_eq!(
        rig.sink.events.last(),
        Some(&AppEvent::CheckInFailed { error: CheckInError::Transport, retry_in: BACKOFF })
    );
    assert_eq!(rig.status.phases, [StatusPhase::Connecting, StatusPhase::Failure]);
    assert_eq!(rig.app.schedule().time_to_next_checkin(), BACKOFF);

    assert_eq!(rig.tick(), StateId::Waiting);
    assert_eq!(rig.clock.sleeps, [BACKOFF]);
    assert_eq!(rig.tick(), StateId::CheckingIn);
    assert_eq!(rig.sink.failures(), 2);
}

#[test]
fn failure_keeps_prior_schedule() {
    let mut rig = Rig::new(
        1,
        vec![
            ok_reply(&schedule(60_000, Some(100_000), Some(3))),
            Reply::Bytes(http_reply("HTTP/1.1 503 Service Unavailable", b"")),
        ],
    );

    rig.tick();
    rig.tick(); // wait 60 s; feed has 40 s left
    assert_eq!(rig.tick(), StateId::CheckingIn);
    assert!(matches!(
        rig.sink.events.last(),
        Some(AppEvent::CheckInFailed { error: CheckInError::BadStatus(HttpStatus::Unavailable), .. })
    ));

    let sched = rig.app.schedule();
    assert_eq!(sched.time_to_next_feed(), Some(secs(40)));
    assert_eq!(sched.feed_interval(), Some(secs(100)));
    assert_eq!(sched.checkin_interval(), secs(60));
    assert_eq!(sched.scoops_to_feed(), 3);
    assert_eq!(sched.time_to_next_checkin(), BACKOFF);

    rig.tick(); // wait out the backoff
    rig.tick(); // script exhausted: refused
    rig.tick(); // wait the last 10 s
    assert_eq!(rig.tick(), StateId::Feeding);
    assert_eq!(rig.clock.sleeps, [secs(60), BACKOFF, secs(10)]);
    assert_eq!(rig.feeder.calls, [3]);
}

#[test]
fn malformed_body_is_absorbed() {
    let mut rig = Rig::new(1, vec![Reply::Bytes(http_reply("HTTP/1.1 200 OK", &[0x4A, 0x05, 0x01]))]);

    rig.tick();
    assert!(matches!(
        rig.sink.events.last(),
        Some(AppEvent::CheckInFailed { error: CheckInError::MalformedBody(DecodeError::Truncated), .. })
    ));
    assert_eq!(rig.transport().closes, 1);
    assert!(!rig.transport().is_open());
}

#[test]
fn controller_survives_long_outage() {
    let mut rig = Rig::new(1, Vec::new());
    for _ in 0..50 {
        rig.tick();
    }
    assert_eq!(rig.sink.failures(), 25);
    assert!(rig.clock.sleeps.iter().all(|d| *d == BACKOFF));
    assert!(rig.feeder.calls.is_empty());
}

// ── Status indicator ─────────────────────────────────────────

#[test]
fn status_phases_follow_round_trip() {
    let mut rig = Rig::new(1, vec![ok_reply(&schedule(60_000, Some(0), Some(1)))]);

    rig.tick();
    rig.tick();
    assert_eq!(
        rig.status.phases,
        [
            StatusPhase::Connecting,
            StatusPhase::Sending,
            StatusPhase::Awaiting,
            StatusPhase::Parsing,
            StatusPhase::Success,
            StatusPhase::Feeding,
        ]
    );
}
