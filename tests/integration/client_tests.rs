//! CheckInClient against a scripted server: outcome classification and
//! connection hygiene on every exit path.

use std::time::Duration;

use crate::mock_hw::{FakeClock, MockStatus, Reply, ScriptedTransport, http_reply, ok_reply, schedule};

use catfeeder::error::{CheckInError, DecodeError};
use catfeeder::rpc::client::{CheckInClient, Endpoint};
use catfeeder::rpc::codec::Message;
use catfeeder::rpc::http::HttpStatus;
use catfeeder::rpc::messages::{CheckInRequest, CheckInResponse};

fn client(script: Vec<Reply>) -> CheckInClient<ScriptedTransport> {
    CheckInClient::new(ScriptedTransport::new(script), Endpoint::new("feeder.test", "/photon", 8080))
}

fn check_in(c: &mut CheckInClient<ScriptedTransport>) -> Result<CheckInResponse, CheckInError> {
    c.perform_checkin(&CheckInRequest::default(), &mut MockStatus::default(), &FakeClock::new())
        .0
}

#[test]
fn decodes_ok_response() {
    let expected = CheckInResponse {
        checkin_interval_ms: Some(45_000),
        feed_interval_ms: Some(3_600_000),
        scoops_to_feed: Some(2),
        feeding_ack: Some(true),
    };
    let mut c = client(vec![ok_reply(&expected)]);

    assert_eq!(check_in(&mut c), Ok(expected));
    assert_eq!(c.transport().closes, 1);
}

#[test]
fn request_carries_feeding_report() {
    let mut c = client(vec![ok_reply(&schedule(10_000, None, None))]);
    let req = CheckInRequest { time_since_last_feed_ms: Some(300) };
    let (result, _) = c.perform_checkin(&req, &mut MockStatus::default(), &FakeClock::new());
    assert!(result.is_ok());

    let mut body = Vec::new();
    req.encode(&mut body).unwrap();
    let sent = &c.transport().requests[0];
    assert!(sent.ends_with(&body));
    let head = format!("Content-Length: {}\r\n\r\n", body.len());
    assert!(sent.windows(head.len()).any(|w| w == head.as_bytes()));
}

#[test]
fn refused_connect_is_transport_failure() {
    let mut c = client(vec![Reply::Refuse]);
    assert_eq!(check_in(&mut c), Err(CheckInError::Transport));
    assert!(c.transport().requests.is_empty());
    assert!(!c.transport().is_open());
}

#[test]
fn non_ok_status_skips_decode() {
    let cases = [
        ("HTTP/1.1 400 Bad Request", HttpStatus::BadRequest),
        ("HTTP/1.1 500 Internal Server Error", HttpStatus::ServerError),
        ("HTTP/1.1 503 Service Unavailable", HttpStatus::Unavailable),
        ("HTTP/1.1 302 Found", HttpStatus::Unknown),
    ];
    for (line, status) in cases {
        // Garbage body: decoding it would fail, so BadStatus proves it was skipped.
        let mut c = client(vec![Reply::Bytes(http_reply(line, &[0xFF]))]);
        assert_eq!(check_in(&mut c), Err(CheckInError::BadStatus(status)), "{line}");
        assert_eq!(c.transport().closes, 1);
    }
}

#[test]
fn hangup_before_body_is_transport_failure() {
    for cut in ["", "HTTP/1.1 2", "HTTP/1.1 200 OK\r\n", "HTTP/1.1 200 OK\r\nServer: x\r\n"] {
        let mut c = client(vec![Reply::Bytes(cut.as_bytes().to_vec())]);
        assert_eq!(check_in(&mut c), Err(CheckInError::Transport), "{cut:?}");
        assert!(!c.transport().is_open());
    }
}

#[test]
fn partial_body_decodes_what_arrived() {
    let full = CheckInResponse { feeding_ack: Some(true), ..schedule(20_000, Some(1_000), Some(4)) };
    let Reply::Bytes(mut bytes) = ok_reply(&full) else { unreachable!() };
    // Drop the trailing feeding_ack field (tag 4, one-byte bool).
    bytes.truncate(bytes.len() - 2);

    let mut c = client(vec![Reply::Bytes(bytes)]);
    assert_eq!(check_in(&mut c), Ok(schedule(20_000, Some(1_000), Some(4))));
}

#[test]
fn truncated_body_is_malformed() {
    let mut c = client(vec![Reply::Bytes(http_reply("HTTP/1.1 200 OK", &[0x08, 0x80]))]);
    assert_eq!(check_in(&mut c), Err(CheckInError::MalformedBody(DecodeError::Truncated)));
    assert_eq!(c.transport().closes, 1);
}

#[test]
fn unknown_wire_type_is_malformed() {
    // tag 1, wire type 7
    let mut c = client(vec![Reply::Bytes(http_reply("HTTP/1.1 200 OK", &[0x0F, 0x00]))]);
    assert_eq!(check_in(&mut c), Err(CheckInError::MalformedBody(DecodeError::UnknownWireType(7))));
}

#[test]
fn elapsed_is_measured_on_failure_too() {
    let mut c = client(vec![Reply::Refuse]);
    let clock = FakeClock::with_tick(Duration::from_millis(7));
    let (result, elapsed) = c.perform_checkin(&CheckInRequest::default(), &mut MockStatus::default(), &clock);
    assert!(result.is_err());
    assert_eq!(elapsed, Duration::from_millis(7));
}

#[test]
fn buffers_reused_across_round_trips() {
    let mut c = client(vec![
        ok_reply(&schedule(1_000, None, None)),
        ok_reply(&schedule(2_000, None, Some(1))),
    ]);
    assert_eq!(check_in(&mut c).map(|r| r.checkin_interval_ms), Ok(Some(1_000)));
    assert_eq!(check_in(&mut c), Ok(schedule(2_000, None, Some(1))));
    assert_eq!(c.transport().connects, 2);
    assert_eq!(c.transport().closes, 2);
}
