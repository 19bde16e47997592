//! End-to-end check-ins over a real TCP socket on 127.0.0.1.
//!
//! A one-shot server thread reads the request head and body, records the
//! body, answers, and hangs up.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::mock_hw::{FakeClock, MockFeeder, MockStatus, RecordingSink, http_reply, schedule};

use catfeeder::adapters::tcp_transport::TcpTransport;
use catfeeder::app::service::ScheduleController;
use catfeeder::error::CheckInError;
use catfeeder::fsm::StateId;
use catfeeder::rpc::client::{CheckInClient, Endpoint};
use catfeeder::rpc::codec::Message;
use catfeeder::rpc::messages::{CheckInRequest, CheckInResponse};

/// Serve `replies.len()` connections; returns each request line and body.
fn serve(replies: Vec<Vec<u8>>) -> (u16, JoinHandle<Vec<(String, Vec<u8>)>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = std::thread::spawn(move || {
        let mut seen = Vec::new();
        for reply in replies {
            let (sock, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(sock);

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" {
                    break;
                }
                if let Some(v) = line.strip_prefix("Content-Length: ") {
                    content_length = v.trim().parse().unwrap();
                }
            }
            let mut body = vec![0u8; content_length];
            reader.read_exact(&mut body).unwrap();

            let mut sock = reader.into_inner();
            sock.write_all(&reply).unwrap();
            seen.push((request_line, body));
        }
        seen
    });
    (port, handle)
}

fn encoded(resp: &CheckInResponse) -> Vec<u8> {
    let mut body = Vec::new();
    resp.encode(&mut body).unwrap();
    http_reply("HTTP/1.1 200 OK", &body)
}

fn tcp_client(port: u16) -> CheckInClient<TcpTransport> {
    CheckInClient::new(
        TcpTransport::new(Some(Duration::from_secs(5))),
        Endpoint::new("127.0.0.1", "/photon", port),
    )
}

#[test]
fn checkin_over_tcp() {
    let expected = schedule(15_000, Some(60_000), Some(2));
    let (port, server) = serve(vec![encoded(&expected)]);

    let mut client = tcp_client(port);
    let req = CheckInRequest { time_since_last_feed_ms: Some(1_234) };
    let (result, _) = client.perform_checkin(&req, &mut MockStatus::default(), &FakeClock::new());

    assert_eq!(result, Ok(expected));
    assert!(!client.transport().is_connected());

    let seen = server.join().unwrap();
    assert_eq!(seen[0].0, "GET /photon HTTP/1.0\r\n");
    assert_eq!(CheckInRequest::decode(seen[0].1.as_slice()), Ok(req));
}

#[test]
fn server_error_over_tcp() {
    let (port, server) = serve(vec![http_reply("HTTP/1.0 500 Internal Server Error", b"oops")]);
    let mut client = tcp_client(port);
    let (result, _) =
        client.perform_checkin(&CheckInRequest::default(), &mut MockStatus::default(), &FakeClock::new());

    assert!(matches!(result, Err(CheckInError::BadStatus(_))));
    assert!(!client.transport().is_connected());
    server.join().unwrap();
}

#[test]
fn controller_feeds_and_reports_over_tcp() {
    let ack = CheckInResponse { feeding_ack: Some(true), ..schedule(60_000, None, None) };
    let (port, server) = serve(vec![encoded(&schedule(60_000, Some(0), Some(1))), encoded(&ack)]);

    let mut app = ScheduleController::with_client(tcp_client(port), 1, Duration::from_secs(30));
    let (mut feeder, mut status, mut clock, mut sink) =
        (MockFeeder::new(), MockStatus::default(), FakeClock::new(), RecordingSink::default());
    app.start(&mut sink);

    let states: Vec<StateId> = (0..3)
        .map(|_| app.tick(&mut feeder, &mut status, &mut clock, &mut sink))
        .collect();
    assert_eq!(states, [StateId::CheckingIn, StateId::Feeding, StateId::CheckingIn]);
    assert_eq!(feeder.calls, [1]);
    assert!(!app.schedule().has_fed());

    let seen = server.join().unwrap();
    assert!(seen[0].1.is_empty());
    assert_eq!(
        CheckInRequest::decode(seen[1].1.as_slice()).unwrap().time_since_last_feed_ms,
        Some(0)
    );
}
