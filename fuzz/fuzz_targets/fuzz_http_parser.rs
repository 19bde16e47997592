//! Fuzz target: `HttpResponseParser::feed`
//!
//! Streams arbitrary bytes through the response parser one at a time.
//! The parser must never panic, must only emit body bytes once the header
//! block has ended, and must report a status exactly when it did.
//!
//! cargo fuzz run fuzz_http_parser

#![no_main]

use catfeeder::rpc::http::{HttpResponseParser, HttpStatus, ParseState};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut parser = HttpResponseParser::new();
    let mut body = Vec::new();
    let mut body_start = None;

    for (i, &b) in data.iter().enumerate() {
        let was_body = parser.state() == ParseState::Body;
        parser.feed(b, &mut body).expect("Vec sink never fills");
        if was_body && body_start.is_none() {
            body_start = Some(i);
        }
    }

    match body_start {
        Some(start) => assert_eq!(body.as_slice(), &data[start..]),
        None => assert!(body.is_empty()),
    }

    let reached_body = parser.state() == ParseState::Body;
    assert_eq!(parser.status().is_some(), reached_body);
    let status = parser.finish();
    assert_eq!(status == HttpStatus::TransportError, !reached_body);
});
