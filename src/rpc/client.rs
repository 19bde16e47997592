//! One check-in round trip.
//!
//! ```text
//!  connect ─▶ encode + send ─▶ read headers ─▶ read body ─▶ decode
//!  Connecting   Sending          Awaiting        Awaiting     Parsing ─▶ Success | Failure
//! ```
//!
//! Every failure is classified into a [`CheckInError`] and returned; none
//! panics.  The connection is closed on every exit path by the
//! [`Connection`] guard.  Request and response buffers are owned by the
//! client and reused across round trips.

use core::time::Duration;

use log::{debug, info, warn};

use super::codec::Message;
use super::http::{HttpResponseParser, HttpStatus, write_request};
use super::messages::{CheckInRequest, CheckInResponse};
use super::transport::{Connection, Transport};
use crate::app::ports::{StatusPhase, StatusPort, TimePort};
use crate::config::FeederConfig;

pub use crate::error::CheckInError;

/// Where check-ins are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub path: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: &str, path: &str, port: u16) -> Self {
        Self { host: host.into(), path: path.into(), port }
    }
}

impl From<&FeederConfig> for Endpoint {
    fn from(config: &FeederConfig) -> Self {
        Self::new(&config.backend_host, &config.backend_path, config.backend_port)
    }
}

/// HTTP check-in client over any [`Transport`].
pub struct CheckInClient<T: Transport> {
    transport: T,
    endpoint: Endpoint,
    tx: Vec<u8>,
    rx: Vec<u8>,
}

impl<T: Transport> CheckInClient<T> {
    pub fn new(transport: T, endpoint: Endpoint) -> Self {
        Self { transport, endpoint, tx: Vec::new(), rx: Vec::new() }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Run one round trip and report how long it took.
    ///
    /// The elapsed time is measured on `clock` and returned on failure too,
    /// so the caller can age its timers either way.
    pub fn perform_checkin(
        &mut self,
        request: &CheckInRequest,
        status: &mut impl StatusPort,
        clock: &impl TimePort,
    ) -> (Result<CheckInResponse, CheckInError>, Duration) {
        let started = clock.now();
        let result = self.round_trip(request, status);
        let elapsed = clock.now().saturating_sub(started);

        match &result {
            Ok(_) => {
                info!("CHECKIN | ok in {:?}", elapsed);
                status.signal(StatusPhase::Success);
            }
            Err(e) => {
                warn!("CHECKIN | failed after {:?}: {}", elapsed, e);
                status.signal(StatusPhase::Failure);
            }
        }
        (result, elapsed)
    }

    fn round_trip(
        &mut self,
        request: &CheckInRequest,
        status: &mut impl StatusPort,
    ) -> Result<CheckInResponse, CheckInError> {
        let Endpoint { host, path, port } = &self.endpoint;

        status.signal(StatusPhase::Connecting);
        let mut conn = Connection::open(&mut self.transport, host, *port).map_err(|e| {
            warn!("CHECKIN | connect to {}:{} failed: {:?}", host, port, e);
            CheckInError::Transport
        })?;

        status.signal(StatusPhase::Sending);
        self.tx.clear();
        write_request(&mut self.tx, host, path, request)?;
        debug!("CHECKIN | sending {} bytes to {}{}", self.tx.len(), host, path);
        conn.send(&self.tx).map_err(|e| {
            warn!("CHECKIN | send failed: {:?}", e);
            CheckInError::Transport
        })?;

        status.signal(StatusPhase::Awaiting);
        self.rx.clear();
        let mut parser = HttpResponseParser::new();
        let http_status = loop {
            if let Some(s) = parser.status() {
                break s;
            }
            match conn.read_byte() {
                Some(b) => parser.feed(b, &mut self.rx)?,
                None => break parser.finish(),
            }
        };
        match http_status {
            HttpStatus::Ok => {}
            HttpStatus::TransportError => return Err(CheckInError::Transport),
            other => return Err(CheckInError::BadStatus(other)),
        }

        while let Some(b) = conn.read_byte() {
            parser.feed(b, &mut self.rx)?;
        }
        parser.finish();
        drop(conn);

        status.signal(StatusPhase::Parsing);
        debug!("CHECKIN | decoding {} byte body", self.rx.len());
        Ok(CheckInResponse::decode(self.rx.as_slice())?)
    }
}
