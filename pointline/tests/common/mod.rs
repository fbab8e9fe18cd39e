//! Scripted collaborators shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use pointline::error::TransportError;
use pointline::transport::{Response, Transport, WriteRequest};
use pointline::{Client, Credentials, FixedClock, PowerControl, Sleeper};

/// Base URL used by every test client.
pub const BASE_URL: &str = "http://localhost:8086";

/// Fixed clock reading: 1.5 s.
pub const NOW: Duration = Duration::from_millis(1_500);

/// Everything a [`ScriptedTransport`] observed.
#[derive(Debug, Default)]
pub struct Log {
    /// Payloads passed to `send`, in order.
    pub payloads: Vec<String>,
    /// URLs passed to `send`.
    pub urls: Vec<String>,
    /// Tokens passed to `send`.
    pub tokens: Vec<String>,
    /// URLs passed to `health_check`.
    pub health_urls: Vec<String>,
    /// Number of `reconnect` calls.
    pub reconnects: usize,
}

/// Transport that replays queued outcomes and records requests.
///
/// When the queue is empty, `send` answers 204.
pub struct ScriptedTransport {
    pub log: Rc<RefCell<Log>>,
    pub outcomes: VecDeque<Result<Response, TransportError>>,
    pub health: Response,
    pub connected: bool,
    pub reconnect_succeeds: bool,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(Log::default())),
            outcomes: VecDeque::new(),
            health: Response::new(200, "ready"),
            connected: true,
            reconnect_succeeds: true,
        }
    }

    /// Queues a raw HTTP status.
    pub fn respond(mut self, status: u16) -> Self {
        self.outcomes.push_back(Ok(Response::new(status, "")));
        self
    }

    /// Queues a transport failure.
    pub fn fail(mut self, error: TransportError) -> Self {
        self.outcomes.push_back(Err(error));
        self
    }

    pub fn disconnected(mut self) -> Self {
        self.connected = false;
        self
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for ScriptedTransport {
    fn is_connected(&mut self) -> bool {
        self.connected
    }

    fn reconnect(&mut self) -> bool {
        self.log.borrow_mut().reconnects += 1;
        if self.reconnect_succeeds {
            self.connected = true;
        }
        self.connected
    }

    fn send(&mut self, request: &WriteRequest<'_>) -> Result<Response, TransportError> {
        {
            let mut log = self.log.borrow_mut();
            log.payloads.push(request.payload.to_string());
            log.urls.push(request.url.to_string());
            log.tokens.push(request.token.to_string());
        }
        self.outcomes
            .pop_front()
            .unwrap_or_else(|| Ok(Response::new(204, "")))
    }

    fn health_check(
        &mut self,
        url: &str,
        _token: &str,
        _timeout: Duration,
    ) -> Result<Response, TransportError> {
        self.log.borrow_mut().health_urls.push(url.to_string());
        Ok(self.health.clone())
    }
}

/// Sleeper that records requested delays instead of blocking.
#[derive(Clone, Default)]
pub struct RecordingSleeper(pub Rc<RefCell<Vec<Duration>>>);

impl Sleeper for RecordingSleeper {
    fn sleep(&mut self, duration: Duration) {
        self.0.borrow_mut().push(duration);
    }
}

/// Power control that records deep sleep requests.
#[derive(Default)]
pub struct RecordingPower {
    pub sleeps: Vec<Duration>,
}

impl PowerControl for RecordingPower {
    fn deep_sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
    }
}

/// Handles for inspecting a test client's collaborators.
pub struct Recorded {
    pub log: Rc<RefCell<Log>>,
    pub sleeps: Rc<RefCell<Vec<Duration>>>,
}

impl Recorded {
    pub fn payloads(&self) -> Vec<String> {
        self.log.borrow().payloads.clone()
    }

    pub fn sends(&self) -> usize {
        self.log.borrow().payloads.len()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }
}

/// Builds a client over `transport` with a fixed clock and recorded delays.
/// `begin` is not called.
pub fn unstarted(transport: ScriptedTransport) -> (Client<ScriptedTransport>, Recorded) {
    let sleeper = RecordingSleeper::default();
    let seen = Recorded {
        log: Rc::clone(&transport.log),
        sleeps: Rc::clone(&sleeper.0),
    };
    let client = Client::new(Credentials::new("secret", "acme", "sensors"), transport)
        .with_clock(FixedClock(NOW))
        .with_sleeper(sleeper);
    (client, seen)
}

/// As [`unstarted`], then `begin(BASE_URL)`.
pub fn started(transport: ScriptedTransport) -> (Client<ScriptedTransport>, Recorded) {
    let (mut client, seen) = unstarted(transport);
    client.begin(BASE_URL).unwrap();
    (client, seen)
}
