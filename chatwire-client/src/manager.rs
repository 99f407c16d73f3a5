//! Connection lifecycle state machine.
//!
//! The manager performs no I/O. Every input (a transport report, a timer
//! deadline, a user intent) updates state and returns the [`Action`]s the
//! driver must carry out. Updates for front-ends accumulate in an outbox
//! drained with [`ConnectionManager::take_updates`].
//!
//! ```text
//!            start            opened
//!   Idle ──────────▶ Connecting ──────▶ Connected
//!                      ▲    │               │
//!          retry timer │    │ open failed   │ closed
//!                      │    ▼               │
//!                   Disconnected ◀──────────┘
//! ```
//!
//! Retries use a flat backoff and never give up. Each connection attempt
//! carries a number; reports from a superseded attempt are ignored.

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::config::ClientConfig;
use crate::gateway::{Intent, OutboundGateway};
use crate::protocol::{nick_line, who_line, ClassifiedEvent};
use crate::session::{ClientUpdate, Session};
use crate::timer::Timer;

/// Client connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Connected,
    Disconnected,
}

impl ConnectionState {
    /// Human-readable status label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Connecting => "Connecting…",
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
        }
    }
}

/// I/O the driver performs on the manager's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Open a new transport, superseding any previous one.
    Open { attempt: u64, url: String },
    /// Write one line to the live transport.
    Send(String),
    /// Close the live transport.
    Close,
}

/// Owns the session and drives it through the connection lifecycle.
pub struct ConnectionManager {
    config: ClientConfig,
    url: String,
    state: ConnectionState,
    session: Session,
    /// Number of the current connection attempt.
    attempt: u64,
    retry: Timer,
    who_query: Timer,
    updates: Vec<ClientUpdate>,
}

impl ConnectionManager {
    pub fn new(url: impl Into<String>, config: ClientConfig) -> Self {
        Self {
            config,
            url: url.into(),
            state: ConnectionState::Idle,
            session: Session::new(),
            attempt: 0,
            retry: Timer::new(),
            who_query: Timer::new(),
            updates: Vec::new(),
        }
    }

    // ── Lifecycle inputs ─────────────────────────────────────────

    /// Leave `Idle` and open the first connection.
    pub fn start(&mut self) -> Vec<Action> {
        if self.state != ConnectionState::Idle {
            log::debug!("start() ignored while {}", self.state.label());
            return Vec::new();
        }
        vec![self.begin_attempt()]
    }

    /// The transport for `attempt` is open.
    pub fn on_opened(&mut self, attempt: u64, now: Instant) -> Vec<Action> {
        if !self.is_current(attempt) || self.state != ConnectionState::Connecting {
            return Vec::new();
        }
        self.set_state(ConnectionState::Connected);
        log::info!("Connected to {} (attempt {attempt})", self.url);

        // Let the server register us before asking who is here.
        self.who_query.arm(now, self.config.who_delay);

        let mut actions = Vec::new();
        if let Some(name) = self.session.identity().current() {
            actions.push(Action::Send(nick_line(name)));
        }
        actions
    }

    /// The transport for `attempt` could not be opened.
    pub fn on_open_failed(&mut self, attempt: u64, reason: &str, now: Instant) {
        if !self.is_current(attempt) || self.state != ConnectionState::Connecting {
            return;
        }
        log::warn!("Connection to {} failed: {reason}", self.url);
        self.notice(format!("* connection failed: {reason} *"));
        self.enter_disconnected(now);
    }

    /// The transport for `attempt` closed, for any reason.
    pub fn on_closed(&mut self, attempt: u64, code: Option<u16>, now: Instant) {
        if !self.is_current(attempt) {
            return;
        }
        match self.state {
            ConnectionState::Connected => {}
            ConnectionState::Connecting => {
                self.on_open_failed(attempt, "closed during handshake", now);
                return;
            }
            _ => return,
        }
        log::warn!("Connection to {} closed (code {code:?})", self.url);
        let text = match code {
            Some(code) => format!("* disconnected ({code}) *"),
            None => "* disconnected *".to_string(),
        };
        self.notice(text);
        self.enter_disconnected(now);
    }

    /// One inbound line on `attempt`. Returns the classified event, or
    /// `None` if the line arrived on a superseded or closed connection.
    pub fn on_line(&mut self, attempt: u64, line: &str) -> Option<ClassifiedEvent> {
        if !self.is_current(attempt) || self.state != ConnectionState::Connected {
            log::debug!("Discarding line from stale attempt {attempt}");
            return None;
        }
        let ingested = self.session.ingest(line);
        self.updates.push(ClientUpdate::Line(ingested.entry));
        if ingested.roster_changed {
            self.push_roster();
        }
        Some(ingested.event)
    }

    /// Fire whichever timers are due at `now`.
    pub fn on_deadline(&mut self, now: Instant) -> Vec<Action> {
        let mut actions = Vec::new();

        if self.retry.fire(now) && self.state == ConnectionState::Disconnected {
            actions.push(self.begin_attempt());
        }

        if self.who_query.fire(now) && self.state == ConnectionState::Connected {
            actions.push(Action::Send(who_line()));
        }

        actions
    }

    /// Earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.retry.deadline(), self.who_query.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// End the session: cancel timers and close any live transport.
    pub fn shutdown(&mut self) -> Vec<Action> {
        self.retry.cancel();
        self.who_query.cancel();

        let live = matches!(
            self.state,
            ConnectionState::Connecting | ConnectionState::Connected
        );
        // Late reports from the closed transport become stale.
        self.attempt += 1;
        self.set_state(ConnectionState::Idle);
        log::info!("Session shut down");

        if live {
            vec![Action::Close]
        } else {
            Vec::new()
        }
    }

    // ── Local inputs ─────────────────────────────────────────────

    /// Submit a user intent through the outbound gateway.
    pub fn submit(&mut self, intent: Intent) -> Vec<Action> {
        let before = self.session.identity().current().map(str::to_owned);
        let line = OutboundGateway::prepare(intent, self.state, self.session.identity_mut());
        if self.session.identity().current() != before.as_deref() {
            self.push_roster();
        }
        line.map(Action::Send).into_iter().collect()
    }

    /// Append a local system line to the event log.
    pub fn note(&mut self, text: impl Into<String>) {
        self.notice(text);
    }

    // ── Accessors ────────────────────────────────────────────────

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn is_retry_pending(&self) -> bool {
        self.retry.is_pending()
    }

    pub fn is_query_pending(&self) -> bool {
        self.who_query.is_pending()
    }

    /// Drain updates accumulated since the last call.
    pub fn take_updates(&mut self) -> Vec<ClientUpdate> {
        std::mem::take(&mut self.updates)
    }

    // ── Internals ────────────────────────────────────────────────

    fn is_current(&self, attempt: u64) -> bool {
        attempt == self.attempt
    }

    fn begin_attempt(&mut self) -> Action {
        self.attempt += 1;
        self.set_state(ConnectionState::Connecting);
        log::info!("Connecting to {} (attempt {})", self.url, self.attempt);
        Action::Open {
            attempt: self.attempt,
            url: self.url.clone(),
        }
    }

    fn enter_disconnected(&mut self, now: Instant) {
        self.who_query.cancel();
        self.set_state(ConnectionState::Disconnected);
        if self.retry.arm(now, self.config.reconnect_delay) {
            log::info!(
                "Reconnecting in {}ms",
                self.config.reconnect_delay.as_millis()
            );
        }
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            self.state = state;
            self.updates.push(ClientUpdate::Status(state));
        }
    }

    fn notice(&mut self, text: impl Into<String>) {
        let entry = self.session.push_notice(text);
        self.updates.push(ClientUpdate::Line(entry));
    }

    fn push_roster(&mut self) {
        let roster = self.session.roster();
        self.updates.push(ClientUpdate::Roster(roster));
    }
}
