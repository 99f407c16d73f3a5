//! Async driver for the connection manager.
//!
//! A single task owns the [`ConnectionManager`] and multiplexes four event
//! sources: the pending connect, the live transport, user commands, and the
//! earliest timer deadline. Actions returned by the manager are executed in
//! order; updates are forwarded to the front-end channel after each step.
//!
//! Log lines and status changes are never dropped: when the front-end falls
//! behind, the loop waits for room in the update channel. A roster only
//! matters until the next one, so a roster that does not fit is held back
//! and replaced by any newer one.
//!
//! ```text
//!  ChatHandle ──commands──▶ ┌──────────────┐ ──Open/Send/Close──▶ Transport
//!                           │  ChatClient  │
//!  ClientUpdate ◀──updates─ │  (manager)   │ ◀──lines / close──── Transport
//!                           └──────────────┘
//!                                  ▲
//!                            sleep_until(next_deadline)
//! ```

use std::future::Future;
use std::pin::Pin;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::ClientConfig;
use crate::error::{ChatError, Result};
use crate::gateway::Intent;
use crate::manager::{Action, ConnectionManager};
use crate::session::{ClientUpdate, LogEntry, RosterEntry};
use crate::transport::{Connector, Endpoint, Inbound, PageOrigin, Transport, WsConnector};

/// Notice logged when the driver starts.
pub const STARTUP_NOTICE: &str = "* client started *";

#[derive(Debug)]
enum Command {
    Intent(Intent),
    Note(String),
    Log(oneshot::Sender<Vec<LogEntry>>),
    Shutdown,
}

/// Cloneable handle for submitting user input to a running client.
#[derive(Debug, Clone)]
pub struct ChatHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl ChatHandle {
    pub fn send_message(&self, text: impl Into<String>) -> Result<()> {
        self.send(Command::Intent(Intent::SendMessage(text.into())))
    }

    pub fn set_nickname(&self, name: impl Into<String>) -> Result<()> {
        self.send(Command::Intent(Intent::SetNickname(name.into())))
    }

    pub fn query_membership(&self) -> Result<()> {
        self.send(Command::Intent(Intent::QueryMembership))
    }

    /// Append a local system line to the event log.
    pub fn note(&self, text: impl Into<String>) -> Result<()> {
        self.send(Command::Note(text.into()))
    }

    /// Copy of the full event log, oldest first.
    pub async fn event_log(&self) -> Result<Vec<LogEntry>> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Log(tx))?;
        rx.await.map_err(|_| ChatError::Closed)
    }

    /// Stop the client, closing any live connection.
    pub fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown)
    }

    fn send(&self, cmd: Command) -> Result<()> {
        self.cmd_tx.send(cmd).map_err(|_| ChatError::Closed)
    }
}

/// The chat client.
///
/// Create it, take the update receiver, then [`run`](Self::run) or
/// [`spawn`](Self::spawn) it.
pub struct ChatClient<C: Connector> {
    connector: C,
    manager: ConnectionManager,
    cmd_tx: mpsc::UnboundedSender<Command>,
    cmd_rx: mpsc::UnboundedReceiver<Command>,
    update_tx: mpsc::Sender<ClientUpdate>,
    update_rx: Option<mpsc::Receiver<ClientUpdate>>,
}

impl ChatClient<WsConnector> {
    /// WebSocket client for a front-end hosted at `origin`.
    pub fn websocket(origin: &PageOrigin, config: ClientConfig) -> Self {
        let url = Endpoint::resolve(origin, &config).url();
        let connector = WsConnector::from_config(&config);
        Self::new(connector, url, config)
    }
}

impl<C: Connector> ChatClient<C> {
    pub fn new(connector: C, url: impl Into<String>, config: ClientConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::channel(config.update_channel_capacity.max(1));
        Self {
            connector,
            manager: ConnectionManager::new(url, config),
            cmd_tx,
            cmd_rx,
            update_tx,
            update_rx: Some(update_rx),
        }
    }

    /// Take the update receiver (can only be called once).
    pub fn take_update_rx(&mut self) -> Option<mpsc::Receiver<ClientUpdate>> {
        self.update_rx.take()
    }

    pub fn handle(&self) -> ChatHandle {
        ChatHandle {
            cmd_tx: self.cmd_tx.clone(),
        }
    }

    pub fn url(&self) -> &str {
        self.manager.url()
    }

    /// Run on a new task.
    pub fn spawn(self) -> JoinHandle<()>
    where
        C: 'static,
    {
        tokio::spawn(self.run())
    }

    /// Drive the session until shut down or every handle is dropped.
    pub async fn run(self) {
        let ChatClient {
            connector,
            manager,
            cmd_tx,
            mut cmd_rx,
            update_tx,
            update_rx,
        } = self;
        // Only external handles keep the loop alive.
        drop(cmd_tx);
        drop(update_rx);

        let mut rt = Runtime {
            connector: &connector,
            manager,
            transport: None,
            connecting: None,
            update_tx,
            held_roster: None,
        };

        rt.manager.note(STARTUP_NOTICE);
        let actions = rt.manager.start();
        rt.execute(actions).await;

        loop {
            rt.flush().await;
            let deadline = rt.manager.next_deadline();
            let roster_held = rt.held_roster.is_some();

            tokio::select! {
                (attempt, result) = poll_connecting(&mut rt.connecting) => {
                    rt.connecting = None;
                    rt.on_connect_result(attempt, result).await;
                }
                (attempt, inbound) = poll_transport(&mut rt.transport) => {
                    rt.on_inbound(attempt, inbound);
                }
                cmd = cmd_rx.recv() => match cmd {
                    Some(Command::Intent(intent)) => {
                        let actions = rt.manager.submit(intent);
                        rt.execute(actions).await;
                    }
                    Some(Command::Note(text)) => rt.manager.note(text),
                    Some(Command::Log(reply)) => {
                        let _ = reply.send(rt.manager.session().log().to_vec());
                    }
                    Some(Command::Shutdown) | None => {
                        let actions = rt.manager.shutdown();
                        rt.execute(actions).await;
                        rt.flush().await;
                        break;
                    }
                },
                permit = rt.update_tx.clone().reserve_owned(), if roster_held => {
                    let roster = rt.held_roster.take();
                    if let (Ok(permit), Some(roster)) = (permit, roster) {
                        permit.send(ClientUpdate::Roster(roster));
                    }
                }
                _ = sleep_until(deadline) => {
                    let actions = rt.manager.on_deadline(Instant::now());
                    rt.execute(actions).await;
                }
            }
        }
        log::debug!("Client loop exited");
    }
}

// ───────────────────────────────────────────────────────────────────
// Loop state
// ───────────────────────────────────────────────────────────────────

type Connecting<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

struct Runtime<'a, C: Connector> {
    connector: &'a C,
    manager: ConnectionManager,
    /// Live transport and the attempt it belongs to.
    transport: Option<(u64, C::Transport)>,
    /// In-flight connect and the attempt it belongs to.
    connecting: Option<(u64, Connecting<'a, C::Transport>)>,
    update_tx: mpsc::Sender<ClientUpdate>,
    /// Newest roster that did not fit in the update channel.
    held_roster: Option<Vec<RosterEntry>>,
}

impl<'a, C: Connector> Runtime<'a, C> {
    async fn execute(&mut self, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::Open { attempt, url } => {
                    // Superseded connections are simply abandoned.
                    self.transport = None;
                    log::debug!("Opening transport for attempt {attempt}");
                    let connector: &'a C = self.connector;
                    self.connecting = Some((attempt, connector.connect(url)));
                }
                Action::Send(line) => {
                    let Some((attempt, transport)) = self.transport.as_mut() else {
                        log::debug!("No live transport, dropping {line:?}");
                        continue;
                    };
                    let attempt = *attempt;
                    if let Err(e) = transport.send(line).await {
                        log::warn!("Send failed: {e}");
                        self.transport = None;
                        self.manager.on_closed(attempt, None, Instant::now());
                    }
                }
                Action::Close => {
                    self.connecting = None;
                    if let Some((_, mut transport)) = self.transport.take() {
                        if let Err(e) = transport.close().await {
                            log::debug!("Close failed: {e}");
                        }
                    }
                }
            }
        }
    }

    async fn on_connect_result(&mut self, attempt: u64, result: Result<C::Transport>) {
        let now = Instant::now();
        match result {
            Ok(transport) if attempt == self.manager.attempt() => {
                self.transport = Some((attempt, transport));
                let actions = self.manager.on_opened(attempt, now);
                self.execute(actions).await;
            }
            Ok(_) => log::debug!("Dropping transport for stale attempt {attempt}"),
            Err(e) => self.manager.on_open_failed(attempt, &e.to_string(), now),
        }
    }

    fn on_inbound(&mut self, attempt: u64, inbound: Inbound) {
        match inbound {
            Inbound::Line(line) => {
                self.manager.on_line(attempt, &line);
            }
            Inbound::Closed(code) => {
                self.transport = None;
                self.manager.on_closed(attempt, code, Instant::now());
            }
            Inbound::Failed(reason) => {
                log::warn!("Transport error: {reason}");
                self.transport = None;
                self.manager.on_closed(attempt, None, Instant::now());
            }
        }
    }

    /// Forward pending updates, waiting for room for lines and status.
    async fn flush(&mut self) {
        for update in self.manager.take_updates() {
            match update {
                ClientUpdate::Roster(roster) => {
                    self.held_roster = Some(roster);
                    self.offer_roster();
                }
                other => {
                    if self.update_tx.send(other).await.is_err() {
                        log::trace!("Update receiver gone");
                    }
                }
            }
        }
        self.offer_roster();
    }

    fn offer_roster(&mut self) {
        let Some(roster) = self.held_roster.take() else {
            return;
        };
        match self.update_tx.try_send(ClientUpdate::Roster(roster)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(ClientUpdate::Roster(roster))) => {
                log::debug!("Update channel full, holding roster");
                self.held_roster = Some(roster);
            }
            Err(_) => {}
        }
    }
}

async fn poll_connecting<T>(connecting: &mut Option<(u64, Connecting<'_, T>)>) -> (u64, Result<T>) {
    match connecting {
        Some((attempt, fut)) => (*attempt, fut.await),
        None => std::future::pending().await,
    }
}

async fn poll_transport<T: Transport>(transport: &mut Option<(u64, T)>) -> (u64, Inbound) {
    match transport {
        Some((attempt, t)) => (*attempt, t.recv().await),
        None => std::future::pending().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
