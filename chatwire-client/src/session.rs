//! The session context and the read-only view handed to front-ends.
//!
//! One [`Session`] exists per client. It owns everything reconciled from the
//! wire: membership, the local nickname, the color memo table, and the
//! append-only event log. It is owned by the connection manager and only
//! ever touched from the single task that drives it.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use crate::color::{Color, ColorAssigner};
use crate::identity::SessionIdentity;
use crate::manager::ConnectionState;
use crate::presence::PresenceSet;
use crate::protocol::{classify, ClassifiedEvent};

/// Styling class of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineTag {
    /// Notices, presence changes, snapshots.
    System,
    /// Chat sent by the local participant.
    ///
    /// Decided against the nickname held when the line arrives and never
    /// revised after a rename, unlike [`RosterEntry::is_self`], which is
    /// recomputed every time the roster is built.
    Own,
    /// Everything else.
    Plain,
}

/// One human-readable line of the event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub text: String,
    pub tag: LineTag,
    /// Author of a chat line.
    pub sender: Option<String>,
    /// Author's color, for chat lines.
    pub color: Option<Color>,
    pub at: SystemTime,
}

impl LogEntry {
    fn notice(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: LineTag::System,
            sender: None,
            color: None,
            at: SystemTime::now(),
        }
    }
}

/// One member as shown in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    pub color: Color,
    pub is_self: bool,
}

/// Updates pushed to front-ends.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientUpdate {
    Status(ConnectionState),
    Line(LogEntry),
    Roster(Vec<RosterEntry>),
}

/// Outcome of ingesting one inbound line.
#[derive(Debug, Clone)]
pub struct Ingested {
    pub event: ClassifiedEvent,
    pub entry: LogEntry,
    /// Membership or the "is me" marker changed.
    pub roster_changed: bool,
}

/// Everything reconciled from the wire for one participant.
#[derive(Debug, Default)]
pub struct Session {
    presence: PresenceSet,
    identity: SessionIdentity,
    colors: ColorAssigner,
    log: Vec<LogEntry>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify `line`, reconcile presence and identity, and log it.
    ///
    /// Whether a chat line is our own is decided here, against the identity
    /// held at arrival, and is never revised afterwards.
    pub fn ingest(&mut self, line: &str) -> Ingested {
        let event = classify(line);

        let mut roster_changed = self.presence.apply(&event);
        if let ClassifiedEvent::RenameNotice { from, to } = &event {
            if self.identity.observe_rename(from, to) {
                roster_changed = true;
            }
        }

        let entry = match &event {
            ClassifiedEvent::ChatMessage { from, .. } => LogEntry {
                text: line.to_string(),
                tag: if self.identity.is_self(from) {
                    LineTag::Own
                } else {
                    LineTag::Plain
                },
                sender: Some(from.clone()),
                color: Some(self.colors.color_for(from)),
                at: SystemTime::now(),
            },
            other if other.is_system_class() => LogEntry::notice(line),
            _ => LogEntry {
                tag: LineTag::Plain,
                ..LogEntry::notice(line)
            },
        };
        self.log.push(entry.clone());

        Ingested {
            event,
            entry,
            roster_changed,
        }
    }

    /// Append a locally generated system line.
    pub fn push_notice(&mut self, text: impl Into<String>) -> LogEntry {
        let entry = LogEntry::notice(text);
        self.log.push(entry.clone());
        entry
    }

    /// Members in display order, with color and "is me" marker.
    pub fn roster(&mut self) -> Vec<RosterEntry> {
        self.presence
            .view()
            .into_iter()
            .map(|name| RosterEntry {
                color: self.colors.color_for(&name),
                is_self: self.identity.is_self(&name),
                name,
            })
            .collect()
    }

    pub fn color_for(&mut self, identity: &str) -> Color {
        self.colors.color_for(identity)
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn presence(&self) -> &PresenceSet {
        &self.presence
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    pub fn identity_mut(&mut self) -> &mut SessionIdentity {
        &mut self.identity
    }
}
