//! Terminal rendering of client updates.
//!
//! The view is append-only, like the event log it mirrors: every line and
//! status change is printed as it arrives. The roster is kept aside and
//! printed on demand.

use chatwire_client::{ClientUpdate, ConnectionState, LineTag, LogEntry, RosterEntry};
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use std::io::{self, Write};

use crate::theme::{identity_color, Theme};

/// Roster label, marking the local participant.
pub fn roster_label(entry: &RosterEntry) -> String {
    if entry.is_self {
        format!("{} (you)", entry.name)
    } else {
        entry.name.clone()
    }
}

pub struct TermView {
    theme: Theme,
    status: ConnectionState,
    roster: Vec<RosterEntry>,
}

impl TermView {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            status: ConnectionState::Idle,
            roster: Vec::new(),
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn status(&self) -> ConnectionState {
        self.status
    }

    pub fn roster(&self) -> &[RosterEntry] {
        &self.roster
    }

    /// Switch to the other theme and return it.
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    pub fn apply(&mut self, update: &ClientUpdate, out: &mut impl Write) -> io::Result<()> {
        match update {
            ClientUpdate::Status(state) => {
                self.status = *state;
                let color = self.theme.palette().status;
                write_colored(out, color, &format!("-- {} --", state.label()))?;
            }
            ClientUpdate::Line(entry) => self.write_entry(entry, out)?,
            ClientUpdate::Roster(roster) => self.roster = roster.clone(),
        }
        out.flush()
    }

    /// Print the roster with its member count.
    pub fn write_roster(&self, out: &mut impl Write) -> io::Result<()> {
        let palette = self.theme.palette();
        write_colored(out, palette.system, &format!("Users ({})", self.roster.len()))?;
        for entry in &self.roster {
            queue!(
                out,
                Print("  "),
                SetForegroundColor(identity_color(entry.color)),
                Print(roster_label(entry)),
                ResetColor,
                Print("\n")
            )?;
        }
        out.flush()
    }

    fn write_entry(&self, entry: &LogEntry, out: &mut impl Write) -> io::Result<()> {
        let palette = self.theme.palette();
        // A chat line is `[sender]` followed by the body, verbatim.
        let body = entry
            .sender
            .as_deref()
            .and_then(|sender| entry.text.get(sender.len() + 2..));
        match (entry.tag, entry.color, entry.sender.as_deref(), body) {
            (LineTag::System, ..) => {
                queue!(out, SetAttribute(Attribute::Italic))?;
                write_colored(out, palette.system, &entry.text)?;
                queue!(out, SetAttribute(Attribute::Reset))
            }
            (tag, Some(color), Some(sender), Some(body)) => {
                let body_color = if tag == LineTag::Own {
                    palette.own
                } else {
                    palette.text
                };
                queue!(
                    out,
                    SetForegroundColor(identity_color(color)),
                    SetAttribute(Attribute::Bold),
                    Print(format!("[{sender}]")),
                    SetAttribute(Attribute::Reset),
                    SetForegroundColor(body_color),
                    Print(body),
                    ResetColor,
                    Print("\n")
                )
            }
            _ => write_colored(out, palette.text, &entry.text),
        }
    }
}

fn write_colored(out: &mut impl Write, color: Color, text: &str) -> io::Result<()> {
    queue!(
        out,
        SetForegroundColor(color),
        Print(text),
        ResetColor,
        Print("\n")
    )
}
