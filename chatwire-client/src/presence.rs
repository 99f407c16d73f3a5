//! Room membership reconstructed from classified events.
//!
//! ```text
//! MembershipSnapshot ──▶ replace all
//! JoinNotice         ──▶ insert who
//! LeaveNotice        ──▶ remove who
//! RenameNotice       ──▶ remove from, insert to
//! ChatMessage        ──▶ insert from (a missed join is implied)
//! SystemNotice       ──▶ —
//! ```
//!
//! Each event touches only the identities it names. A snapshot is
//! authoritative and leaves no stale entries behind.

use std::collections::HashSet;

use crate::protocol::ClassifiedEvent;

/// The set of identities currently believed present.
#[derive(Debug, Clone, Default)]
pub struct PresenceSet {
    members: HashSet<String>,
}

impl PresenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one classified event. Returns `true` if membership changed.
    pub fn apply(&mut self, event: &ClassifiedEvent) -> bool {
        match event {
            ClassifiedEvent::MembershipSnapshot { members } => {
                let next: HashSet<String> = members
                    .iter()
                    .filter(|m| !m.is_empty())
                    .cloned()
                    .collect();
                let changed = next != self.members;
                self.members = next;
                changed
            }
            ClassifiedEvent::JoinNotice { who } => self.insert(who),
            ClassifiedEvent::LeaveNotice { who } => self.members.remove(who.as_str()),
            ClassifiedEvent::RenameNotice { from, to } => {
                let removed = self.members.remove(from.as_str());
                let inserted = self.insert(to);
                removed || inserted
            }
            ClassifiedEvent::ChatMessage { from, .. } => self.insert(from),
            ClassifiedEvent::SystemNotice { .. } => false,
        }
    }

    fn insert(&mut self, identity: &str) -> bool {
        if identity.is_empty() {
            return false;
        }
        self.members.insert(identity.to_string())
    }

    /// Members sorted by case-sensitive lexicographic order.
    pub fn view(&self) -> Vec<String> {
        let mut sorted: Vec<String> = self.members.iter().cloned().collect();
        sorted.sort_unstable();
        sorted
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.members.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }
}
