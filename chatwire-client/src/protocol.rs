//! Line protocol: inbound classification and outbound line forms.
//!
//! The server speaks unstructured UTF-8 text, one line per WebSocket text
//! frame. Structure is recovered with a small ordered grammar; the first
//! rule that matches wins and anything unmatched degrades to a
//! [`ClassifiedEvent::SystemNotice`] carrying the raw text.
//!
//! ```text
//! ┌────────────────────────────┬──────────────────────────────┐
//! │ inbound line               │ event                        │
//! ├────────────────────────────┼──────────────────────────────┤
//! │ * alice is now bob *       │ RenameNotice { alice → bob } │
//! │ * alice joined *           │ JoinNotice { alice }         │
//! │ * alice left *             │ LeaveNotice { alice }        │
//! │ * anything else            │ SystemNotice (system class)  │
//! │ Users: alice, bob          │ MembershipSnapshot           │
//! │ [alice] hello              │ ChatMessage { alice, hello } │
//! │ anything else              │ SystemNotice (plain)         │
//! └────────────────────────────┴──────────────────────────────┘
//! ```
//!
//! Outbound the client only emits bare text, `/nick <name>` and `/who`.

use serde::{Deserialize, Serialize};

/// Marker that opens every system-class line.
pub const SYSTEM_MARKER: char = '*';
/// Prefix of a membership snapshot line.
pub const SNAPSHOT_PREFIX: &str = "Users: ";
/// Outbound rename command prefix (includes the separating space).
pub const NICK_COMMAND: &str = "/nick ";
/// Outbound membership query.
pub const WHO_COMMAND: &str = "/who";

/// A typed event recovered from one inbound line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifiedEvent {
    /// `[from] body`
    ChatMessage { from: String, body: String },
    /// Generic, non-actionable text.
    SystemNotice { text: String },
    /// Authoritative member list, deduplicated in first-seen order.
    MembershipSnapshot { members: Vec<String> },
    RenameNotice { from: String, to: String },
    JoinNotice { who: String },
    LeaveNotice { who: String },
}

impl ClassifiedEvent {
    /// Whether the line belongs to the system class (rendered as a notice
    /// rather than as chat).
    pub fn is_system_class(&self) -> bool {
        match self {
            Self::ChatMessage { .. } => false,
            Self::SystemNotice { text } => text.starts_with(SYSTEM_MARKER),
            _ => true,
        }
    }
}

// ───────────────────────────────────────────────────────────────────
// Grammar
// ───────────────────────────────────────────────────────────────────

/// A matcher returns the event when the line fits its pattern.
type Matcher = fn(&str) -> Option<ClassifiedEvent>;

/// One grammar rule: a name (for diagnostics) and its matcher.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    matcher: Matcher,
}

impl Rule {
    pub fn apply(&self, line: &str) -> Option<ClassifiedEvent> {
        (self.matcher)(line)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// Sub-rules tried, in order, on lines that open with [`SYSTEM_MARKER`].
pub const SYSTEM_RULES: &[Rule] = &[
    Rule { name: "rename", matcher: match_rename },
    Rule { name: "join", matcher: match_join },
    Rule { name: "leave", matcher: match_leave },
];

/// Rules tried, in order, on every other line.
pub const LINE_RULES: &[Rule] = &[
    Rule { name: "snapshot", matcher: match_snapshot },
    Rule { name: "chat", matcher: match_chat },
];

/// Classify one inbound line. Total: never fails.
pub fn classify(line: &str) -> ClassifiedEvent {
    let rules = if line.starts_with(SYSTEM_MARKER) {
        SYSTEM_RULES
    } else {
        LINE_RULES
    };
    rules
        .iter()
        .find_map(|rule| rule.apply(line))
        .unwrap_or_else(|| ClassifiedEvent::SystemNotice {
            text: line.to_string(),
        })
}

/// `* <from> is now <to> *`, where both names are whitespace-free runs.
fn match_rename(line: &str) -> Option<ClassifiedEvent> {
    const INFIX: &str = " is now ";
    for (idx, _) in line.match_indices(INFIX) {
        let before = &line[..idx];
        let Some(space) = before.rfind(' ') else {
            continue;
        };
        let from = &before[space + 1..];
        if from.is_empty() || from.contains(char::is_whitespace) {
            continue;
        }
        if !before[..space].ends_with(SYSTEM_MARKER) {
            continue;
        }

        let after = &line[idx + INFIX.len()..];
        let end = after.find(char::is_whitespace).unwrap_or(after.len());
        let to = &after[..end];
        if to.is_empty() || !after[end..].starts_with(" *") {
            continue;
        }

        return Some(ClassifiedEvent::RenameNotice {
            from: from.to_string(),
            to: to.to_string(),
        });
    }
    None
}

/// Text between the first `* ` and the last `<suffix>` after it.
fn marked_phrase<'a>(line: &'a str, suffix: &str) -> Option<&'a str> {
    let start = line.find("* ")? + 2;
    let rest = &line[start..];
    let end = rest.rfind(suffix)?;
    let who = &rest[..end];
    if who.trim().is_empty() {
        return None;
    }
    Some(who)
}

/// `* <text> joined *`; the identity may contain spaces.
fn match_join(line: &str) -> Option<ClassifiedEvent> {
    marked_phrase(line, " joined *").map(|who| ClassifiedEvent::JoinNotice {
        who: who.to_string(),
    })
}

/// `* <text> left *`
fn match_leave(line: &str) -> Option<ClassifiedEvent> {
    marked_phrase(line, " left *").map(|who| ClassifiedEvent::LeaveNotice {
        who: who.to_string(),
    })
}

/// `Users: a, b, c`
fn match_snapshot(line: &str) -> Option<ClassifiedEvent> {
    let rest = line.strip_prefix(SNAPSHOT_PREFIX)?;
    let mut members: Vec<String> = Vec::new();
    for entry in rest.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        if !members.iter().any(|m| m == entry) {
            members.push(entry.to_string());
        }
    }
    Some(ClassifiedEvent::MembershipSnapshot { members })
}

/// `[name] body`; the first `]` ends the name.
fn match_chat(line: &str) -> Option<ClassifiedEvent> {
    let rest = line.strip_prefix('[')?;
    let close = rest.find(']')?;
    let from = &rest[..close];
    if from.is_empty() {
        return None;
    }
    let tail = &rest[close + 1..];
    let body = tail.strip_prefix(' ').unwrap_or(tail);
    Some(ClassifiedEvent::ChatMessage {
        from: from.to_string(),
        body: body.to_string(),
    })
}

// ───────────────────────────────────────────────────────────────────
// Outbound line forms
// ───────────────────────────────────────────────────────────────────

/// Wire form of a rename request.
pub fn nick_line(name: &str) -> String {
    format!("{NICK_COMMAND}{name}")
}

/// Wire form of a membership query.
pub fn who_line() -> String {
    WHO_COMMAND.to_string()
}

/// If `text` is a typed rename command, the requested name.
pub fn parse_nick_command(text: &str) -> Option<&str> {
    let name = text.strip_prefix(NICK_COMMAND)?.trim();
    (!name.is_empty()).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice(text: &str) -> ClassifiedEvent {
        ClassifiedEvent::SystemNotice { text: text.into() }
    }

    // ── System-class lines ───────────────────────────────────────

    #[test]
    fn test_classify_rename() {
        assert_eq!(
            classify("* alice is now bob *"),
            ClassifiedEvent::RenameNotice { from: "alice".into(), to: "bob".into() }
        );
    }

    #[test]
    fn test_rename_requires_whitespace_free_names() {
        // "bob smith" is not a single run; no other rule fits either.
        assert_eq!(
            classify("* alice is now bob smith *"),
            notice("* alice is now bob smith *")
        );
    }

    #[test]
    fn test_rename_takes_priority_over_join() {
        let event = classify("* joined is now left *");
        assert_eq!(
            event,
            ClassifiedEvent::RenameNotice { from: "joined".into(), to: "left".into() }
        );
    }

    #[test]
    fn test_classify_join_with_spaces() {
        assert_eq!(
            classify("* Mary Ann joined *"),
            ClassifiedEvent::JoinNotice { who: "Mary Ann".into() }
        );
    }

    #[test]
    fn test_classify_leave() {
        assert_eq!(
            classify("* bob left *"),
            ClassifiedEvent::LeaveNotice { who: "bob".into() }
        );
    }

    #[test]
    fn test_join_with_empty_name_is_notice() {
        assert_eq!(classify("*  joined *"), notice("*  joined *"));
    }

    #[test]
    fn test_other_system_line_is_system_notice() {
        let event = classify("* server restarting *");
        assert_eq!(event, notice("* server restarting *"));
        assert!(event.is_system_class());
    }

    // ── Snapshots ────────────────────────────────────────────────

    #[test]
    fn test_classify_snapshot() {
        assert_eq!(
            classify("Users: alice, bob, carol"),
            ClassifiedEvent::MembershipSnapshot {
                members: vec!["alice".into(), "bob".into(), "carol".into()],
            }
        );
    }

    #[test]
    fn test_snapshot_discards_empty_and_duplicate_entries() {
        assert_eq!(
            classify("Users: carol,, alice ,carol,"),
            ClassifiedEvent::MembershipSnapshot {
                members: vec!["carol".into(), "alice".into()],
            }
        );
    }

    #[test]
    fn test_snapshot_prefix_is_exact() {
        assert_eq!(classify("Users:alice"), notice("Users:alice"));
        assert_eq!(
            classify("Users: "),
            ClassifiedEvent::MembershipSnapshot { members: vec![] }
        );
    }

    // ── Chat lines ───────────────────────────────────────────────

    #[test]
    fn test_classify_chat() {
        assert_eq!(
            classify("[alice] hello there"),
            ClassifiedEvent::ChatMessage { from: "alice".into(), body: "hello there".into() }
        );
    }

    #[test]
    fn test_chat_first_bracket_terminates_name() {
        assert_eq!(
            classify("[a]b] hi"),
            ClassifiedEvent::ChatMessage { from: "a".into(), body: "b] hi".into() }
        );
    }

    #[test]
    fn test_chat_without_body() {
        assert_eq!(
            classify("[alice]"),
            ClassifiedEvent::ChatMessage { from: "alice".into(), body: String::new() }
        );
    }

    #[test]
    fn test_empty_bracket_is_notice() {
        assert_eq!(classify("[] hi"), notice("[] hi"));
    }

    // ── Fallback ─────────────────────────────────────────────────

    #[test]
    fn test_unclassified_line() {
        let event = classify("random text");
        assert_eq!(event, notice("random text"));
        assert!(!event.is_system_class());
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(classify(""), notice(""));
    }

    #[test]
    fn test_rule_tables_order() {
        let names: Vec<_> = SYSTEM_RULES.iter().map(|r| r.name).collect();
        assert_eq!(names, ["rename", "join", "leave"]);
        let names: Vec<_> = LINE_RULES.iter().map(|r| r.name).collect();
        assert_eq!(names, ["snapshot", "chat"]);
    }

    // ── Outbound ─────────────────────────────────────────────────

    #[test]
    fn test_outbound_forms() {
        assert_eq!(nick_line("bob"), "/nick bob");
        assert_eq!(who_line(), "/who");
    }

    #[test]
    fn test_parse_nick_command() {
        assert_eq!(parse_nick_command("/nick  bob "), Some("bob"));
        assert_eq!(parse_nick_command("/nick    "), None);
        assert_eq!(parse_nick_command("/nickname"), None);
        assert_eq!(parse_nick_command("hello"), None);
    }
}
