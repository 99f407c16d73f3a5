//! Outbound intents and their wire forms.
//!
//! Local input is trimmed and validated here. Empty input is suppressed
//! without any error or traffic. Anything submitted while the connection is
//! not up is dropped, not queued; the user retries once it is back.

use crate::identity::SessionIdentity;
use crate::manager::ConnectionState;
use crate::protocol::{nick_line, parse_nick_command, who_line};

/// A local user intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Chat text, sent verbatim (a typed `/nick <name>` also renames).
    SendMessage(String),
    SetNickname(String),
    QueryMembership,
}

/// Validates intents and serializes them into wire lines.
pub struct OutboundGateway;

impl OutboundGateway {
    /// Turn `intent` into the line to send, if any.
    ///
    /// Renames update `identity` optimistically even when the line itself is
    /// dropped for being offline, so the name is re-asserted on reconnect.
    pub fn prepare(
        intent: Intent,
        state: ConnectionState,
        identity: &mut SessionIdentity,
    ) -> Option<String> {
        let line = match intent {
            Intent::SendMessage(text) => {
                let text = text.trim();
                if text.is_empty() {
                    log::debug!("Suppressing empty message");
                    return None;
                }
                if let Some(name) = parse_nick_command(text) {
                    identity.request_rename(name);
                }
                text.to_string()
            }
            Intent::SetNickname(name) => {
                let name = name.trim();
                if name.is_empty() {
                    log::debug!("Suppressing empty nickname");
                    return None;
                }
                identity.request_rename(name);
                nick_line(name)
            }
            Intent::QueryMembership => who_line(),
        };

        if state != ConnectionState::Connected {
            log::debug!("Dropping outbound line while {}", state.label());
            return None;
        }
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepare(intent: Intent, state: ConnectionState) -> (Option<String>, SessionIdentity) {
        let mut identity = SessionIdentity::new();
        let line = OutboundGateway::prepare(intent, state, &mut identity);
        (line, identity)
    }

    #[test]
    fn test_message_serialized_verbatim() {
        let (line, _) = prepare(
            Intent::SendMessage("  hello there ".into()),
            ConnectionState::Connected,
        );
        assert_eq!(line.as_deref(), Some("hello there"));
    }

    #[test]
    fn test_empty_input_suppressed() {
        for intent in [
            Intent::SendMessage("   ".into()),
            Intent::SetNickname("\t".into()),
        ] {
            let (line, identity) = prepare(intent, ConnectionState::Connected);
            assert_eq!(line, None);
            assert_eq!(identity.current(), None);
        }
    }

    #[test]
    fn test_set_nickname() {
        let (line, identity) = prepare(
            Intent::SetNickname(" bob ".into()),
            ConnectionState::Connected,
        );
        assert_eq!(line.as_deref(), Some("/nick bob"));
        assert_eq!(identity.current(), Some("bob"));
    }

    #[test]
    fn test_query_membership() {
        let (line, _) = prepare(Intent::QueryMembership, ConnectionState::Connected);
        assert_eq!(line.as_deref(), Some("/who"));
    }

    #[test]
    fn test_typed_nick_command_renames() {
        let (line, identity) = prepare(
            Intent::SendMessage("/nick carol".into()),
            ConnectionState::Connected,
        );
        assert_eq!(line.as_deref(), Some("/nick carol"));
        assert_eq!(identity.current(), Some("carol"));
    }

    #[test]
    fn test_offline_intents_dropped() {
        for state in [
            ConnectionState::Idle,
            ConnectionState::Connecting,
            ConnectionState::Disconnected,
        ] {
            let (line, _) = prepare(Intent::SendMessage("hi".into()), state);
            assert_eq!(line, None);
            let (line, _) = prepare(Intent::QueryMembership, state);
            assert_eq!(line, None);
        }
    }

    #[test]
    fn test_offline_rename_still_held() {
        let (line, identity) = prepare(
            Intent::SetNickname("dave".into()),
            ConnectionState::Disconnected,
        );
        assert_eq!(line, None);
        assert_eq!(identity.current(), Some("dave"));
    }
}
