//! The local participant's nickname.
//!
//! Renames are two-phase. A local request is applied immediately so the
//! interface reflects it, but the server's rename notice is authoritative:
//! whatever name the server reports is the one that sticks.
//!
//! ```text
//! request_rename("bob")      confirmed: alice   requested: bob    current: bob
//! * alice is now bob *       confirmed: bob     requested: —      current: bob
//! * alice is now carol *     confirmed: carol   requested: —      current: carol
//! ```

/// Local nickname, tracked as requested vs confirmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionIdentity {
    /// Name held before the pending request, or the last name the server
    /// reported for us.
    confirmed: Option<String>,
    /// Name asked for locally and not yet echoed back.
    requested: Option<String>,
}

impl SessionIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Optimistically adopt `name` ahead of the server's echo.
    ///
    /// Whatever was held until now becomes the name the server is expected
    /// to rename *from*.
    pub fn request_rename(&mut self, name: impl Into<String>) {
        if let Some(previous) = self.requested.take() {
            self.confirmed = Some(previous);
        }
        self.requested = Some(name.into());
    }

    /// Reconcile against an observed `* from is now to *` notice.
    ///
    /// Returns `true` if the held identity changed.
    pub fn observe_rename(&mut self, from: &str, to: &str) -> bool {
        let held = self.current().map(str::to_owned);
        let ours = held.as_deref() == Some(from) || self.confirmed.as_deref() == Some(from);

        if ours {
            self.confirmed = Some(to.to_string());
            self.requested = None;
            return held.as_deref() != Some(to);
        }

        // Someone (the server) moved a name we don't know onto the one we
        // asked for: that is the echo of our request.
        if self.requested.as_deref() == Some(to) {
            self.confirmed = self.requested.take();
        }
        false
    }

    /// The identity held right now: a pending request, else the confirmed name.
    pub fn current(&self) -> Option<&str> {
        self.requested.as_deref().or(self.confirmed.as_deref())
    }

    pub fn confirmed(&self) -> Option<&str> {
        self.confirmed.as_deref()
    }

    /// Whether a local rename is still waiting for the server's echo.
    pub fn is_pending(&self) -> bool {
        self.requested.is_some()
    }

    /// Whether `name` is the local participant.
    pub fn is_self(&self, name: &str) -> bool {
        self.current() == Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let identity = SessionIdentity::new();
        assert_eq!(identity.current(), None);
        assert!(!identity.is_self("alice"));
    }

    #[test]
    fn test_request_is_visible_immediately() {
        let mut identity = SessionIdentity::new();
        identity.request_rename("alice");
        assert_eq!(identity.current(), Some("alice"));
        assert!(identity.is_pending());
        assert_eq!(identity.confirmed(), None);
    }

    #[test]
    fn test_server_overrides_optimistic_request() {
        let mut identity = SessionIdentity::new();
        identity.request_rename("alice");
        identity.request_rename("bob");
        assert_eq!(identity.current(), Some("bob"));

        assert!(identity.observe_rename("alice", "carol"));
        assert_eq!(identity.current(), Some("carol"));
        assert!(!identity.is_pending());
    }

    #[test]
    fn test_echo_confirms_request() {
        let mut identity = SessionIdentity::new();
        identity.request_rename("alice");
        identity.request_rename("bob");

        assert!(!identity.observe_rename("alice", "bob"));
        assert_eq!(identity.current(), Some("bob"));
        assert_eq!(identity.confirmed(), Some("bob"));
        assert!(!identity.is_pending());
    }

    #[test]
    fn test_echo_from_server_assigned_name() {
        let mut identity = SessionIdentity::new();
        identity.request_rename("alice");

        // The server knew us as guest1, which we never saw.
        assert!(!identity.observe_rename("guest1", "alice"));
        assert_eq!(identity.current(), Some("alice"));
        assert_eq!(identity.confirmed(), Some("alice"));
    }

    #[test]
    fn test_unrelated_rename_ignored() {
        let mut identity = SessionIdentity::new();
        identity.request_rename("alice");
        assert!(!identity.observe_rename("dave", "erin"));
        assert_eq!(identity.current(), Some("alice"));
        assert!(identity.is_pending());
    }

    #[test]
    fn test_rename_from_held_name() {
        let mut identity = SessionIdentity::new();
        identity.request_rename("alice");
        assert!(identity.observe_rename("alice", "carol"));
        assert_eq!(identity.current(), Some("carol"));
        assert!(identity.is_self("carol"));
        assert!(!identity.is_self("alice"));
    }
}
