//! Typed-line commands handled by the terminal itself.
//!
//! Only view-local commands are intercepted. Everything else, including
//! protocol commands such as `/nick` and `/who`, goes to the server as typed.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Toggle and persist the theme.
    Theme,
    /// Print the current roster.
    Users,
    Quit,
    Message(String),
}

impl Input {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "/theme" => Self::Theme,
            "/users" => Self::Users,
            "/quit" | "/exit" => Self::Quit,
            _ => Self::Message(line.to_string()),
        }
    }
}
