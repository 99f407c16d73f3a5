//! Error types for the chat client.
//!
//! Transport failures never escape the driver loop: they are turned into a
//! state transition and a system line, then a scheduled reconnect. The
//! variants below exist for the transport layer and the configuration
//! surface that front-ends build on.

use std::path::PathBuf;

/// Main error type for chatwire operations.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Connection closed")]
    Closed,

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid configuration at {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChatError {
    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Whether the failure resolves to a scheduled reconnect.
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Closed | Self::InvalidUrl(_))
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ChatError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;
        match err {
            WsError::ConnectionClosed | WsError::AlreadyClosed => Self::Closed,
            WsError::Url(e) => Self::InvalidUrl(e.to_string()),
            other => Self::Transport(other.to_string()),
        }
    }
}

/// Result type alias using ChatError.
pub type Result<T> = std::result::Result<T, ChatError>;
