//! # chatwire-client — Client for a line-oriented chat service
//!
//! Connects to a chat server over WebSocket, reconciles membership and the
//! local nickname from the text lines the server broadcasts, and keeps the
//! connection alive with flat-backoff reconnects.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   commands   ┌──────────────────────────────┐
//! │ ChatHandle  │ ───────────► │ ChatClient (driver task)     │
//! └─────────────┘              │  ┌────────────────────────┐  │   WebSocket
//!                              │  │ ConnectionManager      │  │ ◄──────────► server
//! ┌─────────────┐   updates    │  │  ├─ Session            │  │  text lines
//! │ front-end   │ ◄─────────── │  │  │   ├─ PresenceSet    │  │
//! └─────────────┘              │  │  │   ├─ SessionIdentity│  │
//!                              │  │  │   └─ ColorAssigner  │  │
//!                              │  │  └─ retry / who Timers │  │
//!                              │  └────────────────────────┘  │
//!                              └──────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`protocol`]: Line classification and outbound line builders
//! - [`presence`]: Membership reconciled from notices and snapshots
//! - [`identity`]: The local nickname, requested and confirmed
//! - [`color`]: Deterministic per-identity colors
//! - [`session`]: Event log and front-end view types
//! - [`gateway`]: Outbound intent validation
//! - [`manager`]: Sans-I/O connection state machine
//! - [`transport`]: WebSocket transport and endpoint selection
//! - [`client`]: Async driver and user handle

pub mod client;
pub mod color;
pub mod config;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod manager;
pub mod presence;
pub mod protocol;
pub mod session;
pub mod timer;
pub mod transport;

// Re-exports for convenience
pub use client::{ChatClient, ChatHandle, STARTUP_NOTICE};
pub use color::{Color, ColorAssigner};
pub use config::ClientConfig;
pub use error::{ChatError, Result};
pub use gateway::{Intent, OutboundGateway};
pub use identity::SessionIdentity;
pub use manager::{Action, ConnectionManager, ConnectionState};
pub use presence::PresenceSet;
pub use protocol::{classify, ClassifiedEvent};
pub use session::{ClientUpdate, LineTag, LogEntry, RosterEntry, Session};
pub use transport::{Connector, Endpoint, Inbound, PageOrigin, Transport, WsConnector};
