//! Line transport over WebSocket.
//!
//! The driver only depends on the [`Connector`] and [`Transport`] traits, so
//! the connection lifecycle can be exercised against scripted transports.
//! [`WsConnector`] is the production implementation on tokio-tungstenite.
//!
//! Endpoint selection mirrors where the client is hosted: secure pages use
//! `wss`, and the page's own port is reused when it is one the chat service
//! is known to listen on, otherwise the fixed service port is used.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::fmt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::config::ClientConfig;
use crate::error::{ChatError, Result};

/// What a transport delivers on receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// One protocol line.
    Line(String),
    /// The peer closed the connection, with its close code if it sent one.
    Closed(Option<u16>),
    /// The connection broke.
    Failed(String),
}

/// An open, line-oriented duplex connection.
#[async_trait]
pub trait Transport: Send {
    /// Write one line.
    async fn send(&mut self, line: String) -> Result<()>;

    /// Wait for the next line or the end of the connection. Must be
    /// cancel-safe: dropping the future must not lose a line.
    async fn recv(&mut self) -> Inbound;

    /// Close the connection.
    async fn close(&mut self) -> Result<()>;
}

/// Opens transports.
#[async_trait]
pub trait Connector: Send + Sync {
    type Transport: Transport + 'static;

    async fn connect(&self, url: String) -> Result<Self::Transport>;
}

// ───────────────────────────────────────────────────────────────────
// WebSocket implementation
// ───────────────────────────────────────────────────────────────────

/// Connects over WebSocket, requesting the configured subprotocol.
#[derive(Debug, Clone)]
pub struct WsConnector {
    subprotocol: String,
}

impl WsConnector {
    pub fn new(subprotocol: impl Into<String>) -> Self {
        Self {
            subprotocol: subprotocol.into(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.subprotocol.clone())
    }
}

#[async_trait]
impl Connector for WsConnector {
    type Transport = WsTransport;

    async fn connect(&self, url: String) -> Result<WsTransport> {
        let mut request = url.as_str().into_client_request()?;
        if !self.subprotocol.is_empty() {
            let protocol = HeaderValue::from_str(&self.subprotocol)
                .map_err(|e| ChatError::InvalidUrl(format!("subprotocol: {e}")))?;
            request
                .headers_mut()
                .insert("Sec-WebSocket-Protocol", protocol);
        }

        let (stream, _response) = tokio_tungstenite::connect_async(request).await?;
        log::debug!("WebSocket handshake with {url} complete");
        Ok(WsTransport { stream })
    }
}

/// A WebSocket carrying one line per text frame.
pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, line: String) -> Result<()> {
        self.stream.send(Message::Text(line.into())).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Inbound {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Inbound::Line(text.as_str().to_owned()),
                Some(Ok(Message::Close(frame))) => {
                    return Inbound::Closed(frame.map(|f| u16::from(f.code)));
                }
                Some(Ok(other)) => {
                    // Ping/pong are answered by tungstenite; binary has no
                    // meaning in the line protocol.
                    log::debug!("Ignoring non-text frame ({} bytes)", other.len());
                }
                Some(Err(e)) => return Inbound::Failed(e.to_string()),
                None => return Inbound::Closed(None),
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────────
// Endpoint selection
// ───────────────────────────────────────────────────────────────────

/// Where the client itself was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOrigin {
    pub secure: bool,
    pub host: String,
    /// Explicit port, if the origin named one.
    pub port: Option<u16>,
}

impl PageOrigin {
    pub fn new(host: impl Into<String>, port: Option<u16>, secure: bool) -> Self {
        Self {
            secure,
            host: host.into(),
            port,
        }
    }

    /// The port in effect: explicit, else the scheme default.
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(if self.secure { 443 } else { 80 })
    }
}

/// Resolved chat service endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub secure: bool,
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    /// Pick scheme and port for a client hosted at `origin`.
    pub fn resolve(origin: &PageOrigin, config: &ClientConfig) -> Self {
        let page_port = origin.effective_port();
        let port = if config.allowed_ports.contains(&page_port) {
            page_port
        } else {
            config.service_port
        };
        Self {
            secure: origin.secure,
            host: origin.host.clone(),
            port,
        }
    }

    pub fn scheme(&self) -> &'static str {
        if self.secure {
            "wss"
        } else {
            "ws"
        }
    }

    pub fn url(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') && !self.host.starts_with('[') {
            write!(f, "{}://[{}]:{}", self.scheme(), self.host, self.port)
        } else {
            write!(f, "{}://{}:{}", self.scheme(), self.host, self.port)
        }
    }
}
