//! Client configuration.

use std::time::Duration;

/// Port the chat service listens on when it is not colocated with the page.
pub const DEFAULT_SERVICE_PORT: u16 = 9101;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Fallback service port
    pub service_port: u16,
    /// Page ports that are reused as-is for the chat endpoint
    pub allowed_ports: Vec<u16>,
    /// Flat delay before each reconnect attempt
    pub reconnect_delay: Duration,
    /// Delay between a successful open and the membership query
    pub who_delay: Duration,
    /// WebSocket subprotocol requested on connect
    pub subprotocol: String,
    /// Capacity of the update channel handed to front-ends
    pub update_channel_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service_port: DEFAULT_SERVICE_PORT,
            allowed_ports: vec![DEFAULT_SERVICE_PORT, 80, 443],
            reconnect_delay: Duration::from_secs(2),
            who_delay: Duration::from_millis(200),
            subprotocol: "chat".to_string(),
            update_channel_capacity: 256,
        }
    }
}

impl ClientConfig {
    /// Override the reconnect backoff.
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Override the membership query delay.
    #[must_use]
    pub fn with_who_delay(mut self, delay: Duration) -> Self {
        self.who_delay = delay;
        self
    }

    /// Set the update channel capacity. Values below 1 are clamped to 1.
    #[must_use]
    pub fn with_update_channel_capacity(mut self, capacity: usize) -> Self {
        self.update_channel_capacity = capacity.max(1);
        self
    }
}
