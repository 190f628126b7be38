//! WebSocket ingestion endpoint
//!
//! The archiving bot connects over `/ws` and streams envelopes, which are
//! forwarded to the indexing pipeline.
//!
//! - **Registry**: the set of live connections, owned by one task
//! - **Connection**: the reader and writer pumps run for every client
//! - **Server**: token check and upgrade
//!
//! ```text
//! bot ──► /ws ──► read_pump ──► IndexingPipeline
//!                    │
//!          ConnectionRegistry ──► mailbox ──► write_pump ──► bot
//! ```

pub mod connection;
pub mod registry;
pub mod server;

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use connection::{read_pump, write_pump};
pub use registry::{Connection, ConnectionRegistry};
pub use server::{authorize, token_digest, websocket_handler};

/// WebSocket configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketConfig {
    /// Frames buffered per connection before it is dropped as too slow
    #[serde(default = "default_outbound_capacity")]
    pub outbound_capacity: usize,

    /// Time allowed to write one frame
    #[serde(default = "default_write_wait_secs")]
    pub write_wait_secs: u64,

    /// Time allowed between pongs from the peer
    #[serde(default = "default_pong_wait_secs")]
    pub pong_wait_secs: u64,

    /// Ping interval; must be shorter than `pong_wait_secs`
    #[serde(default = "default_ping_period_secs")]
    pub ping_period_secs: u64,

    /// Largest inbound message accepted, in bytes
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
}

impl WebSocketConfig {
    pub fn write_wait(&self) -> Duration {
        Duration::from_secs(self.write_wait_secs)
    }

    pub fn pong_wait(&self) -> Duration {
        Duration::from_secs(self.pong_wait_secs)
    }

    pub fn ping_period(&self) -> Duration {
        Duration::from_secs(self.ping_period_secs.max(1))
    }
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            outbound_capacity: default_outbound_capacity(),
            write_wait_secs: default_write_wait_secs(),
            pong_wait_secs: default_pong_wait_secs(),
            ping_period_secs: default_ping_period_secs(),
            max_message_size: default_max_message_size(),
        }
    }
}

fn default_outbound_capacity() -> usize {
    256
}

fn default_write_wait_secs() -> u64 {
    10
}

fn default_pong_wait_secs() -> u64 {
    60
}

fn default_ping_period_secs() -> u64 {
    54
}

fn default_max_message_size() -> usize {
    512 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = WebSocketConfig::default();
        assert_eq!(config.outbound_capacity, 256);
        assert_eq!(config.write_wait(), Duration::from_secs(10));
        assert_eq!(config.pong_wait(), Duration::from_secs(60));
        assert_eq!(config.ping_period(), Duration::from_secs(54));
        assert_eq!(config.max_message_size, 524_288);
        assert!(config.ping_period() < config.pong_wait());
    }
}
