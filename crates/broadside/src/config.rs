//! Server configuration.

use std::time::Duration;

use broadside_lobby::LobbyConfig;
use serde::{Deserialize, Serialize};

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Default idle timeout in seconds.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 60;

/// Default WebSocket handshake timeout in seconds.
pub const DEFAULT_HANDSHAKE_TIMEOUT_SECS: u64 = 10;

/// Top-level server configuration.
///
/// Loaded from TOML by the binary; any subset of fields may be given.
///
/// ```toml
/// bind_addr = "0.0.0.0:9000"
/// idle_timeout_secs = 30
/// handshake_timeout_secs = 5
///
/// [lobby]
/// max_name_len = 16
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,

    /// Seconds without any inbound frame before a connection is dropped.
    /// `0` disables the timeout.
    pub idle_timeout_secs: u64,

    /// Seconds a freshly accepted peer has to finish the WebSocket
    /// upgrade. `0` disables the timeout.
    pub handshake_timeout_secs: u64,

    pub lobby: LobbyConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
            handshake_timeout_secs: DEFAULT_HANDSHAKE_TIMEOUT_SECS,
            lobby: LobbyConfig::default(),
        }
    }
}

impl ServerConfig {
    /// The idle timeout, or `None` if disabled.
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0)
            .then(|| Duration::from_secs(self.idle_timeout_secs))
    }

    /// The handshake timeout, or `None` if disabled.
    pub fn handshake_timeout(&self) -> Option<Duration> {
        (self.handshake_timeout_secs > 0)
            .then(|| Duration::from_secs(self.handshake_timeout_secs))
    }
}
