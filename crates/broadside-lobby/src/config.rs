//! Lobby configuration.

use serde::{Deserialize, Serialize};

/// Default longest accepted display name, in characters.
pub const DEFAULT_MAX_NAME_LEN: usize = 24;

/// Default command channel size for the lobby actor.
pub const DEFAULT_COMMAND_BUFFER: usize = 64;

/// Configuration for the lobby.
///
/// Every field has a default, so a config file may set any subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LobbyConfig {
    /// Longest display name accepted at registration, in characters.
    pub max_name_len: usize,

    /// Capacity of the actor's command channel. When full, connection
    /// tasks wait before forwarding further events.
    pub command_buffer: usize,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            max_name_len: DEFAULT_MAX_NAME_LEN,
            command_buffer: DEFAULT_COMMAND_BUFFER,
        }
    }
}

impl LobbyConfig {
    /// Normalizes a requested display name, or returns `None` if it is
    /// blank or too long.
    ///
    /// Surrounding whitespace is not part of the name.
    pub fn normalize_name(&self, name: &str) -> Option<String> {
        let name = name.trim();
        if name.is_empty() || name.chars().count() > self.max_name_len {
            return None;
        }
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lobby_config_default() {
        let config = LobbyConfig::default();
        assert_eq!(config.max_name_len, 24);
        assert_eq!(config.command_buffer, 64);
    }

    #[test]
    fn test_normalize_name_trims_whitespace() {
        let config = LobbyConfig::default();
        assert_eq!(config.normalize_name("  Ann "), Some("Ann".into()));
    }

    #[test]
    fn test_normalize_name_rejects_blank() {
        let config = LobbyConfig::default();
        assert_eq!(config.normalize_name(""), None);
        assert_eq!(config.normalize_name("   "), None);
    }

    #[test]
    fn test_normalize_name_counts_chars_not_bytes() {
        let config = LobbyConfig {
            max_name_len: 3,
            ..LobbyConfig::default()
        };
        assert_eq!(config.normalize_name("äöü"), Some("äöü".into()));
        assert_eq!(config.normalize_name("abcd"), None);
    }
}
