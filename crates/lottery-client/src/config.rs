//! Configuration for the lottery client.
//!
//! Defaults can be overridden by an optional TOML file and by CLI
//! flags (flags win). Validation runs once before a session starts.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use lottery_protocol::wire_types::MAX_FRAME_LEN;

/// Configuration for one client session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Address of the lottery service (`host:port`).
    pub server_addr: String,

    /// Identity of this agency, included in every outgoing message.
    pub agency_id: String,

    /// Maximum number of bets per batch.
    pub batch_size: usize,

    /// Fixed interval between winners polls, in milliseconds.
    pub poll_interval_ms: u64,

    /// Ceiling for declared incoming frame lengths, in bytes.
    pub max_frame_len: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:9010".to_string(),
            agency_id: "1".to_string(),
            batch_size: 100,
            poll_interval_ms: 100,
            max_frame_len: MAX_FRAME_LEN,
        }
    }
}

impl ClientConfig {
    /// Load a config from a TOML file, filling unset keys with
    /// defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config = toml::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server_addr.is_empty() {
            bail!("server_addr must not be empty");
        }
        if self.agency_id.is_empty() {
            bail!("agency_id must not be empty");
        }
        if self.batch_size == 0 {
            bail!("batch_size must be positive");
        }
        if self.max_frame_len == 0 {
            bail!("max_frame_len must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        ClientConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_a_zero_batch_size() {
        let config = ClientConfig {
            batch_size: 0,
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_an_empty_agency_id() {
        let config = ClientConfig {
            agency_id: String::new(),
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_fills_missing_keys_with_defaults() {
        let config: ClientConfig =
            toml::from_str("agency_id = \"4\"\nbatch_size = 25\n").unwrap();

        assert_eq!(config.agency_id, "4");
        assert_eq!(config.batch_size, 25);
        assert_eq!(config.poll_interval_ms, 100);
        assert_eq!(config.max_frame_len, MAX_FRAME_LEN);
    }
}
