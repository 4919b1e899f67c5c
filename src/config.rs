//! Configuration loading from a JSON file.
//!
//! Secrets are never part of the config; keys come from the command line or
//! environment.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "NOSTRKIT_CONFIG";

/// Relays used when none are configured
pub const DEFAULT_RELAYS: &[&str] = &[
    "wss://strfry.iris.to",
    "wss://relay.damus.io",
    "wss://relay.nostr.band",
    "wss://relay.snort.social",
];

/// Runtime settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Relays to publish to and query
    pub relays: Vec<String>,
    /// Bitcoin network name (mainnet, testnet, signet, regtest)
    pub network: String,
    /// Per-relay fetch timeout
    pub fetch_timeout_secs: u64,
    /// How far back direct-message fetches reach
    pub dm_lookback_days: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            relays: DEFAULT_RELAYS.iter().map(|r| r.to_string()).collect(),
            network: "testnet".to_string(),
            fetch_timeout_secs: 10,
            dm_lookback_days: 30,
        }
    }
}

impl Config {
    /// Load settings from a JSON file; missing fields take defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Resolve config from an explicit path, then `NOSTRKIT_CONFIG`, then defaults
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => match std::env::var(CONFIG_ENV) {
                Ok(p) if !p.is_empty() => Self::from_file(p),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Replace the relay list when overrides are given
    pub fn with_relays(mut self, relays: Vec<String>) -> Self {
        if !relays.is_empty() {
            self.relays = relays;
        }
        self
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn dm_lookback_secs(&self) -> u64 {
        days_to_secs(self.dm_lookback_days)
    }

    /// Start of the direct-message window ending at `now`
    ///
    /// `days` overrides the configured lookback. Oversized values clamp to 0.
    pub fn dm_since(&self, days: Option<u64>, now: u64) -> u64 {
        let lookback = days.map_or_else(|| self.dm_lookback_secs(), days_to_secs);
        now.saturating_sub(lookback)
    }
}

fn days_to_secs(days: u64) -> u64 {
    days.saturating_mul(24 * 3600)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "nostrkit_{}_{}.json",
            name,
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.relays.len(), 4);
        assert_eq!(config.network, "testnet");
        assert_eq!(config.dm_lookback_secs(), 30 * 24 * 3600);
    }

    #[test]
    fn test_dm_window_clamps_huge_lookback() {
        let now = 1_700_000_000;
        let config = Config::default();
        assert_eq!(config.dm_since(None, now), now - 30 * 24 * 3600);
        assert_eq!(config.dm_since(Some(1), now), now - 24 * 3600);
        assert_eq!(config.dm_since(Some(213_503_982_334_602), now), 0);
        assert_eq!(config.dm_since(Some(u64::MAX), now), 0);

        let config = Config {
            dm_lookback_days: u64::MAX,
            ..Config::default()
        };
        assert_eq!(config.dm_lookback_secs(), u64::MAX);
        assert_eq!(config.dm_since(None, now), 0);
    }

    #[test]
    fn test_partial_file_takes_defaults() {
        let path = write_temp("partial", r#"{"relays":["wss://relay.example"]}"#);
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.relays, vec!["wss://relay.example".to_string()]);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_relay_override() {
        let config = Config::default().with_relays(vec!["wss://a".into()]);
        assert_eq!(config.relays, vec!["wss://a".to_string()]);

        let untouched = Config::default().with_relays(Vec::new());
        assert_eq!(untouched.relays.len(), 4);
    }

    #[test]
    #[serial]
    fn test_load_from_env() {
        let path = write_temp("env", r#"{"network":"signet"}"#);
        std::env::set_var(CONFIG_ENV, &path);
        let config = Config::load(None).unwrap();
        std::env::remove_var(CONFIG_ENV);
        assert_eq!(config.network, "signet");
        std::fs::remove_file(path).ok();
    }

    #[test]
    #[serial]
    fn test_load_without_env_uses_defaults() {
        std::env::remove_var(CONFIG_ENV);
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }
}
