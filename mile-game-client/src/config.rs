//! Client configuration, read from the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use crate::network::channel::{ChannelConfig, DEFAULT_RECONNECT_ATTEMPTS, DEFAULT_RECONNECT_INTERVAL};
use crate::network::transport::{WsConnector, DEFAULT_CONNECT_TIMEOUT};

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// REST API base URL (including the `/api` prefix).
    pub api_url: String,
    /// Ranking feed URL.
    pub ws_url: String,
    /// Delay before each reconnection attempt.
    pub reconnect_interval: Duration,
    /// Reconnection attempts between two successful opens.
    pub reconnect_attempts: u32,
    /// Per-request timeout for the REST API.
    pub request_timeout: Duration,
    /// Limit on opening the ranking feed.
    pub connect_timeout: Duration,
    /// Directory for saved progress.
    pub storage_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080/api".to_string(),
            ws_url: "ws://localhost:8080/ws".to_string(),
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            reconnect_attempts: DEFAULT_RECONNECT_ATTEMPTS,
            request_timeout: Duration::from_millis(10_000),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            storage_dir: PathBuf::from(".mile-game"),
        }
    }
}

impl ClientConfig {
    /// Load from `MILE_*` environment variables. Unset or unparsable
    /// values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            api_url: lookup("MILE_API_URL").unwrap_or(defaults.api_url),
            ws_url: lookup("MILE_WS_URL").unwrap_or(defaults.ws_url),
            reconnect_interval: parse_var(&lookup, "MILE_RECONNECT_INTERVAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.reconnect_interval),
            reconnect_attempts: parse_var(&lookup, "MILE_RECONNECT_ATTEMPTS")
                .unwrap_or(defaults.reconnect_attempts),
            request_timeout: parse_var(&lookup, "MILE_REQUEST_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_timeout),
            connect_timeout: parse_var(&lookup, "MILE_CONNECT_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.connect_timeout),
            storage_dir: lookup("MILE_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
        }
    }

    /// Reconnection policy for the realtime channel.
    pub fn channel_config(&self) -> ChannelConfig {
        ChannelConfig {
            reconnect_interval: self.reconnect_interval,
            max_attempts: self.reconnect_attempts,
        }
    }

    /// WebSocket connector honoring the connect timeout.
    pub fn connector(&self) -> WsConnector {
        WsConnector::new(self.connect_timeout)
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid {}={:?}", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(|_| None);
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.channel_config(), ChannelConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("MILE_API_URL", "https://quiz.example/api"),
            ("MILE_WS_URL", "wss://quiz.example/ws"),
            ("MILE_RECONNECT_INTERVAL_MS", "500"),
            ("MILE_RECONNECT_ATTEMPTS", "2"),
            ("MILE_CONNECT_TIMEOUT_MS", "1500"),
            ("MILE_STORAGE_DIR", "/tmp/mile"),
        ]));

        assert_eq!(config.api_url, "https://quiz.example/api");
        assert_eq!(config.ws_url, "wss://quiz.example/ws");
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/mile"));
        assert_eq!(config.connect_timeout, Duration::from_millis(1500));

        let channel = config.channel_config();
        assert_eq!(channel.reconnect_interval, Duration::from_millis(500));
        assert_eq!(channel.max_attempts, 2);
    }

    #[test]
    fn test_invalid_numbers_keep_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("MILE_RECONNECT_ATTEMPTS", "many"),
            ("MILE_REQUEST_TIMEOUT_MS", "-1"),
        ]));
        assert_eq!(config.reconnect_attempts, DEFAULT_RECONNECT_ATTEMPTS);
        assert_eq!(config.request_timeout, Duration::from_millis(10_000));
    }
}
