use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::room::CleanupConfig;

const DEFAULT_PORT: u16 = 3000;

/// Process configuration, read from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    /// Directory of client assets served on unmatched paths
    pub static_dir: Option<PathBuf>,
    pub cleanup: CleanupConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            static_dir: None,
            cleanup: CleanupConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads `PORT`, `BIND_ADDR`, `STATIC_DIR`, `CLEANUP_INTERVAL_SECS` and
    /// `IDLE_THRESHOLD_SECS`; unparseable values keep their default
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let cleanup = CleanupConfig {
            cleanup_interval: parse_or("CLEANUP_INTERVAL_SECS", &lookup)
                .map(Duration::from_secs)
                .unwrap_or(defaults.cleanup.cleanup_interval),
            inactivity_threshold: parse_or("IDLE_THRESHOLD_SECS", &lookup)
                .map(Duration::from_secs)
                .unwrap_or(defaults.cleanup.inactivity_threshold),
        };

        Self {
            bind_addr: parse_or("BIND_ADDR", &lookup).unwrap_or(defaults.bind_addr),
            port: parse_or("PORT", &lookup).unwrap_or(defaults.port),
            static_dir: lookup("STATIC_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            cleanup,
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

fn parse_or<T: FromStr>(key: &str, lookup: &impl Fn(&str) -> Option<String>) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key = key, value = %raw, "Ignoring unparseable setting, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ServerConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.socket_addr(), "0.0.0.0:3000".parse().unwrap());
        assert!(config.static_dir.is_none());
        assert_eq!(config.cleanup.cleanup_interval, Duration::from_secs(600));
        assert_eq!(config.cleanup.inactivity_threshold, Duration::from_secs(3600));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("BIND_ADDR", "127.0.0.1"),
            ("STATIC_DIR", "public"),
            ("CLEANUP_INTERVAL_SECS", "30"),
            ("IDLE_THRESHOLD_SECS", "120"),
        ]);
        assert_eq!(config.socket_addr(), "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.static_dir, Some(PathBuf::from("public")));
        assert_eq!(config.cleanup.cleanup_interval, Duration::from_secs(30));
        assert_eq!(config.cleanup.inactivity_threshold, Duration::from_secs(120));
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = config_from(&[
            ("PORT", "eighty"),
            ("BIND_ADDR", "localhost:1"),
            ("STATIC_DIR", "  "),
            ("IDLE_THRESHOLD_SECS", "-5"),
        ]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.bind_addr, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert!(config.static_dir.is_none());
        assert_eq!(config.cleanup.inactivity_threshold, Duration::from_secs(3600));
    }
}
