use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
    #[serde(default)]
    pub planning: PlanningConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("animelog.db")
}

/// History log policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct HistoryConfig {
    /// Maximum number of entries kept; oldest are evicted first.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Two observations of the same URL closer than this are one viewing.
    #[serde(default = "default_dedup_window")]
    pub dedup_window_ms: i64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            dedup_window_ms: default_dedup_window(),
        }
    }
}

fn default_capacity() -> usize {
    1000
}

fn default_dedup_window() -> i64 {
    60_000
}

/// Retry policy for writes to the durable store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PersistenceConfig {
    /// Attempts per logical write, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Backoff before the second attempt; doubles after each failure.
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff() -> u64 {
    100
}

/// Weekly planning refresh.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlanningConfig {
    /// Run the periodic refresh task.
    #[serde(default)]
    pub enabled: bool,
    /// URL serving the planning blob as JSON (required when enabled).
    #[serde(default)]
    pub source_url: Option<String>,
    /// Seconds between refreshes (default: one day).
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    /// Delay before the first refresh after startup.
    #[serde(default = "default_startup_delay")]
    pub startup_delay_secs: u64,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            source_url: None,
            interval_secs: default_interval(),
            startup_delay_secs: default_startup_delay(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_interval() -> u64 {
    24 * 60 * 60
}

fn default_startup_delay() -> u64 {
    1
}

fn default_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.database.path.to_str().unwrap(), "animelog.db");
        assert_eq!(config.history.capacity, 1000);
        assert_eq!(config.history.dedup_window_ms, 60_000);
        assert_eq!(config.persistence.max_attempts, 3);
        assert_eq!(config.persistence.initial_backoff_ms, 100);
        assert!(!config.planning.enabled);
        assert_eq!(config.planning.interval_secs, 86_400);
    }

    #[test]
    fn test_deserialize_server_section() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
    }

    #[test]
    fn test_deserialize_history_policy() {
        let toml = r#"
[history]
capacity = 50
dedup_window_ms = 5000
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.history.capacity, 50);
        assert_eq!(config.history.dedup_window_ms, 5000);
    }

    #[test]
    fn test_deserialize_planning_partial() {
        let toml = r#"
[planning]
enabled = true
source_url = "http://localhost:9999/planning.json"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.planning.enabled);
        assert_eq!(
            config.planning.source_url.as_deref(),
            Some("http://localhost:9999/planning.json")
        );
        assert_eq!(config.planning.timeout_secs, 30);
        assert_eq!(config.planning.startup_delay_secs, 1);
    }

    #[test]
    fn test_deserialize_custom_database_path() {
        let toml = r#"
[database]
path = "/data/history.sqlite"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.database.path.to_str().unwrap(), "/data/history.sqlite");
    }
}
