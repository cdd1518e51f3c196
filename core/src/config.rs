//! Configuration for the sandbox evaluator
//!
//! This module provides configuration options for the sandbox evaluator.
//! The server coordinates are an explicit value passed to whoever needs a
//! connection; no ambient or process-global connection state exists anywhere
//! in the system.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::error::{CoreError, Result};

/// Coordinates of the PostgreSQL server hosting the control database and the
/// isolated sandbox databases. Carries no database selection; callers pick a
/// database per connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConnConfig {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Template user inherited by every sandbox connection
    pub user: String,

    /// Password for the template user
    pub password: String,
}

impl Default for ServerConnConfig {
    fn default() -> Self {
        ServerConnConfig {
            host: "127.0.0.1".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
        }
    }
}

/// Sandbox evaluator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// PostgreSQL server coordinates
    pub server: ServerConnConfig,

    /// Control database holding the schema registry and questions
    pub control_database: String,

    /// Maintenance database used by the provisioner when creating new
    /// isolated databases (a connection must select some database)
    pub maintenance_database: String,

    /// Upper bound on one untrusted statement's execution time
    pub statement_timeout: Duration,

    /// Upper bound on establishing one sandbox connection
    pub connect_timeout: Duration,

    /// Maximum number of rows captured from one statement
    pub max_result_rows: usize,

    /// Maximum number of pooled control-database connections
    pub control_pool_size: usize,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        SandboxConfig {
            server: ServerConnConfig::default(),
            control_database: "sqlab".to_string(),
            maintenance_database: "postgres".to_string(),
            statement_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            max_result_rows: 10_000,
            control_pool_size: 16,
        }
    }
}

impl SandboxConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &str) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let config = serde_json::from_reader(file)?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Build a configuration from `SQLAB_*` environment variables, starting
    /// from defaults. Unset variables keep their default values.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Apply `SQLAB_*` environment variable overrides in place
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(host) = env::var("SQLAB_PG_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("SQLAB_PG_PORT") {
            self.server.port = parse_env("SQLAB_PG_PORT", &port)?;
        }
        if let Ok(user) = env::var("SQLAB_PG_USER") {
            self.server.user = user;
        }
        if let Ok(password) = env::var("SQLAB_PG_PASSWORD") {
            self.server.password = password;
        }
        if let Ok(db) = env::var("SQLAB_CONTROL_DB") {
            self.control_database = db;
        }
        if let Ok(db) = env::var("SQLAB_MAINTENANCE_DB") {
            self.maintenance_database = db;
        }
        if let Ok(ms) = env::var("SQLAB_STATEMENT_TIMEOUT_MS") {
            self.statement_timeout =
                Duration::from_millis(parse_env("SQLAB_STATEMENT_TIMEOUT_MS", &ms)?);
        }
        if let Ok(ms) = env::var("SQLAB_CONNECT_TIMEOUT_MS") {
            self.connect_timeout =
                Duration::from_millis(parse_env("SQLAB_CONNECT_TIMEOUT_MS", &ms)?);
        }
        if let Ok(rows) = env::var("SQLAB_MAX_RESULT_ROWS") {
            self.max_result_rows = parse_env("SQLAB_MAX_RESULT_ROWS", &rows)?;
        }
        if let Ok(size) = env::var("SQLAB_CONTROL_POOL_SIZE") {
            self.control_pool_size = parse_env("SQLAB_CONTROL_POOL_SIZE", &size)?;
        }
        Ok(())
    }

    /// Create a configuration for local development. The server falls back
    /// to this profile when no configuration file is given.
    pub fn for_development() -> Self {
        SandboxConfig {
            statement_timeout: Duration::from_secs(30),
            ..Default::default()
        }
    }

    /// Create a configuration for testing
    pub fn for_testing() -> Self {
        SandboxConfig {
            control_database: "sqlab_test".to_string(),
            statement_timeout: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(2),
            max_result_rows: 100,
            control_pool_size: 2,
            ..Default::default()
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CoreError::Config(format!("invalid value for {}: {}", name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = SandboxConfig::default();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 5432);
        assert_eq!(config.control_database, "sqlab");
        assert_eq!(config.maintenance_database, "postgres");
        assert_eq!(config.statement_timeout, Duration::from_secs(10));
        assert_eq!(config.max_result_rows, 10_000);
    }

    #[test]
    fn test_development_config() {
        let config = SandboxConfig::for_development();

        // Relaxed statement budget, otherwise the default coordinates
        assert_eq!(config.statement_timeout, Duration::from_secs(30));
        assert_eq!(config.control_database, "sqlab");
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_testing_config() {
        let config = SandboxConfig::for_testing();

        assert_eq!(config.control_database, "sqlab_test");
        assert_eq!(config.statement_timeout, Duration::from_secs(2));
        assert_eq!(config.control_pool_size, 2);
    }

    #[test]
    fn test_config_serialization() {
        let config = SandboxConfig::default();

        let json = serde_json::to_string_pretty(&config).unwrap();
        let deserialized: SandboxConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.server.host, config.server.host);
        assert_eq!(deserialized.control_database, config.control_database);
        assert_eq!(deserialized.statement_timeout, config.statement_timeout);
        assert_eq!(deserialized.max_result_rows, config.max_result_rows);
    }

    #[test]
    fn test_config_file_io() {
        let config = SandboxConfig::for_testing();

        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        config.to_file(path).unwrap();
        let loaded = SandboxConfig::from_file(path).unwrap();

        assert_eq!(loaded.control_database, config.control_database);
        assert_eq!(loaded.statement_timeout, config.statement_timeout);
        assert_eq!(loaded.control_pool_size, config.control_pool_size);
    }

    #[test]
    fn test_invalid_env_value_is_rejected() {
        let err = parse_env::<u16>("SQLAB_PG_PORT", "not-a-port").unwrap_err();
        match err {
            CoreError::Config(msg) => assert!(msg.contains("SQLAB_PG_PORT")),
            _ => panic!("Expected Config variant"),
        }
    }
}
