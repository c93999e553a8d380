//! Configuration management for the Booth Map server.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Values that are present but fail to parse fall back to the default.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `PostgreSQL` configuration
    pub database: DatabaseConfig,
    /// HTTP server configuration
    pub server: ServerConfig,
}

/// `PostgreSQL` configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Connection URL (`DATABASE_URL`, required)
    pub url: String,
    /// Maximum pool size
    pub max_connections: u32,
    /// Minimum idle connections
    pub min_connections: u32,
    /// Acquire timeout
    pub connect_timeout: Duration,
    /// Connections idle longer than this are closed
    pub idle_timeout: Duration,
    /// Apply embedded migrations at startup
    pub run_migrations: bool,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// API listener
    pub addr: SocketAddr,
    /// Prometheus exposition listener
    pub metrics_addr: SocketAddr,
    /// Upper bound on graceful shutdown
    pub shutdown_timeout: Duration,
}

const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|value| value.trim().parse().ok())
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns error if `DATABASE_URL` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns error if `DATABASE_URL` is not set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secs =
            |key: &str, default: u64| Duration::from_secs(parsed(&lookup, key).unwrap_or(default));

        let url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database: DatabaseConfig {
                url,
                max_connections: parsed(&lookup, "DATABASE_MAX_CONNECTIONS").unwrap_or(10),
                min_connections: parsed(&lookup, "DATABASE_MIN_CONNECTIONS").unwrap_or(1),
                connect_timeout: secs("DATABASE_CONNECT_TIMEOUT", 30),
                idle_timeout: secs("DATABASE_IDLE_TIMEOUT", 600),
                run_migrations: parsed(&lookup, "DATABASE_RUN_MIGRATIONS").unwrap_or(true),
            },
            server: ServerConfig {
                addr: SocketAddr::new(
                    parsed(&lookup, "SERVER_HOST").unwrap_or(DEFAULT_HOST),
                    parsed(&lookup, "SERVER_PORT").unwrap_or(8080),
                ),
                metrics_addr: SocketAddr::new(
                    parsed(&lookup, "METRICS_HOST").unwrap_or(DEFAULT_HOST),
                    parsed(&lookup, "METRICS_PORT").unwrap_or(9090),
                ),
                shutdown_timeout: secs("SHUTDOWN_TIMEOUT", 30),
            },
        })
    }
}
