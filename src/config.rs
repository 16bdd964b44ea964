//! Configuration management for the DOS guard server
//!
//! Settings are layered: built-in defaults, then an optional `config.toml`
//! in the working directory, then `DOS_GUARD_*` environment variables.
//! Everything is read once at startup and is immutable afterwards.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const CONFIG_FILE: &str = "config";
const ENV_PREFIX: &str = "DOS_GUARD";

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    // ═══ NETWORK ═══
    /// IP address the listener binds to
    pub bind_address: String,

    /// Listener port (0 picks an ephemeral port)
    pub port: u16,

    // ═══ FLOOD PROTECTION ═══
    /// Sliding window width in seconds
    pub request_window_secs: u64,

    /// Requests tolerated inside one window before the source is banned
    pub request_threshold: usize,

    /// Ban length in seconds
    pub block_duration_secs: u64,

    // ═══ CONNECTION HANDLING ═══
    /// Maximum bytes taken from the single request read
    pub max_request_bytes: usize,

    /// Deadline for the request read, 0 disables it
    pub read_timeout_secs: u64,

    /// Period of the expired-state sweeper, 0 disables it
    pub sweep_interval_secs: u64,

    /// Username to password table
    pub users: HashMap<String, String>,
}

/// The three numbers that drive the ban engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardLimits {
    pub window: Duration,
    pub threshold: usize,
    pub block_duration: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 9999,
            request_window_secs: 5,
            request_threshold: 20,
            block_duration_secs: 20,
            max_request_bytes: 1024,
            read_timeout_secs: 30,
            sweep_interval_secs: 60,
            users: HashMap::from([("alice".to_string(), "alicepass".to_string())]),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `config.toml` (if present) with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration using `path` (without extension) as the optional file source
    pub fn load_from(path: &str) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();

        let mut builder = Config::builder()
            .set_default("bind_address", defaults.bind_address.clone())?
            .set_default("port", i64::from(defaults.port))?
            .set_default("request_window_secs", defaults.request_window_secs as i64)?
            .set_default("request_threshold", defaults.request_threshold as i64)?
            .set_default("block_duration_secs", defaults.block_duration_secs as i64)?
            .set_default("max_request_bytes", defaults.max_request_bytes as i64)?
            .set_default("read_timeout_secs", defaults.read_timeout_secs as i64)?
            .set_default("sweep_interval_secs", defaults.sweep_interval_secs as i64)?;

        for (user, password) in &defaults.users {
            builder = builder.set_default(format!("users.{user}"), password.clone())?;
        }

        let config: ServerConfig = builder
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.bind_address.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "bind_address cannot be empty".into(),
            ));
        }

        if self.request_window_secs == 0 {
            return Err(config::ConfigError::Message(
                "request_window_secs must be greater than 0".into(),
            ));
        }

        if self.request_threshold == 0 {
            return Err(config::ConfigError::Message(
                "request_threshold must be greater than 0".into(),
            ));
        }

        if self.block_duration_secs == 0 {
            return Err(config::ConfigError::Message(
                "block_duration_secs must be greater than 0".into(),
            ));
        }

        if self.max_request_bytes == 0 {
            return Err(config::ConfigError::Message(
                "max_request_bytes must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Bind address and port as a socket address string
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn guard_limits(&self) -> GuardLimits {
        GuardLimits {
            window: Duration::from_secs(self.request_window_secs),
            threshold: self.request_threshold,
            block_duration: Duration::from_secs(self.block_duration_secs),
        }
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_secs > 0).then(|| Duration::from_secs(self.read_timeout_secs))
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }
}
