//! Deployment configuration shared by both roles.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::Path;
use std::time::Duration;

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Network configuration.
///
/// Every field has a default, so an empty TOML file (or no file at all)
/// gives the standard deployment.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// Multicast group used for discovery.
    multicast_group: Ipv4Addr,

    /// UDP port servers listen on for discovery requests.
    multicast_port: u16,

    /// Local interface the server joins the group on.
    multicast_interface: Ipv4Addr,

    /// Roster capacity (concurrent sessions per server).
    max_sessions: u8,

    /// How long a client waits for a GameAvailable reply.
    discovery_timeout_ms: u64,

    /// Failed connections to advertised servers a client tolerates.
    discovery_attempts: u32,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            multicast_group: Ipv4Addr::new(239, 0, 0, 1),
            multicast_port: 1818,
            multicast_interface: Ipv4Addr::UNSPECIFIED,
            max_sessions: 10,
            discovery_timeout_ms: 30_000,
            discovery_attempts: 5,
        }
    }
}

impl NetConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;

        info!(
            group = %config.multicast_group,
            port = config.multicast_port,
            max_sessions = config.max_sessions,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Reads `path` if given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Checks values the type system cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_sessions == 0 {
            return Err(ConfigError::new("max_sessions must be at least 1"));
        }
        if !self.multicast_group.is_multicast() {
            return Err(ConfigError::new(format!(
                "multicast_group {} is not a multicast address",
                self.multicast_group
            )));
        }
        if self.multicast_port == 0 {
            return Err(ConfigError::new("multicast_port must be in 1..=65535"));
        }
        Ok(())
    }

    /// Where clients send discovery requests.
    pub fn group_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.multicast_group, self.multicast_port))
    }

    /// Discovery wait as a duration.
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms)
    }

    /// Returns a copy with a different roster capacity.
    pub fn with_max_sessions(mut self, max_sessions: u8) -> Self {
        self.max_sessions = max_sessions;
        self
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
