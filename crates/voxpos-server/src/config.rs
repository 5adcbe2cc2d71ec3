//! Server configuration

use tracing::warn;
use voxpos_resolver::UnknownActionPolicy;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Bind address and turn policy for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// How turns treat verbs other than add/remove
    pub unknown_action: UnknownActionPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            unknown_action: UnknownActionPolicy::default(),
        }
    }
}

impl ServerConfig {
    /// Read `VOXPOS_HOST`, `VOXPOS_PORT` and `VOXPOS_UNKNOWN_ACTION`, falling
    /// back to defaults.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("VOXPOS_HOST").ok(),
            std::env::var("VOXPOS_PORT").ok(),
            std::env::var("VOXPOS_UNKNOWN_ACTION").ok(),
        )
    }

    fn from_vars(host: Option<String>, port: Option<String>, unknown_action: Option<String>) -> Self {
        let host = host
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match port {
            Some(raw) => match raw.trim().parse::<u16>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    warn!("Invalid VOXPOS_PORT='{}', falling back to {}", raw, DEFAULT_PORT);
                    DEFAULT_PORT
                }
            },
            None => DEFAULT_PORT,
        };
        let unknown_action = match unknown_action {
            Some(raw) => raw.parse().unwrap_or_else(|err| {
                warn!("Invalid VOXPOS_UNKNOWN_ACTION: {}, defaulting to add", err);
                UnknownActionPolicy::default()
            }),
            None => UnknownActionPolicy::default(),
        };
        Self {
            host,
            port,
            unknown_action,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_unknown_action(mut self, policy: UnknownActionPolicy) -> Self {
        self.unknown_action = policy;
        self
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
