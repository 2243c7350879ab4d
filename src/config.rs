//! Client network configuration
//!
//! Handles loading of connection settings from a TOML file and environment
//! variables. The rest of the application decides when to connect; this
//! module only supplies the address and protocol parameters.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Client network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Path to the configuration file
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Game server hostname or IP address
    #[serde(default = "default_host")]
    pub host: String,

    /// Game server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Protocol version expected from the server handshake
    #[serde(default = "default_protocol_version")]
    pub protocol_version: u16,

    /// Log every sent/received packet with its opcode name
    #[serde(default)]
    pub trace_packets: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8484
}

fn default_protocol_version() -> u16 {
    crate::PROTOCOL_VERSION
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("config/client.toml"),
            host: default_host(),
            port: default_port(),
            protocol_version: default_protocol_version(),
            trace_packets: false,
        }
    }
}

impl ClientConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        let config_path = env::var("EMBERFALL_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/client.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })?;

            toml::from_str(&content).with_context(|| {
                format!("Failed to parse config file: {}", config_path.display())
            })?
        } else {
            tracing::warn!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            Self::default()
        };

        config.config_path = config_path;
        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("EMBERFALL_HOST") {
            self.host = val;
        }
        if let Ok(val) = env::var("EMBERFALL_PORT") {
            if let Ok(port) = val.parse() {
                self.port = port;
            }
        }
        if let Ok(val) = env::var("EMBERFALL_PROTOCOL_VERSION") {
            if let Ok(version) = val.parse() {
                self.protocol_version = version;
            }
        }
        if let Ok(val) = env::var("EMBERFALL_TRACE_PACKETS") {
            self.trace_packets = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            anyhow::bail!("host must not be empty");
        }
        if self.port == 0 {
            anyhow::bail!("port must not be zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8484);
        assert_eq!(config.protocol_version, crate::PROTOCOL_VERSION);
        assert!(!config.trace_packets);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: ClientConfig = toml::from_str(
            r#"
            host = "play.emberfall.example"
            trace_packets = true
            "#,
        )
        .unwrap();

        assert_eq!(config.host, "play.emberfall.example");
        assert_eq!(config.port, 8484);
        assert!(config.trace_packets);
    }

    #[test]
    fn test_validate_rejects_empty_host() {
        let config = ClientConfig {
            host: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let config = ClientConfig {
            port: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
