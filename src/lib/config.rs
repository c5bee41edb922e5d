use std::{
    net::SocketAddr,
    path::Path,
    time::Duration,
};

use serde::Deserialize;

use crate::{
    circuits::CircuitConfig,
    domain::proof::MAX_PROOF_DEPTH,
};

/// Top-level configuration loaded from TOML. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub circuits: CircuitConfig,
    pub rhs: RhsConfig,
    pub server: ServerConfig,
}

/// Remote Reverse Hash Service the client talks to.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RhsConfig {
    pub base_url: String,
    /// Per-request timeout (e.g. "30s"). Parsed via humantime.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for RhsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".into(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Local RHS node server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
        }
    }
}

/// Errors from config loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl Config {
    /// Load and validate a config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.circuits;
        for (name, levels) in [
            ("circuits.mt_level", c.mt_level),
            ("circuits.mt_level_claim", c.mt_level_claim),
            ("circuits.mt_level_on_chain", c.mt_level_on_chain),
            ("circuits.mt_level_claims_merklization", c.mt_level_claims_merklization),
        ] {
            if !(1..=MAX_PROOF_DEPTH).contains(&levels) {
                return Err(ConfigError::Validation(format!(
                    "{name} must be between 1 and {MAX_PROOF_DEPTH}, got {levels}"
                )));
            }
        }

        if c.value_array_size == 0 {
            return Err(ConfigError::Validation(
                "circuits.value_array_size must be at least 1".into(),
            ));
        }

        if self.rhs.base_url.trim().is_empty() {
            return Err(ConfigError::Validation("rhs.base_url must not be empty".into()));
        }

        Ok(())
    }
}
