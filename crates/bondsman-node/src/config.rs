//! Node configuration loading and management.

use anyhow::Context;
use bondsman_core::{EngineConfig, Identity};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Full configuration for the Bondsman node.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BondsmanConfig {
    /// Arbiter and fee settings.
    #[serde(default)]
    pub engine: EngineSection,

    /// API server settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSection {
    /// Identity allowed to validate, close, and withdraw fees.
    #[serde(default = "default_arbiter")]
    pub arbiter: String,
    /// Platform fee in percent.
    #[serde(default = "default_fee_percent")]
    pub fee_percent: u8,
    /// Minimum bond amount. TOML integers are 64-bit.
    #[serde(default = "default_min_amount")]
    pub min_amount: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API listen address.
    #[serde(default = "default_api_addr")]
    pub listen_addr: String,
    /// API port.
    #[serde(default = "default_api_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the data directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_arbiter() -> String {
    "admin".into()
}
fn default_fee_percent() -> u8 {
    bondsman_core::config::DEFAULT_FEE_PERCENT
}
fn default_min_amount() -> u64 {
    // DEFAULT_MIN_AMOUNT is 100 and always fits.
    bondsman_core::config::DEFAULT_MIN_AMOUNT as u64
}
fn default_api_addr() -> String {
    "127.0.0.1".into()
}
fn default_api_port() -> u16 {
    9101
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            arbiter: default_arbiter(),
            fee_percent: default_fee_percent(),
            min_amount: default_min_amount(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_api_addr(),
            port: default_api_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl BondsmanConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: BondsmanConfig = toml::from_str(&contents)
                .with_context(|| format!("invalid config file {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Validated engine settings.
    pub fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        let arbiter = Identity::new(self.engine.arbiter.as_str())?;
        let config = EngineConfig::new(arbiter)
            .with_fee_percent(self.engine.fee_percent)
            .with_min_amount(u128::from(self.engine.min_amount));
        config.validate()?;
        Ok(config)
    }

    pub fn api_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.api.listen_addr, self.api.port);
        addr.parse()
            .with_context(|| format!("invalid API listen address {addr}"))
    }
}
