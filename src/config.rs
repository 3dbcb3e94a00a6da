//! Configuration management for LightChain

use crate::crypto::KeyAlgorithm;
use crate::error::{ChainError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "lightchain.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub signing: SigningConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Exclusive upper bound for block nonces.
    #[serde(default = "default_nonce_bound")]
    pub nonce_bound: u64,
    /// Payload of the genesis block's placeholder transaction.
    #[serde(default = "default_genesis_data")]
    pub genesis_data: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            nonce_bound: default_nonce_bound(),
            genesis_data: default_genesis_data(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SigningConfig {
    #[serde(default = "default_algorithm")]
    pub algorithm: KeyAlgorithm,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    pub fn tracing_level(&self) -> Result<tracing::Level> {
        self.level
            .parse()
            .map_err(|_| ChainError::ConfigError(format!("Unknown log level: {}", self.level)))
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.ledger.nonce_bound == 0 {
            return Err(ChainError::ConfigError(
                "ledger.nonce_bound must be greater than zero".to_string(),
            ));
        }
        if self.ledger.genesis_data.is_empty() {
            return Err(ChainError::ConfigError(
                "ledger.genesis_data must not be empty".to_string(),
            ));
        }
        self.logging.tracing_level()?;
        Ok(())
    }
}

/// Loads `lightchain.toml` from the working directory, or defaults when it
/// is absent.
pub fn load_config() -> Result<Config> {
    let path = Path::new(DEFAULT_CONFIG_PATH);
    if !path.exists() {
        let config = Config::default();
        config.validate()?;
        return Ok(config);
    }
    load_config_from(path)
}

pub fn load_config_from(path: impl AsRef<Path>) -> Result<Config> {
    let config_str = fs::read_to_string(path.as_ref())?;
    let config: Config = toml::from_str(&config_str)?;
    config.validate()?;
    Ok(config)
}

fn default_nonce_bound() -> u64 {
    1_000_000_000
}

fn default_genesis_data() -> String {
    "Genesis Block".to_string()
}

fn default_algorithm() -> KeyAlgorithm {
    KeyAlgorithm::Secp256k1Ecdsa
}

fn default_log_level() -> String {
    "info".to_string()
}
