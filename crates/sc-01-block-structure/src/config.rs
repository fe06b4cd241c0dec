//! Configuration for the block structure subsystem

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Block shape limits and validation options.
///
/// Limits bound the work a single block can demand from a validator. A plan
/// exceeding any of them is rejected as `InvalidPlan`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockStructureConfig {
    /// Maximum regions per block
    pub max_regions: usize,
    /// Maximum cycles in one region
    pub max_cycles_per_region: usize,
    /// Maximum shards in one cycle
    pub max_shards_per_cycle: usize,
    /// Maximum receipts across the whole block
    pub max_block_transactions: usize,
    /// Check cycles on the rayon pool
    pub parallel_validation: bool,
}

impl Default for BlockStructureConfig {
    fn default() -> Self {
        Self {
            max_regions: 16,
            max_cycles_per_region: 64,
            max_shards_per_cycle: 256,
            max_block_transactions: 10_000,
            parallel_validation: true,
        }
    }
}

/// Errors that can occur while loading configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid value {value:?} for {var}")]
    InvalidValue { var: String, value: String },
}

impl BlockStructureConfig {
    /// Load from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse from TOML. Missing keys keep their defaults.
    ///
    /// ```toml
    /// max_regions = 4
    /// max_shards_per_cycle = 32
    /// parallel_validation = false
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Defaults overridden by environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SC_MAX_REGIONS`
    /// - `SC_MAX_CYCLES_PER_REGION`
    /// - `SC_MAX_SHARDS_PER_CYCLE`
    /// - `SC_MAX_BLOCK_TRANSACTIONS`
    /// - `SC_PARALLEL_VALIDATION` (`true`/`false`/`1`/`0`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            max_regions: env_or("SC_MAX_REGIONS", defaults.max_regions)?,
            max_cycles_per_region: env_or("SC_MAX_CYCLES_PER_REGION", defaults.max_cycles_per_region)?,
            max_shards_per_cycle: env_or("SC_MAX_SHARDS_PER_CYCLE", defaults.max_shards_per_cycle)?,
            max_block_transactions: env_or(
                "SC_MAX_BLOCK_TRANSACTIONS",
                defaults.max_block_transactions,
            )?,
            parallel_validation: match env::var("SC_PARALLEL_VALIDATION") {
                Ok(value) => parse_bool("SC_PARALLEL_VALIDATION", &value)?,
                Err(_) => defaults.parallel_validation,
            },
        })
    }
}

fn env_or<T: FromStr>(var: &str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            var: var.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}

fn parse_bool(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var: var.to_string(),
            value: value.to_string(),
        }),
    }
}
