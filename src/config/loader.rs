//! Configuration loading and management
//!
//! This module handles loading configuration from files and environment
//! variables.

use std::path::Path;

use tracing::{debug, info};

use super::types::Config;
use crate::error::ConfigError;

/// Load configuration from a JSON file
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    debug!("Loading configuration from {:?}", path);

    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let contents = std::fs::read_to_string(path)?;

    let config: Config = serde_json::from_str(&contents)
        .map_err(|e| ConfigError::ParseError(format!("Failed to parse JSON: {e} at {path:?}")))?;

    config.validate()?;

    info!(
        "Configuration loaded: strategy={}, mtu={}, table capacity={}",
        config.strategy, config.path_mtu, config.flow_table.capacity
    );

    Ok(config)
}

/// Load configuration from a JSON string
///
/// # Errors
///
/// Returns `ConfigError` if parsing or validation fails.
pub fn load_config_str(json: &str) -> Result<Config, ConfigError> {
    let config: Config =
        serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    config.validate()?;

    Ok(config)
}

/// Load configuration with environment variable overrides
///
/// Environment variables:
/// - `FLOWMARK_STRATEGY`: Override marking strategy
/// - `FLOWMARK_GROWTH_POLICY`: Override growth-failure policy
/// - `FLOWMARK_PATH_MTU`: Override path MTU
/// - `FLOWMARK_TABLE_CAPACITY`: Override flow table capacity
/// - `FLOWMARK_LOG_LEVEL`: Override log level
///
/// # Errors
///
/// Returns `ConfigError` if loading or parsing fails.
pub fn load_config_with_env(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let mut config = load_config(path)?;

    if let Ok(strategy) = std::env::var("FLOWMARK_STRATEGY") {
        config.strategy = strategy.parse().map_err(|_| ConfigError::EnvError {
            name: "FLOWMARK_STRATEGY".into(),
            reason: format!("Invalid strategy: {strategy}"),
        })?;
        debug!("Strategy overridden to {}", config.strategy);
    }

    if let Ok(policy) = std::env::var("FLOWMARK_GROWTH_POLICY") {
        config.growth_policy = policy.parse().map_err(|_| ConfigError::EnvError {
            name: "FLOWMARK_GROWTH_POLICY".into(),
            reason: format!("Invalid growth policy: {policy}"),
        })?;
    }

    if let Ok(mtu) = std::env::var("FLOWMARK_PATH_MTU") {
        config.path_mtu = mtu.parse().map_err(|_| ConfigError::EnvError {
            name: "FLOWMARK_PATH_MTU".into(),
            reason: format!("Invalid number: {mtu}"),
        })?;
        debug!("Path MTU overridden to {}", config.path_mtu);
    }

    if let Ok(capacity) = std::env::var("FLOWMARK_TABLE_CAPACITY") {
        config.flow_table.capacity = capacity.parse().map_err(|_| ConfigError::EnvError {
            name: "FLOWMARK_TABLE_CAPACITY".into(),
            reason: format!("Invalid number: {capacity}"),
        })?;
    }

    if let Ok(level) = std::env::var("FLOWMARK_LOG_LEVEL") {
        config.log.level = level;
    }

    // Re-validate after overrides
    config.validate()?;

    Ok(config)
}
