//! Configuration types for flowmark

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::flow::DEFAULT_TABLE_CAPACITY;
use crate::mark::{GrowthPolicy, Strategy, COMPOSITE_HEADER_LEN, DEFAULT_PATH_MTU};
use crate::parse::IPV6_HEADER_LEN;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Marking strategy ("label", "hop-by-hop", "destination",
    /// "hop-by-hop-destination")
    #[serde(default = "default_strategy")]
    pub strategy: Strategy,

    /// What to do when the packet buffer cannot grow ("pass-through" or
    /// "drop")
    #[serde(default = "default_growth_policy")]
    pub growth_policy: GrowthPolicy,

    /// Path MTU bounding the network-layer packet length after growth
    #[serde(default = "default_path_mtu")]
    pub path_mtu: usize,

    /// Flow table sizing
    #[serde(default)]
    pub flow_table: FlowTableConfig,

    /// Tag every parsed flow using the all-zeroes key (testing deployments)
    #[serde(default)]
    pub match_all: bool,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // The MTU must at least fit the IPv6 header plus the largest growth.
        let floor = IPV6_HEADER_LEN + COMPOSITE_HEADER_LEN;
        if self.path_mtu < floor {
            return Err(ConfigError::ValidationError(format!(
                "path_mtu must be at least {floor}, got {}",
                self.path_mtu
            )));
        }

        self.flow_table.validate()?;

        Ok(())
    }

    /// Create the default configuration
    #[must_use]
    pub fn default_config() -> Self {
        Self {
            strategy: default_strategy(),
            growth_policy: default_growth_policy(),
            path_mtu: default_path_mtu(),
            flow_table: FlowTableConfig::default(),
            match_all: false,
            log: LogConfig::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

/// Flow table sizing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlowTableConfig {
    /// Maximum number of entries before LRU eviction kicks in
    #[serde(default = "default_capacity")]
    pub capacity: u64,
}

impl FlowTableConfig {
    /// Validate flow table configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ValidationError(
                "flow_table.capacity must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

impl Default for FlowTableConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    /// Log level filter (e.g. "info", "flowmark=trace")
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

const fn default_strategy() -> Strategy {
    Strategy::Label
}

const fn default_growth_policy() -> GrowthPolicy {
    GrowthPolicy::PassThrough
}

const fn default_path_mtu() -> usize {
    DEFAULT_PATH_MTU
}

const fn default_capacity() -> u64 {
    DEFAULT_TABLE_CAPACITY
}

fn default_log_level() -> String {
    "info".into()
}
