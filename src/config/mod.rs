//! Configuration types and loading
//!
//! Deployment-time knobs for the pipeline: the marking strategy, the
//! growth-failure policy, the path MTU, and the flow-table capacity.
//! Configuration is loaded from JSON, validated at startup, and can be
//! overridden through `FLOWMARK_*` environment variables.

pub mod loader;
pub mod types;

pub use loader::{load_config, load_config_str, load_config_with_env};
pub use types::{Config, FlowTableConfig, LogConfig};
