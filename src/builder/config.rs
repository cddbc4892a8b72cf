//! Serializable machine configuration.

use crate::alloc::AllocationStrategy;
use crate::builder::error::BuildError;
use serde::{Deserialize, Serialize};

/// Settings a host can keep in a config file and hand to
/// [`StateMachineBuilder::config`](super::StateMachineBuilder::config).
///
/// Missing fields take their defaults: lazy allocation, pool validation
/// enabled.
///
/// # Example
///
/// ```rust
/// use stator::alloc::AllocationStrategy;
/// use stator::builder::MachineConfig;
///
/// let config = MachineConfig::from_json(r#"{ "strategy": "internal_pool" }"#).unwrap();
/// assert_eq!(config.strategy, AllocationStrategy::InternalPool);
/// assert!(config.validate_pool);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MachineConfig {
    /// Which allocator the built machine uses
    pub strategy: AllocationStrategy,

    /// Check external pools against the declared set before use
    pub validate_pool: bool,
}

impl MachineConfig {
    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        serde_json::from_str(json).map_err(|e| BuildError::InvalidConfig(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, BuildError> {
        serde_json::to_string_pretty(self).map_err(|e| BuildError::InvalidConfig(e.to_string()))
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            strategy: AllocationStrategy::Lazy,
            validate_pool: true,
        }
    }
}
