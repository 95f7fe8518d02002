//! Default values applied to newly created nodes

use crate::config::Config;
use crate::constants::node::DEFAULT_VARIADIC_SLOTS;

/// Defaults used when instantiating a node from its factory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeDefaults {
    /// Number of slots a new variadic input group starts with
    pub variadic_slots: usize,
}

impl Default for NodeDefaults {
    fn default() -> Self {
        Self {
            variadic_slots: DEFAULT_VARIADIC_SLOTS,
        }
    }
}

impl From<&Config> for NodeDefaults {
    fn from(config: &Config) -> Self {
        Self {
            variadic_slots: config.variadic_slots,
        }
    }
}
