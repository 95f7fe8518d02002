//! Application-wide constants and default values

/// Node system constants
pub mod node {
    /// Slots a new variadic input group starts with
    pub const DEFAULT_VARIADIC_SLOTS: usize = 2;

    /// Upper bound accepted for the configured slot count
    pub const MAX_VARIADIC_SLOTS: usize = 32;
}

/// Socket naming constants
pub mod socket {
    /// Appended to a data type name for its list socket type
    pub const LIST_SUFFIX: &str = " List";
}

/// Configuration lookup constants
pub mod config {
    /// Environment variable naming a config file
    pub const CONFIG_ENV_VAR: &str = "FNODLE_CONFIG";

    /// Directory under the platform config dir
    pub const APP_DIR: &str = "fnodle";

    pub const CONFIG_FILE_NAME: &str = "config.json";

    pub const DEFAULT_LOG_LEVEL: &str = "info";
}
