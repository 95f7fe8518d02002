//! Runtime configuration
//!
//! Loaded from a JSON file; every field is optional.
//!
//! ```json
//! {
//!   "log_level": "debug",
//!   "inference_mode": "manual",
//!   "variadic_slots": 3
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::config::{APP_DIR, CONFIG_ENV_VAR, CONFIG_FILE_NAME, DEFAULT_LOG_LEVEL};
use crate::constants::node::{DEFAULT_VARIADIC_SLOTS, MAX_VARIADIC_SLOTS};
use crate::error::{NodeError, Result};
use crate::nodes::InferenceMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Default log filter, overridden by `RUST_LOG`
    pub log_level: String,
    pub inference_mode: InferenceMode,
    /// Slots a new variadic node starts with
    pub variadic_slots: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            inference_mode: InferenceMode::default(),
            variadic_slots: DEFAULT_VARIADIC_SLOTS,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_VARIADIC_SLOTS).contains(&self.variadic_slots) {
            return Err(NodeError::InvalidConfig(format!(
                "variadic_slots must be between 1 and {}, got {}",
                MAX_VARIADIC_SLOTS, self.variadic_slots
            )));
        }
        Ok(())
    }

    /// Load the config from an explicit path, `$FNODLE_CONFIG` or the
    /// platform config directory, falling back to defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Config> {
        let path = resolve_config_path(
            explicit,
            std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from),
            dirs::config_dir(),
        );

        match path {
            Some(path) => load_config(&path),
            None => {
                debug!("No config file found, using defaults");
                Ok(Config::default())
            }
        }
    }
}

/// Pick the config file to load.
///
/// An explicit or environment path is used even when missing, so that a typo
/// surfaces as an error; the platform default only when it exists.
pub fn resolve_config_path(
    explicit: Option<&Path>,
    from_env: Option<PathBuf>,
    config_dir: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = from_env {
        return Some(path);
    }
    config_dir
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file())
}

/// Load and validate a config from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| NodeError::ConfigIo {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let config: Config =
        serde_json::from_str(&content).map_err(|e| NodeError::InvalidConfig(e.to_string()))?;
    config.validate()?;

    debug!("Loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.inference_mode, InferenceMode::Auto);
        assert_eq!(config.variadic_slots, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config(r#"{ "inference_mode": "manual" }"#);
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.inference_mode, InferenceMode::Manual);
        assert_eq!(config.variadic_slots, 2);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_full_file() {
        let file = write_config(r#"{ "log_level": "debug", "inference_mode": "auto", "variadic_slots": 5 }"#);
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.variadic_slots, 5);
    }

    #[test]
    fn test_invalid_slot_counts() {
        for slots in [0, 33] {
            let file = write_config(&format!(r#"{{ "variadic_slots": {} }}"#, slots));
            assert!(matches!(load_config(file.path()), Err(NodeError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_unknown_field_and_bad_json() {
        let file = write_config(r#"{ "variadic": 2 }"#);
        assert!(matches!(load_config(file.path()), Err(NodeError::InvalidConfig(_))));

        let file = write_config("not json");
        assert!(matches!(load_config(file.path()), Err(NodeError::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = load_config(dir.path().join("absent.json"));
        assert!(matches!(result, Err(NodeError::ConfigIo { .. })));
    }

    #[test]
    fn test_config_path_resolution() {
        let dir = TempDir::new().unwrap();
        let explicit = dir.path().join("explicit.json");
        let from_env = dir.path().join("env.json");

        assert_eq!(
            resolve_config_path(Some(&explicit), Some(from_env.clone()), None),
            Some(explicit.clone())
        );
        assert_eq!(
            resolve_config_path(None, Some(from_env.clone()), Some(dir.path().to_path_buf())),
            Some(from_env)
        );

        // platform default only counts when the file exists
        assert_eq!(resolve_config_path(None, None, Some(dir.path().to_path_buf())), None);

        let app_dir = dir.path().join(APP_DIR);
        fs::create_dir_all(&app_dir).unwrap();
        fs::write(app_dir.join(CONFIG_FILE_NAME), "{}").unwrap();
        assert_eq!(
            resolve_config_path(None, None, Some(dir.path().to_path_buf())),
            Some(app_dir.join(CONFIG_FILE_NAME))
        );
    }
}
