//! Configuration file discovery and loading
//!
//! An explicitly given file must exist. Without one, the default file in the
//! platform configuration directory is used when present, otherwise the built-in
//! defaults apply.

use crate::core::config::{default_config_file, ConfigError, ConfigResult, ConfigSnapshot};
use std::path::{Path, PathBuf};

/// The configuration file to read, if any
pub fn resolve_config_path(explicit: Option<&Path>) -> ConfigResult<Option<PathBuf>> {
    match explicit {
        Some(path) => {
            // User specified a config file - it must exist
            if !path.exists() {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "the specified configuration file does not exist",
                    ),
                });
            }
            Ok(Some(path.to_path_buf()))
        }
        None => {
            let default_path = default_config_file();
            Ok(default_path.exists().then_some(default_path))
        }
    }
}

pub async fn load_config(explicit: Option<&Path>) -> ConfigResult<ConfigSnapshot> {
    match resolve_config_path(explicit)? {
        Some(path) => {
            log::debug!("reading configuration from {}", path.display());
            ConfigSnapshot::load(&path).await
        }
        None => {
            log::debug!("no configuration file, using defaults");
            Ok(ConfigSnapshot::default())
        }
    }
}
