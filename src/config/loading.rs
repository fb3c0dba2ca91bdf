//! Configuration loading functionality.
//!
//! Handles locating the configuration file, creating a default one on first
//! run, parsing TOML and applying defaults that depend on the host.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::Config;
use super::validation::validate_config;
use crate::common::constants::*;
use crate::common::utils::{self, private_path};

/// Default configuration file path: `$XDG_CONFIG_HOME/lullaby/lullaby.toml`.
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load configuration from an explicit path, or from the default location.
///
/// An explicit path must exist. The default location is populated with a
/// commented default file when missing.
pub fn load(explicit: Option<&Path>) -> Result<(Config, PathBuf)> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!(
                    "Configuration file not found at specified path: {}",
                    private_path(path)
                );
            }
            path.to_path_buf()
        }
        None => {
            let path = default_config_path()?;
            if !path.exists() {
                super::builder::create_default_config(&path)
                    .context("Failed to create default config during load")?;
            }
            path
        }
    };

    let config = load_from_path(&path)
        .with_context(|| format!("Failed to load configuration from {}", private_path(&path)))?;
    Ok((config, path))
}

/// Read, parse, complete and validate the configuration at `path`.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", private_path(path)))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", private_path(path)))?;

    apply_defaults(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Fill in defaults that are looked up once per load rather than per use.
fn apply_defaults(config: &mut Config) {
    if config.time_zone.is_none() {
        let zone = utils::detect_system_timezone()
            .map(|zone| zone.name().to_string())
            .unwrap_or_else(|| {
                log_warning!("Could not detect the system time zone, using {DEFAULT_TIME_ZONE}");
                DEFAULT_TIME_ZONE.to_string()
            });
        config.time_zone = Some(zone);
    }
}
