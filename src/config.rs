pub mod range_types;

use crate::game_logic::errors::{NavError, NavResult};
use crate::resources::NavConfig;
use bevy::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

pub fn get_config_path() -> NavResult<PathBuf> {
    let mut path = dirs::config_dir().ok_or(NavError::ConfigDirNotFound)?;
    path.push("sightline");
    fs::create_dir_all(&path)?;
    path.push("config.toml");
    Ok(path)
}

/// Read a config file, failing if it is missing or malformed
pub fn load_config_from(path: &Path) -> NavResult<NavConfig> {
    if !path.exists() {
        return Err(NavError::ConfigFileNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = fs::read_to_string(path)?;
    Ok(toml::from_str::<NavConfig>(&contents)?)
}

/// Load the user config, falling back to defaults on any failure
pub fn load_config() -> NavConfig {
    match get_config_path().and_then(|path| load_config_from(&path)) {
        Ok(config) => {
            info!("Loaded navigation config");
            config
        }
        Err(NavError::ConfigFileNotFound { path }) => {
            debug!("No config at {}, using defaults", path.display());
            NavConfig::default()
        }
        Err(err) => {
            warn!("Failed to load config ({err}), using defaults");
            NavConfig::default()
        }
    }
}

pub fn save_config_to(config: &NavConfig, path: &Path) -> NavResult<()> {
    let contents = toml::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}

pub fn save_config(config: &NavConfig) -> NavResult<()> {
    save_config_to(config, &get_config_path()?)
}
