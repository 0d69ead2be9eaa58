// ⚙️ Configuration - Optional TOML file, every key has a default

use crate::calendar::WeekStart;
use crate::error::{Result, SubscriptionError};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_PATH_ENV_VAR: &str = "SUBCAL_CONFIG_FILE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prefix shown before every price
    pub currency_symbol: String,
    /// First column of the month grid
    pub week_start: WeekStart,
    /// Used when RUST_LOG is not set
    pub log_level: String,
    /// Bind address of the web server
    pub server_addr: String,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            currency_symbol: "$".to_string(),
            week_start: WeekStart::Sunday,
            log_level: if cfg!(debug_assertions) {
                "debug".to_string()
            } else {
                "info".to_string()
            },
            server_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Config> {
        toml::from_str(content).map_err(|e| SubscriptionError::Config(e.to_string()))
    }

    pub fn load_from_path(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| {
            SubscriptionError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Config::from_toml_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Candidate config files, most specific first.
///
/// `SUBCAL_CONFIG_FILE`, then `$XDG_CONFIG_HOME/subcal/config.toml`
/// (falling back to `~/.config/subcal/config.toml`), then `~/.subcal.toml`.
pub fn find_configfile_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();

    if let Ok(path) = env::var(CONFIG_PATH_ENV_VAR) {
        locations.push(PathBuf::from(path));
    }

    let home = env::var("HOME").ok().map(PathBuf::from);

    match env::var("XDG_CONFIG_HOME") {
        Ok(dir) => locations.push(PathBuf::from(dir).join("subcal").join("config.toml")),
        Err(_) => {
            if let Some(home) = &home {
                locations.push(home.join(".config").join("subcal").join("config.toml"));
            }
        }
    }

    if let Some(home) = &home {
        locations.push(home.join(".subcal.toml"));
    }

    locations
}

/// Load the config the user asked for, or the first one found, or defaults.
///
/// An explicitly given path must exist; discovered locations are skipped
/// when missing.
pub fn load_suitable_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return Config::load_from_path(path);
    }

    for location in find_configfile_locations() {
        if location.is_file() {
            return Config::load_from_path(&location);
        }
        debug!("No config at {}", location.display());
    }

    Ok(Config::default())
}
