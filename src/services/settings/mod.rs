//! Loading `config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;

use crate::models::settings::ScheduleConfig;

/// Environment variable pointing at an alternative config file.
pub const CONFIG_ENV_VAR: &str = "CRUISE_SCHEDULE_CONFIG";

/// Default location: `<config dir>/cruise-schedule/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "cruise-schedule", "cruise-schedule")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Resolve and load the configuration.
///
/// An explicit path (argument, then environment variable) must exist.
/// The default path is optional; a missing file means defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<ScheduleConfig> {
    let from_env = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);

    let config = match explicit.map(Path::to_path_buf).or(from_env) {
        Some(path) => read_config(&path)?,
        None => match default_config_path() {
            Some(path) if path.exists() => read_config(&path)?,
            _ => {
                log::debug!("No config file found, using defaults");
                ScheduleConfig::default()
            }
        },
    };

    config
        .validate()
        .map_err(|e| anyhow!("Invalid settings: {}", e))?;
    Ok(config)
}

fn read_config(path: &Path) -> Result<ScheduleConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config from {}", path.display()))?;
    let config = toml::from_str(&data)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    log::info!("Loaded config from {}", path.display());
    Ok(config)
}
