mod config;

pub use config::{Config, DisplayConfig, ScheduleConfig};

use std::path::PathBuf;

/// Environment variable that overrides the config directory.
pub const CONFIG_DIR_ENV: &str = "POMOTRACKER_CONFIG_DIR";

/// Returns `~/.config/pomotracker/`, or `$POMOTRACKER_CONFIG_DIR` when set.
///
/// The directory is not created here; [`Config::save`] creates it on
/// first write.
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }

    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("pomotracker")
}
