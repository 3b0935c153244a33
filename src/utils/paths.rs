use std::env;
use std::path::PathBuf;

use crate::autostart_error;
use crate::utils::errors::{AutostartError, AutostartErrorType};

pub const CONFIG_FILE: &str = "config.json";
const APP_DIR: &str = "autostarter";

pub fn home_dir() -> Result<PathBuf, AutostartError> {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .map_err(|e| {
            autostart_error!(
                AutostartErrorType::EnvVarNotFoundError("HOME".to_string()),
                e.to_string()
            )
        })
}

/// Per-installation directory holding `config.json`. Uses `XDG_CONFIG_HOME` when set and falls
/// back to `~/.config`.
pub fn get_config_dir() -> Result<PathBuf, AutostartError> {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            return Ok(PathBuf::from(xdg).join(APP_DIR));
        }
    }
    Ok(home_dir()?.join(".config").join(APP_DIR))
}

/// Replaces a leading `~` with the home directory.
pub fn expand_path(path: &std::path::Path, home: &std::path::Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}
