use std::path::PathBuf;

use crate::utils::{
    errors::AutostartError,
    paths::{self, expand_path, home_dir},
};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AutostartFlags {
    /// `--config-dir <dir>`: where `config.json` lives
    pub config_dir: Option<PathBuf>,
    /// Positional words, e.g. `loadout add Gaming`
    pub command: Vec<String>,
}

impl AutostartFlags {
    pub fn config_dir(&self) -> Result<PathBuf, AutostartError> {
        match &self.config_dir {
            Some(dir) => {
                let home = home_dir()?;
                Ok(expand_path(dir, &home))
            }
            None => paths::get_config_dir(),
        }
    }
}
