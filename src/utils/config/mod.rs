use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::debug;

use super::errors::{AutostartError, AutostartErrorType};
use crate::autostart_error;

mod defaults;
mod flags;
mod imp;
mod lenient;

pub use defaults::{ConstantDefaults, OtherDefaults};
pub use flags::AutostartFlags;

/// Plugin settings as stored in `config.json`:
///
/// - **enabled**: Whether programs are started when the host starts.
/// - **currentLoadout**: Name of the selected loadout. This is a plain name and may point at a
///   loadout that no longer exists, so it is resolved again on every use.
/// - **askToLaunch**: Show the launch prompt instead of launching right away.
/// - **autoclose**: Terminate started programs when the host shuts down.
/// - **loadouts**: All loadouts in display order.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub enabled: bool,

    #[serde(default, deserialize_with = "lenient::or_default")]
    pub current_loadout: String,

    #[serde(
        default = "OtherDefaults::bool_true",
        deserialize_with = "lenient::or_true"
    )]
    pub ask_to_launch: bool,

    #[serde(default, deserialize_with = "lenient::or_default")]
    pub autoclose: bool,

    #[serde(default, deserialize_with = "lenient::list")]
    pub loadouts: Vec<Loadout>,
}

/// A named, ordered collection of programs launched together.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct Loadout {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::list")]
    pub programs: Vec<Program>,
}

/// One launchable target. Identity is the `(path, executable)` pair.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    /// Directory containing the executable
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub path: String,
    /// File name inside `path`
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub executable: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub minimized: bool,
}

impl Program {
    pub fn new(path: impl Into<String>, executable: impl Into<String>, minimized: bool) -> Self {
        Self {
            path: path.into(),
            executable: executable.into(),
            minimized,
        }
    }
    /// Splits a file path into its directory and file name.
    pub fn from_file_path<P: AsRef<Path>>(file: P, minimized: bool) -> Result<Self, AutostartError> {
        let file = file.as_ref();
        let executable = file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                autostart_error!(
                    AutostartErrorType::InvalidCommand(file.display().to_string()),
                    "Path does not name a file"
                )
            })?;
        let path = file
            .parent()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self::new(path, executable, minimized))
    }
    pub fn full_path(&self) -> PathBuf {
        Path::new(&self.path).join(&self.executable)
    }
    pub fn matches(&self, path: &str, executable: &str) -> bool {
        self.path == path && self.executable == executable
    }
}

impl Loadout {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            programs: Vec::new(),
        }
    }
    pub fn add_program(&mut self, program: Program) {
        self.programs.push(program);
    }
    /// Removes every program with the given identity. Returns whether anything was removed.
    pub fn remove_program(&mut self, path: &str, executable: &str) -> bool {
        let before = self.programs.len();
        self.programs.retain(|p| !p.matches(path, executable));
        before != self.programs.len()
    }
    pub fn set_minimized(
        &mut self,
        path: &str,
        executable: &str,
        minimized: bool,
    ) -> Result<(), AutostartError> {
        let program = self
            .programs
            .iter_mut()
            .find(|p| p.matches(path, executable))
            .ok_or_else(|| {
                autostart_error!(
                    AutostartErrorType::ProgramNotFound(format!("{}/{}", path, executable)),
                    format!("Loadout: {}", self.name)
                )
            })?;
        program.minimized = minimized;
        Ok(())
    }
}

impl PluginConfig {
    /// Reads the config from `path`. Never fails: unreadable or malformed files fall back to the
    /// defaults, and the cause is returned alongside so the caller can report it.
    ///
    /// A missing or unreadable file yields a single `Default` loadout. A file that is not valid
    /// JSON yields the plain defaults without any loadout. Fields with the wrong type fall back
    /// to their own default and leave the rest of the document intact.
    pub fn load<P: AsRef<Path>>(path: P) -> (Self, Vec<AutostartError>) {
        let path = path.as_ref();
        let mut warnings = Vec::new();

        let mut bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                let mut config = Self::default();
                config.init_default_loadout();
                if e.kind() == ErrorKind::NotFound {
                    debug!(path = %path.display(), "No config file yet, using defaults");
                } else {
                    warnings.push(autostart_error!(
                        AutostartErrorType::FileReadError(path.to_path_buf()),
                        e.to_string()
                    ));
                }
                return (config, warnings);
            }
        };

        match simd_json::from_slice::<PluginConfig>(&mut bytes) {
            Ok(config) => (config, warnings),
            Err(e) => {
                warnings.push(autostart_error!(
                    AutostartErrorType::FileParseError(path.to_path_buf()),
                    e.to_string()
                ));
                (Self::default(), warnings)
            }
        }
    }

    /// Writes the config to `path`, creating the parent directory if needed.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), AutostartError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                autostart_error!(
                    AutostartErrorType::DirCreateError(parent.to_path_buf()),
                    e.to_string()
                )
            })?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| autostart_error!(AutostartErrorType::SerializationError, e.to_string()))?;
        fs::write(path, json).map_err(|e| {
            autostart_error!(
                AutostartErrorType::FileWriteError(path.to_path_buf()),
                e.to_string()
            )
        })
    }

    /// Appends an empty loadout. Fails if the name is already taken.
    pub fn add_loadout(&mut self, name: &str) -> Result<&mut Loadout, AutostartError> {
        if self.get_loadout(name).is_some() {
            return Err(autostart_error!(
                AutostartErrorType::LoadoutExists(name.to_string()),
                ""
            ));
        }
        self.loadouts.push(Loadout::new(name));
        let last = self.loadouts.len() - 1;
        Ok(&mut self.loadouts[last])
    }

    /// Removes all loadouts with this name and returns how many were removed.
    pub fn remove_loadout(&mut self, name: &str) -> usize {
        let before = self.loadouts.len();
        self.loadouts.retain(|l| l.name != name);
        before - self.loadouts.len()
    }

    /// Same as [`remove_loadout`](Self::remove_loadout), but puts a `Default` loadout back when
    /// the list ends up empty.
    pub fn remove_loadout_and_reinit(&mut self, name: &str) -> usize {
        let removed = self.remove_loadout(name);
        if self.loadouts.is_empty() {
            self.init_default_loadout();
        }
        removed
    }

    pub fn get_loadout(&self, name: &str) -> Option<&Loadout> {
        self.loadouts.iter().find(|l| l.name == name)
    }

    pub fn get_loadout_mut(&mut self, name: &str) -> Option<&mut Loadout> {
        self.loadouts.iter_mut().find(|l| l.name == name)
    }

    /// Appends a loadout named `Default` without checking for an existing one.
    pub fn init_default_loadout(&mut self) {
        self.loadouts.push(Loadout::new(ConstantDefaults::default_loadout()));
    }

    pub fn loadout_names(&self) -> Vec<String> {
        self.loadouts.iter().map(|l| l.name.clone()).collect()
    }

    /// An empty name refers to the current loadout.
    pub fn resolve_loadout_name<'a>(&'a self, name: &'a str) -> &'a str {
        if name.is_empty() {
            &self.current_loadout
        } else {
            name
        }
    }
}
