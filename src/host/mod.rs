//! Plugin lifecycle as seen by the video host.
//!
//! The host calls [`AutostarterPlugin::module_load`] once at startup and
//! [`AutostarterPlugin::module_unload`] once at shutdown. Everything the plugin needs from the
//! host goes through the [`Host`] trait.

pub mod terminal;

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::launcher::{backend::ProcessBackend, AutoStarter};
use crate::ui::launch_prompt::LaunchChoice;
use crate::utils::{
    config::{AutostartFlags, ConstantDefaults, PluginConfig},
    errors::{AutostartError, AutostartErrorType},
    paths::CONFIG_FILE,
};

/// Services the host application provides to the plugin.
pub trait Host {
    /// The host's own command line, program name included.
    fn cmdline_args(&self) -> Vec<String>;

    /// Per-plugin directory for `config.json`.
    fn module_config_dir(&self) -> Result<PathBuf, AutostartError>;

    /// Registers an entry in the host's tools menu that opens the settings.
    fn add_tools_menu_item(&mut self, label: &str);

    /// Modal notification. Used only when a command-line loadout does not exist.
    fn show_warning(&mut self, title: &str, message: &str);

    /// Asks which loadout to launch, with `current` preselected.
    fn ask_launch(&mut self, loadouts: &[String], current: &str) -> LaunchChoice;
}

pub struct AutostarterPlugin<B: ProcessBackend> {
    config: PluginConfig,
    config_path: Option<PathBuf>,
    starter: AutoStarter<B>,
}

impl<B: ProcessBackend> AutostarterPlugin<B> {
    pub fn new(backend: B) -> Self {
        Self {
            config: PluginConfig::default(),
            config_path: None,
            starter: AutoStarter::new(backend),
        }
    }

    /// Plugin with a config loaded from `path`, outside of a host session.
    pub fn with_config_file<P: AsRef<Path>>(backend: B, path: P) -> Self {
        let mut plugin = Self::new(backend);
        plugin.load_config(path.as_ref().to_path_buf());
        plugin
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }
    pub fn config_mut(&mut self) -> &mut PluginConfig {
        &mut self.config
    }
    pub fn starter(&self) -> &AutoStarter<B> {
        &self.starter
    }

    /// Host startup hook.
    ///
    /// A `--autostarter <loadout>` argument on the host command line overrides the `enabled` and
    /// `askToLaunch` settings. Always returns `true`: nothing here fails the host.
    pub fn module_load<H: Host>(&mut self, host: &mut H) -> bool {
        let cmd_loadout = AutostartFlags::loadout_override(&host.cmdline_args());

        host.add_tools_menu_item(ConstantDefaults::menu_label());

        match host.module_config_dir() {
            Ok(dir) => self.load_config(dir.join(CONFIG_FILE)),
            Err(e) => {
                warn!(error = %e, "No config directory, using defaults");
                self.config = PluginConfig::default();
                self.config.init_default_loadout();
            }
        }

        if let Some(name) = cmd_loadout {
            if self.config.get_loadout(&name).is_none() {
                host.show_warning(
                    ConstantDefaults::window_title(),
                    &format!("Loadout '{}' not found", name),
                );
            } else {
                self.launch_loadout(&name);
            }
        } else if self.config.enabled {
            if self.config.ask_to_launch {
                let names = self.config.loadout_names();
                match host.ask_launch(&names, &self.config.current_loadout) {
                    LaunchChoice::Launch(name) => {
                        self.config.current_loadout = name.clone();
                        self.save_config();
                        self.launch_loadout(&name);
                    }
                    LaunchChoice::Skip => info!("Launch skipped"),
                }
            } else {
                let current = self.config.current_loadout.clone();
                self.launch_loadout(&current);
            }
        }
        true
    }

    /// Host shutdown hook. Terminates started programs if `autoclose` is set, then stops
    /// tracking whatever is left.
    pub fn module_unload(&mut self) {
        if self.config.autoclose {
            if let Err(e) = self.starter.quit_programs() {
                warn!(error = %e, "Not every program could be closed");
            }
        }
        self.starter.clear_processes();
    }

    /// Launches a loadout and logs a failure. An empty name means the current loadout.
    pub fn launch_loadout(&mut self, name: &str) -> bool {
        match self.starter.launch_programs(&self.config, name) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Loadout did not launch cleanly");
                false
            }
        }
    }

    pub fn quit_programs(&mut self) -> Result<(), AutostartError> {
        self.starter.quit_programs()
    }

    /// Writes the config back to where it was loaded from. Failures are logged only.
    pub fn save_config(&self) -> bool {
        let Some(path) = &self.config_path else {
            warn!("No writable config file, not saving");
            return false;
        };
        match self.config.save(path) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to save settings");
                false
            }
        }
    }

    fn load_config(&mut self, path: PathBuf) {
        let (config, warnings) = PluginConfig::load(&path);
        for warning in &warnings {
            warn!(error = %warning, "Problem while loading config");
        }
        let unparsable = warnings
            .iter()
            .any(|w| matches!(w.error, AutostartErrorType::FileParseError(_)));
        self.config = config;
        self.config_path = if unparsable {
            warn!(
                path = %path.display(),
                "Config file is not valid JSON, changes will not be saved"
            );
            None
        } else {
            Some(path)
        };
    }
}
