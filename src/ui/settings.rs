use std::env;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::autostart_error;
use crate::utils::{
    config::{PluginConfig, Program},
    errors::{AutostartError, AutostartErrorType},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Setting {
    Enabled,
    AskToLaunch,
    Autoclose,
}

/// Settings-panel actions, expressed as command-line words.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SettingsCommand {
    Show,
    ListLoadouts,
    AddLoadout(String),
    RemoveLoadout(String),
    SelectLoadout(String),
    AddProgram {
        loadout: String,
        file: PathBuf,
        minimized: bool,
    },
    RemoveProgram {
        loadout: String,
        file: PathBuf,
    },
    SetMinimized {
        loadout: String,
        file: PathBuf,
        minimized: bool,
    },
    Set(Setting, bool),
    Launch(Option<String>),
}

fn invalid(words: &[String], reason: &str) -> AutostartError {
    autostart_error!(
        AutostartErrorType::InvalidCommand(words.join(" ")),
        reason
    )
}

fn parse_bool(words: &[String], value: &str) -> Result<bool, AutostartError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(invalid(words, "Expected true or false")),
    }
}

impl SettingsCommand {
    /// `None` when there are no words, i.e. a plain host session.
    pub fn parse(words: &[String]) -> Result<Option<Self>, AutostartError> {
        let minimized = words.iter().any(|w| w == "--minimized");
        let args: Vec<&str> = words
            .iter()
            .map(String::as_str)
            .filter(|w| *w != "--minimized")
            .collect();

        let command = match args.as_slice() {
            [] => return Ok(None),
            ["show"] => SettingsCommand::Show,
            ["loadout", "list"] => SettingsCommand::ListLoadouts,
            ["loadout", "add", name] => SettingsCommand::AddLoadout(name.to_string()),
            ["loadout", "remove", name] => SettingsCommand::RemoveLoadout(name.to_string()),
            ["loadout", "select", name] => SettingsCommand::SelectLoadout(name.to_string()),
            ["program", "add", loadout, file] => SettingsCommand::AddProgram {
                loadout: loadout.to_string(),
                file: PathBuf::from(file),
                minimized,
            },
            ["program", "remove", loadout, file] => SettingsCommand::RemoveProgram {
                loadout: loadout.to_string(),
                file: PathBuf::from(file),
            },
            ["program", "minimized", loadout, file, value] => SettingsCommand::SetMinimized {
                loadout: loadout.to_string(),
                file: PathBuf::from(file),
                minimized: parse_bool(words, value)?,
            },
            ["set", key, value] => {
                let setting = match *key {
                    "enabled" => Setting::Enabled,
                    "ask-to-launch" => Setting::AskToLaunch,
                    "autoclose" => Setting::Autoclose,
                    _ => return Err(invalid(words, "Unknown setting")),
                };
                SettingsCommand::Set(setting, parse_bool(words, value)?)
            }
            ["launch"] => SettingsCommand::Launch(None),
            ["launch", name] => SettingsCommand::Launch(Some(name.to_string())),
            _ => return Err(invalid(words, "See --help for available commands")),
        };
        Ok(Some(command))
    }

    /// Whether [`apply`](Self::apply) changes the config, so it has to be saved afterwards.
    pub fn modifies_config(&self) -> bool {
        !matches!(
            self,
            SettingsCommand::Show | SettingsCommand::ListLoadouts | SettingsCommand::Launch(_)
        )
    }

    /// Applies the command and returns a message for the user. `Launch` is not handled here.
    pub fn apply(&self, config: &mut PluginConfig) -> Result<String, AutostartError> {
        match self {
            SettingsCommand::Show => Ok(describe(config)),
            SettingsCommand::ListLoadouts => Ok(config
                .loadout_names()
                .iter()
                .map(|name| {
                    let marker = if *name == config.current_loadout { '*' } else { ' ' };
                    format!("{} {}", marker, name)
                })
                .collect::<Vec<_>>()
                .join("\n")),
            SettingsCommand::AddLoadout(name) => {
                if name.trim().is_empty() {
                    return Err(autostart_error!(AutostartErrorType::EmptyLoadoutName, ""));
                }
                config.add_loadout(name)?;
                Ok(format!("Added loadout '{}'", name))
            }
            SettingsCommand::RemoveLoadout(name) => {
                if config.remove_loadout_and_reinit(name) == 0 {
                    return Err(not_found(name));
                }
                Ok(format!("Removed loadout '{}'", name))
            }
            SettingsCommand::SelectLoadout(name) => {
                if config.get_loadout(name).is_none() {
                    return Err(not_found(name));
                }
                config.current_loadout = name.clone();
                Ok(format!("Current loadout is now '{}'", name))
            }
            SettingsCommand::AddProgram {
                loadout,
                file,
                minimized,
            } => {
                let program = Program::from_file_path(absolute(file)?, *minimized)?;
                let target = config
                    .get_loadout_mut(loadout)
                    .ok_or_else(|| not_found(loadout))?;
                let message = format!("Added {} to '{}'", program.full_path().display(), loadout);
                target.add_program(program);
                Ok(message)
            }
            SettingsCommand::RemoveProgram { loadout, file } => {
                let program = Program::from_file_path(absolute(file)?, false)?;
                let target = config
                    .get_loadout_mut(loadout)
                    .ok_or_else(|| not_found(loadout))?;
                if !target.remove_program(&program.path, &program.executable) {
                    return Err(autostart_error!(
                        AutostartErrorType::ProgramNotFound(
                            program.full_path().display().to_string()
                        ),
                        format!("Loadout: {}", loadout)
                    ));
                }
                Ok(format!(
                    "Removed {} from '{}'",
                    program.full_path().display(),
                    loadout
                ))
            }
            SettingsCommand::SetMinimized {
                loadout,
                file,
                minimized,
            } => {
                let program = Program::from_file_path(absolute(file)?, false)?;
                config
                    .get_loadout_mut(loadout)
                    .ok_or_else(|| not_found(loadout))?
                    .set_minimized(&program.path, &program.executable, *minimized)?;
                Ok(format!(
                    "{} starts {}",
                    program.executable,
                    if *minimized { "minimized" } else { "normally" }
                ))
            }
            SettingsCommand::Set(setting, value) => {
                let (field, key) = match setting {
                    Setting::Enabled => (&mut config.enabled, "enabled"),
                    Setting::AskToLaunch => (&mut config.ask_to_launch, "askToLaunch"),
                    Setting::Autoclose => (&mut config.autoclose, "autoclose"),
                };
                *field = *value;
                Ok(format!("{} = {}", key, value))
            }
            SettingsCommand::Launch(_) => Err(autostart_error!(
                AutostartErrorType::InvalidCommand("launch".to_string()),
                "Launching is not a settings change"
            )),
        }
    }
}

fn not_found(name: &str) -> AutostartError {
    autostart_error!(AutostartErrorType::LoadoutNotFound(name.to_string()), "")
}

fn absolute(file: &Path) -> Result<PathBuf, AutostartError> {
    if file.is_absolute() {
        return Ok(file.to_path_buf());
    }
    let cwd = env::current_dir().map_err(|e| {
        autostart_error!(
            AutostartErrorType::EnvVarNotFoundError("PWD".to_string()),
            e.to_string()
        )
    })?;
    Ok(cwd.join(file))
}

pub fn describe(config: &PluginConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "enabled:        {}", config.enabled);
    let _ = writeln!(out, "askToLaunch:    {}", config.ask_to_launch);
    let _ = writeln!(out, "autoclose:      {}", config.autoclose);
    let _ = writeln!(out, "currentLoadout: {}", config.current_loadout);
    for loadout in &config.loadouts {
        let _ = writeln!(out, "\n[{}]", loadout.name);
        if loadout.programs.is_empty() {
            let _ = writeln!(out, "  (empty)");
        }
        for program in &loadout.programs {
            let _ = writeln!(
                out,
                "  {}{}",
                program.full_path().display(),
                if program.minimized { " (minimized)" } else { "" }
            );
        }
    }
    out
}
