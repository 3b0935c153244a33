use std::path::{Path, PathBuf};
use std::{env, process};

use tracing::{info, warn};

use autostarter::{
    host::terminal::TerminalHost,
    loader::Loader,
    ui::settings::SettingsCommand,
    utils::{config::PluginConfig, errors::AutostartErrorType, logging, paths::CONFIG_FILE},
    AutostarterPlugin, SystemBackend,
};

#[tokio::main]
async fn main() {
    logging::init_logging();

    let flags = Loader::load_flags().unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(2);
    });
    let config_dir = flags.config_dir().unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(1);
    });
    let command = SettingsCommand::parse(&flags.command).unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(2);
    });

    match command {
        None => run_session(config_dir).await,
        Some(SettingsCommand::Launch(name)) => run_launch(&config_dir, name).await,
        Some(command) => run_settings(&command, &config_dir.join(CONFIG_FILE)),
    }
}

/// Host session: load, wait for Ctrl-C, unload.
async fn run_session(config_dir: PathBuf) {
    let mut host = TerminalHost::new(env::args().collect(), config_dir);
    let mut plugin = AutostarterPlugin::new(SystemBackend);
    plugin.module_load(&mut host);

    info!(
        tracked = plugin.starter().tracker().len(),
        "Session running, press Ctrl-C to exit"
    );
    wait_for_exit().await;
    plugin.module_unload();
}

/// Launch now and quit the launched programs on Ctrl-C, like the settings panel buttons.
async fn run_launch(config_dir: &Path, name: Option<String>) {
    let mut plugin =
        AutostarterPlugin::with_config_file(SystemBackend, config_dir.join(CONFIG_FILE));
    let launched = plugin.launch_loadout(name.as_deref().unwrap_or_default());
    if plugin.starter().tracker().is_empty() {
        process::exit(if launched { 0 } else { 1 });
    }

    info!(
        tracked = plugin.starter().tracker().len(),
        "Press Ctrl-C to quit the launched programs"
    );
    wait_for_exit().await;
    if let Err(e) = plugin.quit_programs() {
        warn!(error = %e, "Not every program could be closed");
    }
}

fn run_settings(command: &SettingsCommand, path: &Path) {
    let (mut config, warnings) = PluginConfig::load(path);
    for warning in &warnings {
        warn!(error = %warning, "Problem while loading config");
    }
    let unparsable = warnings
        .iter()
        .any(|w| matches!(w.error, AutostartErrorType::FileParseError(_)));

    match command.apply(&mut config) {
        Ok(message) => println!("{}", message),
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }

    if command.modifies_config() {
        if unparsable {
            eprintln!(
                "Not saving: {} could not be parsed. Fix or remove it first.",
                path.display()
            );
            process::exit(1);
        }
        if let Err(e) = config.save(path) {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

async fn wait_for_exit() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for Ctrl-C");
    }
}
