use std::io;
use std::path::PathBuf;

use tracing::{info, warn};

use super::Host;
use crate::ui::launch_prompt::{self, LaunchChoice};
use crate::utils::errors::AutostartError;

/// Stands in for the video host when autostarter runs on its own: arguments come from the
/// process command line, dialogs are rendered on the terminal.
#[derive(Debug)]
pub struct TerminalHost {
    args: Vec<String>,
    config_dir: PathBuf,
    menu_items: Vec<String>,
}

impl TerminalHost {
    pub fn new(args: Vec<String>, config_dir: PathBuf) -> Self {
        Self {
            args,
            config_dir,
            menu_items: Vec::new(),
        }
    }
    pub fn menu_items(&self) -> &[String] {
        &self.menu_items
    }
}

impl Host for TerminalHost {
    fn cmdline_args(&self) -> Vec<String> {
        self.args.clone()
    }

    fn module_config_dir(&self) -> Result<PathBuf, AutostartError> {
        Ok(self.config_dir.clone())
    }

    fn add_tools_menu_item(&mut self, label: &str) {
        info!("Registered tools menu item '{}'", label);
        self.menu_items.push(label.to_string());
    }

    fn show_warning(&mut self, title: &str, message: &str) {
        warn!("{}", message);
        eprintln!("[{}] {}", title, message);
    }

    fn ask_launch(&mut self, loadouts: &[String], current: &str) -> LaunchChoice {
        let stdin = io::stdin();
        launch_prompt::prompt(stdin.lock(), io::stdout(), loadouts, current)
    }
}
