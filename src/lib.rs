//! Starts and stops user-defined loadouts of external programs alongside a video host.

pub mod actions;
pub mod host;
pub mod launcher;
pub mod loader;
pub mod ui;
pub mod utils;

pub use host::{AutostarterPlugin, Host};
pub use launcher::{process_launcher::SystemBackend, AutoStarter};
pub use utils::config::{Loadout, PluginConfig, Program};
pub use utils::errors::{AutostartError, AutostartErrorType};
