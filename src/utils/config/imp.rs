use crate::utils::config::{defaults::OtherDefaults, PluginConfig};

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            current_loadout: String::new(),
            ask_to_launch: OtherDefaults::bool_true(),
            autoclose: false,
            loadouts: Vec::new(),
        }
    }
}
