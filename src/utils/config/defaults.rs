pub struct OtherDefaults;
impl OtherDefaults {
    pub fn bool_true() -> bool {
        true
    }
}

pub struct ConstantDefaults;
impl ConstantDefaults {
    pub fn default_loadout() -> String {
        String::from("Default")
    }
    pub fn menu_label() -> &'static str {
        "Autostarter"
    }
    pub fn window_title() -> &'static str {
        "Autostarter"
    }
}
