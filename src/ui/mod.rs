pub mod launch_prompt;
pub mod settings;
