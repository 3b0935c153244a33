use std::{env, path::PathBuf, str::FromStr};

use super::Loader;
use crate::autostart_error;
use crate::utils::{
    config::AutostartFlags,
    errors::{AutostartError, AutostartErrorType},
};

pub const LOADOUT_FLAG: &str = "--autostarter";
const VALUE_FLAGS: [&str; 3] = [LOADOUT_FLAG, "--config-dir", "-c"];

impl Loader {
    pub fn load_flags() -> Result<AutostartFlags, AutostartError> {
        let args: Vec<String> = env::args().collect();
        if args.iter().any(|a| a == "--help" || a == "-h") {
            flag_documentation();
            std::process::exit(0);
        }
        if args.iter().any(|a| a == "--version") {
            print_version();
            std::process::exit(0);
        }

        AutostartFlags::new(&args)
    }
}

impl AutostartFlags {
    fn extract_flag_value<T: FromStr>(args: &[String], flag: &str, short: Option<&str>) -> Option<T> {
        let long = args
            .iter()
            .position(|arg| arg == flag)
            .and_then(|i| args.get(i + 1))
            .and_then(|val| val.parse::<T>().ok());

        match &long {
            None => {
                let flag = short?;
                args.iter()
                    .position(|arg| arg == flag)
                    .and_then(|i| args.get(i + 1))
                    .and_then(|val| val.parse::<T>().ok())
            }
            _ => long,
        }
    }

    /// Looks for `--autostarter <loadout>` in the host's command line. The first occurrence that
    /// is followed by a value wins.
    pub fn loadout_override(args: &[String]) -> Option<String> {
        args.windows(2)
            .find(|pair| pair[0] == LOADOUT_FLAG)
            .map(|pair| pair[1].clone())
            .filter(|value| !value.is_empty())
    }

    /// `args` includes the program name at index 0.
    pub fn new(args: &[String]) -> Result<Self, AutostartError> {
        let args = args.get(1..).unwrap_or_default();

        let mut command = Vec::new();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if VALUE_FLAGS.contains(&arg.as_str()) {
                if iter.next().is_none() {
                    return Err(autostart_error!(
                        AutostartErrorType::FlagLoadError(arg.clone()),
                        format!("Missing value for \"{}\"", arg)
                    ));
                }
            } else {
                command.push(arg.clone());
            }
        }

        Ok(AutostartFlags {
            config_dir: Self::extract_flag_value::<PathBuf>(args, "--config-dir", Some("-c")),
            command,
        })
    }
}

pub fn print_version() {
    let version = env!("CARGO_PKG_VERSION");
    println!("Autostarter v{}", version);
}

pub fn flag_documentation() {
    let allowed_flags: Vec<(&str, &str)> = vec![
        ("\nBASICS:", ""),
        ("--version", "Print the version of the application."),
        ("--help", "Show this help message with allowed flags."),
        ("\nSESSION:", ""),
        (
            "--autostarter",
            "Launch the given loadout, ignoring the enabled and askToLaunch settings.",
        ),
        ("--config-dir", "Directory containing config.json."),
        ("\nCOMMANDS:", ""),
        ("show", "Print the current configuration."),
        ("loadout list", "List all loadouts."),
        ("loadout add", "<name> Add an empty loadout."),
        ("loadout remove", "<name> Remove a loadout."),
        ("loadout select", "<name> Make a loadout the current one."),
        ("program add", "<loadout> <file> [--minimized] Add a program."),
        ("program remove", "<loadout> <file> Remove a program."),
        ("program minimized", "<loadout> <file> <true|false> Start minimized."),
        ("set", "<enabled|ask-to-launch|autoclose> <true|false>"),
        ("launch", "[loadout] Launch now and quit the programs on Ctrl-C."),
    ];

    println!("{:<20} {}", "Flag", "Description");
    for (flag, explanation) in allowed_flags {
        println!("{:<20} {}", flag, explanation);
    }
    println!("\nWithout a command, autostarter runs a host session until Ctrl-C.");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn session_flags_are_not_commands() {
        let flags = AutostartFlags::new(&args(&[
            "autostarter",
            "--autostarter",
            "Streaming",
            "--config-dir",
            "/tmp/as",
        ]))
        .unwrap();
        assert_eq!(flags.config_dir, Some(PathBuf::from("/tmp/as")));
        assert!(flags.command.is_empty());
    }

    #[test]
    fn collects_positional_command_words() {
        let flags = AutostartFlags::new(&args(&[
            "autostarter",
            "-c",
            "/tmp/as",
            "program",
            "add",
            "Default",
            "/opt/bot",
            "--minimized",
        ]))
        .unwrap();
        assert_eq!(
            flags.command,
            args(&["program", "add", "Default", "/opt/bot", "--minimized"])
        );
        assert_eq!(flags.config_dir, Some(PathBuf::from("/tmp/as")));
    }

    #[test]
    fn missing_flag_value_is_an_error() {
        let err = AutostartFlags::new(&args(&["autostarter", "--autostarter"])).unwrap_err();
        assert_eq!(
            err.error,
            AutostartErrorType::FlagLoadError("--autostarter".to_string())
        );
    }

    #[test]
    fn loadout_override_scans_host_arguments() {
        let host = args(&["obs64", "--startreplaybuffer", "--autostarter", "Podcast"]);
        assert_eq!(AutostartFlags::loadout_override(&host).as_deref(), Some("Podcast"));
        assert_eq!(AutostartFlags::loadout_override(&args(&["obs64", "--autostarter"])), None);
        assert_eq!(AutostartFlags::loadout_override(&args(&["obs64"])), None);
    }
}
