use std::fmt;
use std::path::PathBuf;

/// Builds an [`AutostartError`] and records where it was raised.
///
/// ```ignore
/// autostart_error!(AutostartErrorType::FileReadError(path), e.to_string())
/// ```
#[macro_export]
macro_rules! autostart_error {
    ($errtype:expr, $source:expr) => {
        $crate::utils::errors::AutostartError {
            error: $errtype,
            traceback: format!("Location: {}:{}\n{}", file!(), line!(), $source),
        }
    };
}

#[derive(Clone, Debug)]
pub struct AutostartError {
    pub error: AutostartErrorType,
    pub traceback: String,
}
impl AutostartError {
    /// The underlying cause without the location prefix.
    pub fn source_text(&self) -> &str {
        self.traceback
            .split_once('\n')
            .map_or(self.traceback.as_str(), |(_, rest)| rest)
    }
}
impl fmt::Display for AutostartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, message) = self.error.get_message();
        let source = self.source_text();
        if source.is_empty() {
            write!(f, "{}: {}", name, message)
        } else {
            write!(f, "{}: {} ({})", name, message, source)
        }
    }
}
impl std::error::Error for AutostartError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AutostartErrorType {
    // Config store
    LoadoutNotFound(String),
    LoadoutExists(String),
    EmptyLoadoutName,
    ProgramNotFound(String),

    // Processes
    ProcessEnumerationError,
    ProcessLaunchError(String),
    FileOpenError(String),
    ProcessTerminateError(u32),
    ProgramsFailed(usize),
    TerminationsFailed(usize),

    // Files
    FileReadError(PathBuf),
    FileWriteError(PathBuf),
    FileParseError(PathBuf),
    DirCreateError(PathBuf),
    SerializationError,
    EnvVarNotFoundError(String),

    // Flags and commands
    FlagLoadError(String),
    InvalidCommand(String),
}

impl AutostartErrorType {
    pub fn get_message(&self) -> (String, String) {
        let message = match self {
            AutostartErrorType::LoadoutNotFound(name) => {
                format!("Loadout '{}' not found", name)
            }
            AutostartErrorType::LoadoutExists(name) => {
                format!("A loadout named '{}' already exists", name)
            }
            AutostartErrorType::EmptyLoadoutName => "Name cannot be empty".to_string(),
            AutostartErrorType::ProgramNotFound(program) => {
                format!("Program '{}' is not part of this loadout", program)
            }
            AutostartErrorType::ProcessEnumerationError => {
                "Failed to enumerate running processes".to_string()
            }
            AutostartErrorType::ProcessLaunchError(exe) => {
                format!("Failed to launch process '{}'", exe)
            }
            AutostartErrorType::FileOpenError(file) => format!("Failed to open file '{}'", file),
            AutostartErrorType::ProcessTerminateError(pid) => {
                format!("Failed to terminate process {}", pid)
            }
            AutostartErrorType::ProgramsFailed(count) => {
                format!("{} program(s) failed to launch", count)
            }
            AutostartErrorType::TerminationsFailed(count) => {
                format!("{} process(es) could not be terminated", count)
            }
            AutostartErrorType::FileReadError(path) => {
                format!("Failed to read file \"{}\"", path.display())
            }
            AutostartErrorType::FileWriteError(path) => {
                format!("Failed to write file \"{}\"", path.display())
            }
            AutostartErrorType::FileParseError(path) => {
                format!("Failed to parse file \"{}\"", path.display())
            }
            AutostartErrorType::DirCreateError(path) => {
                format!("Failed to create directory \"{}\"", path.display())
            }
            AutostartErrorType::SerializationError => "Failed to serialize config".to_string(),
            AutostartErrorType::EnvVarNotFoundError(var) => {
                format!("Environment variable \"{}\" is not set", var)
            }
            AutostartErrorType::FlagLoadError(flag) => format!("Invalid flag: {}", flag),
            AutostartErrorType::InvalidCommand(cmd) => format!("Invalid command: {}", cmd),
        };
        (self.name().to_string(), message)
    }

    fn name(&self) -> &'static str {
        match self {
            AutostartErrorType::LoadoutNotFound(_) => "LoadoutNotFound",
            AutostartErrorType::LoadoutExists(_) => "LoadoutExists",
            AutostartErrorType::EmptyLoadoutName => "EmptyLoadoutName",
            AutostartErrorType::ProgramNotFound(_) => "ProgramNotFound",
            AutostartErrorType::ProcessEnumerationError => "ProcessEnumerationError",
            AutostartErrorType::ProcessLaunchError(_) => "ProcessLaunchError",
            AutostartErrorType::FileOpenError(_) => "FileOpenError",
            AutostartErrorType::ProcessTerminateError(_) => "ProcessTerminateError",
            AutostartErrorType::ProgramsFailed(_) => "ProgramsFailed",
            AutostartErrorType::TerminationsFailed(_) => "TerminationsFailed",
            AutostartErrorType::FileReadError(_) => "FileReadError",
            AutostartErrorType::FileWriteError(_) => "FileWriteError",
            AutostartErrorType::FileParseError(_) => "FileParseError",
            AutostartErrorType::DirCreateError(_) => "DirCreateError",
            AutostartErrorType::SerializationError => "SerializationError",
            AutostartErrorType::EnvVarNotFoundError(_) => "EnvVarNotFoundError",
            AutostartErrorType::FlagLoadError(_) => "FlagLoadError",
            AutostartErrorType::InvalidCommand(_) => "InvalidCommand",
        }
    }
}
