use std::process::{Child, Command, Stdio};

use tracing::debug;

use crate::{
    autostart_error,
    utils::{
        config::Program,
        errors::{AutostartError, AutostartErrorType},
    },
};

/// Starts `program` as a new process rooted at its directory. The returned [`Child`] is the
/// caller's to track; it is neither waited on nor detached here.
pub fn spawn_program(program: &Program) -> Result<Child, AutostartError> {
    let mut command = build_command(program);
    command.spawn().map_err(|e| {
        autostart_error!(
            AutostartErrorType::ProcessLaunchError(program.executable.clone()),
            e.to_string()
        )
    })
}

pub fn build_command(program: &Program) -> Command {
    let mut command = Command::new(program.full_path());
    if !program.path.is_empty() {
        command.current_dir(&program.path);
    }
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    if program.minimized {
        // std::process has no portable window-state hint
        debug!(
            executable = %program.executable,
            "Minimized start requested, starting with the default window state"
        );
    }
    command
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn command_runs_from_program_directory() {
        let program = Program::new("/opt/tools", "bot", false);
        let command = build_command(&program);
        assert_eq!(command.get_program(), Path::new("/opt/tools/bot").as_os_str());
        assert_eq!(command.get_current_dir(), Some(Path::new("/opt/tools")));
        assert_eq!(command.get_args().count(), 0);
    }

    #[test]
    fn empty_directory_keeps_current_dir() {
        let program = Program::new("", "bot", true);
        let command = build_command(&program);
        assert_eq!(command.get_current_dir(), None);
    }

    #[test]
    fn missing_executable_fails_with_launch_error() {
        let program = Program::new("/nonexistent/autostarter", "missing-binary", false);
        let err = spawn_program(&program).unwrap_err();
        assert_eq!(
            err.error,
            AutostartErrorType::ProcessLaunchError("missing-binary".to_string())
        );
    }
}
