use std::path::Path;
use std::process::Child;

use tracing::debug;

use super::backend::ProcessBackend;
use crate::actions::{applaunch::spawn_program, fileopen::open_with_default};
use crate::autostart_error;
use crate::utils::{
    config::Program,
    errors::{AutostartError, AutostartErrorType},
};

/// A process started by [`SystemBackend`].
#[derive(Debug)]
pub struct LaunchedProcess {
    pub executable: String,
    child: Child,
}
impl LaunchedProcess {
    pub fn pid(&self) -> u32 {
        self.child.id()
    }
}

/// [`ProcessBackend`] backed by the running operating system.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemBackend;

impl ProcessBackend for SystemBackend {
    type Handle = LaunchedProcess;

    fn running_executables(&self) -> Result<Vec<String>, AutostartError> {
        get_process_names()
    }

    fn open_with_default(&self, program: &Program) -> Result<(), AutostartError> {
        open_with_default(program)
    }

    fn spawn(&self, program: &Program) -> Result<LaunchedProcess, AutostartError> {
        let child = spawn_program(program)?;
        Ok(LaunchedProcess {
            executable: program.executable.clone(),
            child,
        })
    }

    fn terminate(&self, handle: &mut LaunchedProcess) -> Result<(), AutostartError> {
        let pid = handle.pid();
        kill(handle).map_err(|e| {
            autostart_error!(AutostartErrorType::ProcessTerminateError(pid), e)
        })?;
        // reap so the killed child does not linger as a zombie
        let _ = handle.child.wait();
        Ok(())
    }

    fn release(&self, mut handle: LaunchedProcess) {
        if let Ok(Some(status)) = handle.child.try_wait() {
            debug!(pid = handle.pid(), %status, "Released exited process");
        }
    }
}

#[cfg(unix)]
fn kill(handle: &mut LaunchedProcess) -> Result<(), String> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let pid = i32::try_from(handle.pid()).map_err(|e| e.to_string())?;
    kill(Pid::from_raw(pid), Signal::SIGKILL).map_err(|e| e.to_string())
}

#[cfg(not(unix))]
fn kill(handle: &mut LaunchedProcess) -> Result<(), String> {
    handle.child.kill().map_err(|e| e.to_string())
}

/// Base names of every process visible to the current user.
#[cfg(target_os = "linux")]
pub fn get_process_names() -> Result<Vec<String>, AutostartError> {
    use procfs::process::all_processes;

    let procs = all_processes().map_err(|e| {
        autostart_error!(AutostartErrorType::ProcessEnumerationError, e.to_string())
    })?;
    Ok(procs
        .flatten()
        .filter_map(|p| {
            // exe() needs ptrace access, comm is always readable but truncated
            p.exe()
                .ok()
                .and_then(|path| path.file_name()?.to_str().map(str::to_string))
                .or_else(|| p.stat().ok().map(|stat| stat.comm))
        })
        .collect())
}

#[cfg(windows)]
pub fn get_process_names() -> Result<Vec<String>, AutostartError> {
    use std::os::windows::process::CommandExt;

    let output = std::process::Command::new("tasklist")
        .args(["/FO", "CSV", "/NH"])
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::null())
        .creation_flags(0x08000000) // CREATE_NO_WINDOW
        .output()
        .map_err(|e| {
            autostart_error!(AutostartErrorType::ProcessEnumerationError, e.to_string())
        })?;
    if !output.status.success() {
        return Err(autostart_error!(
            AutostartErrorType::ProcessEnumerationError,
            format!("tasklist exited with {}", output.status)
        ));
    }
    Ok(parse_tasklist_csv(&String::from_utf8_lossy(&output.stdout)))
}

#[cfg(all(unix, not(target_os = "linux")))]
pub fn get_process_names() -> Result<Vec<String>, AutostartError> {
    let output = std::process::Command::new("ps")
        .args(["-A", "-o", "comm="])
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::null())
        .output()
        .map_err(|e| {
            autostart_error!(AutostartErrorType::ProcessEnumerationError, e.to_string())
        })?;
    if !output.status.success() {
        return Err(autostart_error!(
            AutostartErrorType::ProcessEnumerationError,
            format!("ps exited with {}", output.status)
        ));
    }
    Ok(parse_ps_output(&String::from_utf8_lossy(&output.stdout)))
}

#[cfg(not(any(unix, windows)))]
pub fn get_process_names() -> Result<Vec<String>, AutostartError> {
    Err(autostart_error!(
        AutostartErrorType::ProcessEnumerationError,
        "Unsupported platform"
    ))
}

/// Image names from `tasklist /FO CSV /NH`, one quoted record per line.
pub fn parse_tasklist_csv(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let name = line.trim().strip_prefix('"')?.split('"').next()?;
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

/// Base names from `ps -o comm=`, which may print full paths.
pub fn parse_ps_output(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| Path::new(line).file_name()?.to_str().map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tasklist_records() {
        let output = "\"System Idle Process\",\"0\",\"Services\",\"0\",\"8 K\"\r\n\
                      \"obs64.exe\",\"4312\",\"Console\",\"1\",\"250,112 K\"\r\n\
                      \r\n";
        assert_eq!(
            parse_tasklist_csv(output),
            vec!["System Idle Process".to_string(), "obs64.exe".to_string()]
        );
    }

    #[test]
    fn parses_ps_paths_to_base_names() {
        let output = "/sbin/launchd\n  /Applications/OBS.app/Contents/MacOS/OBS\nbash\n\n";
        assert_eq!(
            parse_ps_output(output),
            vec!["launchd".to_string(), "OBS".to_string(), "bash".to_string()]
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn enumeration_sees_the_test_process() {
        let names = get_process_names().unwrap();
        assert!(!names.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn spawn_then_terminate_real_process() {
        let program = Program::new("/bin", "sleep", false);
        let backend = SystemBackend;
        let mut command = crate::actions::applaunch::build_command(&program);
        command.arg("30");
        let mut handle = LaunchedProcess {
            executable: program.executable.clone(),
            child: command.spawn().unwrap(),
        };
        assert!(handle.pid() > 0);
        backend.terminate(&mut handle).unwrap();
        assert!(handle.child.try_wait().unwrap().is_some());
        backend.release(handle);
    }
}
