pub mod backend;
pub mod process_launcher;
pub mod tracker;

#[cfg(test)]
pub mod testing;

use std::env::consts::EXE_EXTENSION;
use std::path::Path;

use tracing::{info, warn};

use crate::autostart_error;
use crate::utils::{
    config::{PluginConfig, Program},
    errors::{AutostartError, AutostartErrorType},
};
use backend::ProcessBackend;
use tracker::ProcessTracker;

/// How a program entry gets started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LaunchMethod {
    /// Create a native process
    Native,
    /// Hand the file to the OS default handler
    DefaultHandler,
}
impl LaunchMethod {
    /// A name containing a dot has an extension: everything from the last dot on, the dot
    /// included. Anything with an extension other than the platform's executable extension goes
    /// to the default handler, so `chat.` and `.profile` do too.
    pub fn for_executable(executable: &str) -> Self {
        Self::with_exe_extension(executable, EXE_EXTENSION)
    }

    /// Like [`for_executable`](Self::for_executable), except that on Unix a file carrying an
    /// execute permission bit is always started natively, whatever its name.
    pub fn for_program(program: &Program) -> Self {
        if is_executable_file(&program.full_path()) {
            return LaunchMethod::Native;
        }
        Self::for_executable(&program.executable)
    }

    fn with_exe_extension(executable: &str, exe_extension: &str) -> Self {
        let Some(dot) = executable.rfind('.') else {
            return LaunchMethod::Native;
        };
        let ext = &executable[dot + 1..];
        if !exe_extension.is_empty() && ext.eq_ignore_ascii_case(exe_extension) {
            LaunchMethod::Native
        } else {
            LaunchMethod::DefaultHandler
        }
    }
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable_file(_path: &Path) -> bool {
    false
}

/// Result of a successful [`AutoStarter::launch_program`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// A process with the same executable name was already running
    AlreadyRunning,
    /// Handed to the default handler; nothing is tracked
    Opened,
    /// A new process was created and is now tracked
    Started,
}

/// Launches loadouts and owns the processes it started.
#[derive(Debug)]
pub struct AutoStarter<B: ProcessBackend> {
    backend: B,
    tracker: ProcessTracker<B::Handle>,
}

impl<B: ProcessBackend> AutoStarter<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            tracker: ProcessTracker::new(),
        }
    }
    pub fn backend(&self) -> &B {
        &self.backend
    }
    pub fn tracker(&self) -> &ProcessTracker<B::Handle> {
        &self.tracker
    }

    /// Launches every program of a loadout in order. An empty name means the config's current
    /// loadout. Each program is attempted even if an earlier one failed; the result is `Ok` only
    /// if all of them succeeded.
    pub fn launch_programs(
        &mut self,
        config: &PluginConfig,
        loadout_name: &str,
    ) -> Result<(), AutostartError> {
        let target = config.resolve_loadout_name(loadout_name);
        let loadout = config.get_loadout(target).ok_or_else(|| {
            warn!("Loadout '{}' not found", target);
            autostart_error!(AutostartErrorType::LoadoutNotFound(target.to_string()), "")
        })?;

        let mut failed = 0;
        for program in &loadout.programs {
            if let Err(e) = self.launch_program(program) {
                warn!(
                    error = %e,
                    "Failed to launch program: {}/{}",
                    program.path,
                    program.executable
                );
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(autostart_error!(
                AutostartErrorType::ProgramsFailed(failed),
                format!("Loadout: {}", target)
            ));
        }
        Ok(())
    }

    /// Starts a single program unless a process with the same executable name already runs.
    pub fn launch_program(&mut self, program: &Program) -> Result<LaunchOutcome, AutostartError> {
        if self.is_process_running(&program.executable) {
            info!(
                "Program '{}' is already running, skipping launch",
                program.executable
            );
            return Ok(LaunchOutcome::AlreadyRunning);
        }

        match LaunchMethod::for_program(program) {
            LaunchMethod::DefaultHandler => {
                self.backend.open_with_default(program)?;
                info!("Successfully opened file: {}", program.executable);
                Ok(LaunchOutcome::Opened)
            }
            LaunchMethod::Native => {
                let handle = self.backend.spawn(program)?;
                info!(?handle, "Successfully launched: {}", program.executable);
                self.tracker.track(handle);
                Ok(LaunchOutcome::Started)
            }
        }
    }

    /// Case-insensitive match of the executable's base name against running processes. A failed
    /// process listing counts as "not running".
    pub fn is_process_running(&self, executable: &str) -> bool {
        let Some(name) = Path::new(executable).file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let name = name.to_lowercase();

        match self.backend.running_executables() {
            Ok(running) => running.iter().any(|r| r.to_lowercase() == name),
            Err(e) => {
                warn!(error = %e, "Could not check running processes");
                false
            }
        }
    }

    pub fn quit_programs(&mut self) -> Result<(), AutostartError> {
        self.tracker.quit_programs(&self.backend)
    }

    pub fn clear_processes(&mut self) {
        self.tracker.clear_processes(&self.backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::Loadout;
    use super::testing::{Call, MockBackend};

    fn config_with(programs: Vec<Program>) -> PluginConfig {
        let mut config = PluginConfig::default();
        config.current_loadout = "Stream".to_string();
        config.loadouts.push(Loadout {
            name: "Stream".to_string(),
            programs,
        });
        config
    }

    #[test]
    fn launch_method_follows_extension() {
        assert_eq!(
            LaunchMethod::with_exe_extension("chat.exe", "exe"),
            LaunchMethod::Native
        );
        assert_eq!(
            LaunchMethod::with_exe_extension("Chat.EXE", "exe"),
            LaunchMethod::Native
        );
        assert_eq!(
            LaunchMethod::with_exe_extension("chat", "exe"),
            LaunchMethod::Native
        );
        assert_eq!(
            LaunchMethod::with_exe_extension("overlay.html", "exe"),
            LaunchMethod::DefaultHandler
        );
        assert_eq!(
            LaunchMethod::with_exe_extension("scene.tar.gz", "exe"),
            LaunchMethod::DefaultHandler
        );
        assert_eq!(
            LaunchMethod::with_exe_extension("chat", ""),
            LaunchMethod::Native
        );
        assert_eq!(
            LaunchMethod::with_exe_extension("notes.txt", ""),
            LaunchMethod::DefaultHandler
        );
    }

    #[test]
    fn trailing_and_leading_dots_count_as_extensions() {
        for exe_extension in ["exe", ""] {
            assert_eq!(
                LaunchMethod::with_exe_extension("chat.", exe_extension),
                LaunchMethod::DefaultHandler
            );
            assert_eq!(
                LaunchMethod::with_exe_extension(".profile", exe_extension),
                LaunchMethod::DefaultHandler
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn executable_bit_wins_over_extension() {
        use std::os::unix::fs::PermissionsExt;

        let dir = crate::utils::test_utils::scratch_dir("launch-method-exec-bit");
        for (name, mode) in [("tool.sh", 0o755), ("notes.sh", 0o644)] {
            let file = dir.join(name);
            std::fs::write(&file, "#!/bin/sh\n").unwrap();
            std::fs::set_permissions(&file, std::fs::Permissions::from_mode(mode)).unwrap();
        }
        let path = dir.to_string_lossy().to_string();

        assert_eq!(
            LaunchMethod::for_program(&Program::new(path.clone(), "tool.sh", false)),
            LaunchMethod::Native
        );
        assert_eq!(
            LaunchMethod::for_program(&Program::new(path.clone(), "notes.sh", false)),
            LaunchMethod::for_executable("notes.sh")
        );
        // missing files fall back to the name
        assert_eq!(
            LaunchMethod::for_program(&Program::new(path, "gone.sh", false)),
            LaunchMethod::for_executable("gone.sh")
        );
    }

    #[test]
    fn unknown_loadout_fails_without_os_calls() {
        let config = config_with(vec![Program::new("/opt", "chat", false)]);
        let mut starter = AutoStarter::new(MockBackend::default());
        let err = starter.launch_programs(&config, "Gaming").unwrap_err();
        assert_eq!(
            err.error,
            AutostartErrorType::LoadoutNotFound("Gaming".to_string())
        );
        assert!(starter.backend().calls().is_empty());
        assert!(starter.tracker().is_empty());
    }

    #[test]
    fn dangling_current_loadout_fails() {
        let mut config = config_with(vec![]);
        config.current_loadout = "Deleted".to_string();
        let mut starter = AutoStarter::new(MockBackend::default());
        assert!(starter.launch_programs(&config, "").is_err());
        assert!(starter.backend().calls().is_empty());
    }

    #[test]
    fn empty_name_launches_current_loadout() {
        let config = config_with(vec![Program::new("/opt", "chat", false)]);
        let mut starter = AutoStarter::new(MockBackend::default());
        starter.launch_programs(&config, "").unwrap();
        assert_eq!(
            starter.backend().launch_calls(),
            vec![Call::Spawn("chat".to_string())]
        );
        assert_eq!(starter.tracker().len(), 1);
    }

    #[test]
    fn failure_in_the_middle_does_not_stop_later_programs() {
        let config = config_with(vec![
            Program::new("/opt/a", "first", false),
            Program::new("/opt/b", "second", true),
            Program::new("/opt/c", "third", false),
        ]);
        let backend = MockBackend::default().failing_launch("second");
        let mut starter = AutoStarter::new(backend);

        let err = starter.launch_programs(&config, "Stream").unwrap_err();
        assert_eq!(err.error, AutostartErrorType::ProgramsFailed(1));
        assert_eq!(
            starter.backend().launch_calls(),
            vec![
                Call::Spawn("first".to_string()),
                Call::Spawn("second".to_string()),
                Call::Spawn("third".to_string()),
            ]
        );
        assert_eq!(starter.tracker().len(), 2);
    }

    #[test]
    fn running_program_is_not_started_again() {
        let backend = MockBackend::default().running(&["systemd", "CHAT.EXE"]);
        let mut starter = AutoStarter::new(backend);
        let outcome = starter
            .launch_program(&Program::new("C:/Tools", "chat.exe", false))
            .unwrap();
        assert_eq!(outcome, LaunchOutcome::AlreadyRunning);
        assert!(starter.backend().launch_calls().is_empty());
        assert!(starter.tracker().is_empty());
    }

    #[test]
    fn running_check_requires_exact_name() {
        let backend = MockBackend::default().running(&["chat-helper"]);
        let starter = AutoStarter::new(backend);
        assert!(!starter.is_process_running("chat"));
        assert!(starter.is_process_running("/opt/bin/chat-helper"));
    }

    #[test]
    fn enumeration_failure_counts_as_not_running() {
        let backend = MockBackend::default().enumeration_fails();
        let mut starter = AutoStarter::new(backend);
        let outcome = starter
            .launch_program(&Program::new("/opt", "chat", false))
            .unwrap();
        assert_eq!(outcome, LaunchOutcome::Started);
    }

    #[test]
    fn documents_go_to_default_handler_and_are_not_tracked() {
        let mut starter = AutoStarter::new(MockBackend::default());
        let outcome = starter
            .launch_program(&Program::new("/home/me", "rundown.pdf", false))
            .unwrap();
        assert_eq!(outcome, LaunchOutcome::Opened);
        assert_eq!(
            starter.backend().launch_calls(),
            vec![Call::Open("rundown.pdf".to_string())]
        );
        assert!(starter.tracker().is_empty());
    }

    #[test]
    fn failed_open_is_reported() {
        let backend = MockBackend::default().failing_launch("rundown.pdf");
        let mut starter = AutoStarter::new(backend);
        let err = starter
            .launch_program(&Program::new("/home/me", "rundown.pdf", false))
            .unwrap_err();
        assert_eq!(
            err.error,
            AutostartErrorType::FileOpenError("rundown.pdf".to_string())
        );
    }

    #[test]
    fn quit_after_launch_terminates_tracked_processes() {
        let config = config_with(vec![
            Program::new("/opt/a", "first", false),
            Program::new("/opt/b", "second", false),
        ]);
        let backend = MockBackend::default().failing_terminate(101);
        let mut starter = AutoStarter::new(backend);
        starter.launch_programs(&config, "Stream").unwrap();

        let err = starter.quit_programs().unwrap_err();
        assert_eq!(err.error, AutostartErrorType::TerminationsFailed(1));
        assert!(starter.tracker().is_empty());
        let calls = starter.backend().calls();
        assert!(calls.contains(&Call::Release(100)));
        assert!(calls.contains(&Call::Release(101)));
    }
}
