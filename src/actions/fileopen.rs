use std::process::{Child, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::{
    autostart_error,
    utils::{
        config::Program,
        errors::{AutostartError, AutostartErrorType},
    },
};

/// How long an opener may run before it counts as having handed the file off.
const OPENER_GRACE: Duration = Duration::from_millis(1500);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, PartialEq, Eq)]
enum OpenerState {
    Exited(ExitStatus),
    /// Still running after the grace period, e.g. an opener that stays in the foreground
    /// until the viewer is closed
    Running,
}

/// Hands a non-executable file to the platform's default handler, with the program directory as
/// working directory. Tries each opener the platform offers and succeeds with the first one that
/// exits successfully or is still running after a short grace period. Never waits for the
/// opened application. The opened application is not tracked.
pub fn open_with_default(program: &Program) -> Result<(), AutostartError> {
    let full_path = program.full_path();
    let mut last_error = String::from("No opener available on this platform");

    for mut command in open::commands(&full_path) {
        if !program.path.is_empty() {
            command.current_dir(&program.path);
        }
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let opener = format!("{:?}", command.get_program());
        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                debug!(%opener, error = %e, "Opener could not be started");
                last_error = format!("{}: {}", opener, e);
                continue;
            }
        };

        match await_opener(child, OPENER_GRACE) {
            Ok(OpenerState::Exited(status)) if status.success() => return Ok(()),
            Ok(OpenerState::Running) => {
                debug!(%opener, "Opener still running, leaving it in the background");
                return Ok(());
            }
            Ok(OpenerState::Exited(status)) => {
                debug!(%opener, %status, "Opener reported failure");
                last_error = format!("{} exited with {}", opener, status);
            }
            Err(e) => {
                debug!(%opener, error = %e, "Could not wait for opener");
                last_error = format!("{}: {}", opener, e);
            }
        }
    }

    Err(autostart_error!(
        AutostartErrorType::FileOpenError(program.executable.clone()),
        last_error
    ))
}

/// Waits at most `grace` for the opener to exit. An opener that keeps running is reaped on a
/// background thread.
fn await_opener(mut child: Child, grace: Duration) -> std::io::Result<OpenerState> {
    let deadline = Instant::now() + grace;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(OpenerState::Exited(status));
        }
        if Instant::now() >= deadline {
            thread::spawn(move || {
                let _ = child.wait();
            });
            return Ok(OpenerState::Running);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::process::Command;

    fn spawn_sh(script: &str) -> Child {
        Command::new("/bin/sh").arg("-c").arg(script).spawn().unwrap()
    }

    #[test]
    fn quick_success_is_reported_as_exit() {
        let state = await_opener(spawn_sh("exit 0"), Duration::from_secs(5)).unwrap();
        assert!(matches!(state, OpenerState::Exited(status) if status.success()));
    }

    #[test]
    fn quick_failure_is_reported_as_exit() {
        let state = await_opener(spawn_sh("exit 3"), Duration::from_secs(5)).unwrap();
        assert!(matches!(state, OpenerState::Exited(status) if status.code() == Some(3)));
    }

    #[test]
    fn foreground_opener_does_not_block() {
        let started = Instant::now();
        let state = await_opener(spawn_sh("sleep 30"), Duration::from_millis(200)).unwrap();
        assert_eq!(state, OpenerState::Running);
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
