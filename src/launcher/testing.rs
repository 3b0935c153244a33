use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use super::backend::ProcessBackend;
use crate::autostart_error;
use crate::utils::{
    config::Program,
    errors::{AutostartError, AutostartErrorType},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Enumerate,
    Open(String),
    Spawn(String),
    Terminate(u32),
    Release(u32),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockHandle {
    pub pid: u32,
    pub executable: String,
}

/// Records every backend call. Spawned pids count up from 100.
#[derive(Debug, Default)]
pub struct MockBackend {
    running: Vec<String>,
    enumeration_fails: bool,
    failing_launch: HashSet<String>,
    failing_terminate: HashSet<u32>,
    next_pid: Cell<u32>,
    calls: RefCell<Vec<Call>>,
}

impl MockBackend {
    pub fn running(mut self, names: &[&str]) -> Self {
        self.running = names.iter().map(|n| n.to_string()).collect();
        self
    }
    pub fn enumeration_fails(mut self) -> Self {
        self.enumeration_fails = true;
        self
    }
    pub fn failing_launch(mut self, executable: &str) -> Self {
        self.failing_launch.insert(executable.to_string());
        self
    }
    pub fn failing_terminate(mut self, pid: u32) -> Self {
        self.failing_terminate.insert(pid);
        self
    }
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
    pub fn launch_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Open(_) | Call::Spawn(_)))
            .collect()
    }
    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl ProcessBackend for MockBackend {
    type Handle = MockHandle;

    fn running_executables(&self) -> Result<Vec<String>, AutostartError> {
        self.record(Call::Enumerate);
        if self.enumeration_fails {
            return Err(autostart_error!(
                AutostartErrorType::ProcessEnumerationError,
                "mock"
            ));
        }
        Ok(self.running.clone())
    }

    fn open_with_default(&self, program: &Program) -> Result<(), AutostartError> {
        self.record(Call::Open(program.executable.clone()));
        if self.failing_launch.contains(&program.executable) {
            return Err(autostart_error!(
                AutostartErrorType::FileOpenError(program.executable.clone()),
                "mock"
            ));
        }
        Ok(())
    }

    fn spawn(&self, program: &Program) -> Result<MockHandle, AutostartError> {
        self.record(Call::Spawn(program.executable.clone()));
        if self.failing_launch.contains(&program.executable) {
            return Err(autostart_error!(
                AutostartErrorType::ProcessLaunchError(program.executable.clone()),
                "mock"
            ));
        }
        let pid = 100 + self.next_pid.get();
        self.next_pid.set(self.next_pid.get() + 1);
        Ok(MockHandle {
            pid,
            executable: program.executable.clone(),
        })
    }

    fn terminate(&self, handle: &mut MockHandle) -> Result<(), AutostartError> {
        self.record(Call::Terminate(handle.pid));
        if self.failing_terminate.contains(&handle.pid) {
            return Err(autostart_error!(
                AutostartErrorType::ProcessTerminateError(handle.pid),
                "mock"
            ));
        }
        Ok(())
    }

    fn release(&self, handle: MockHandle) {
        self.record(Call::Release(handle.pid));
    }
}
