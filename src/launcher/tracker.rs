use tracing::{debug, warn};

use super::backend::ProcessBackend;
use crate::autostart_error;
use crate::utils::errors::{AutostartError, AutostartErrorType};

/// Processes started during this session. Each handle is owned here from the moment its launch
/// succeeds until it is terminated or released.
#[derive(Debug)]
pub struct ProcessTracker<H> {
    processes: Vec<H>,
}

impl<H> Default for ProcessTracker<H> {
    fn default() -> Self {
        Self {
            processes: Vec::new(),
        }
    }
}

impl<H: std::fmt::Debug> ProcessTracker<H> {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn track(&mut self, handle: H) {
        self.processes.push(handle);
    }
    pub fn len(&self) -> usize {
        self.processes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &H> {
        self.processes.iter()
    }

    /// Terminates every tracked process. A failure does not stop the remaining attempts, and the
    /// list is empty afterwards regardless of the outcome.
    pub fn quit_programs<B>(&mut self, backend: &B) -> Result<(), AutostartError>
    where
        B: ProcessBackend<Handle = H>,
    {
        let mut failed = 0;
        for handle in self.processes.drain(..) {
            if Self::quit_process(backend, handle).is_err() {
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(autostart_error!(
                AutostartErrorType::TerminationsFailed(failed),
                ""
            ));
        }
        Ok(())
    }

    /// Forcefully terminates one process. The handle is released whether or not that worked.
    pub fn quit_process<B>(backend: &B, mut handle: H) -> Result<(), AutostartError>
    where
        B: ProcessBackend<Handle = H>,
    {
        let result = backend.terminate(&mut handle);
        match &result {
            Ok(()) => debug!(?handle, "Terminated process"),
            Err(e) => warn!(?handle, error = %e, "Failed to terminate process"),
        }
        backend.release(handle);
        result
    }

    /// Stops tracking every process without terminating any of them.
    pub fn clear_processes<B>(&mut self, backend: &B)
    where
        B: ProcessBackend<Handle = H>,
    {
        for handle in self.processes.drain(..) {
            backend.release(handle);
        }
    }
}
