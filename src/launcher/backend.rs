use std::fmt::Debug;

use crate::utils::{config::Program, errors::AutostartError};

/// The OS calls the launcher and tracker are built on.
///
/// Every call blocks the calling thread and is attempted exactly once.
pub trait ProcessBackend {
    /// Owned reference to a started process. Dropping it must not terminate the process.
    type Handle: Debug;

    /// Base file names of all running processes, as reported by the OS.
    fn running_executables(&self) -> Result<Vec<String>, AutostartError>;

    /// Passes a non-executable file to the OS default handler.
    fn open_with_default(&self, program: &Program) -> Result<(), AutostartError>;

    /// Creates a native process for `program`.
    fn spawn(&self, program: &Program) -> Result<Self::Handle, AutostartError>;

    /// Forcefully terminates the process. No graceful shutdown is attempted.
    fn terminate(&self, handle: &mut Self::Handle) -> Result<(), AutostartError>;

    /// Gives up the OS reference without terminating the process.
    fn release(&self, handle: Self::Handle);
}
