// src/exec/backend.rs

//! Pluggable process executor abstraction.
//!
//! Everything that starts an external program goes through a
//! `ProcessExecutor`. This makes it easy to swap in a fake executor in tests
//! while keeping the production implementation in [`system`].
//!
//! - [`RealProcessExecutor`] is the default implementation used by
//!   `tart-executor`. It spawns real processes with `tokio::process`.
//! - Tests can provide their own `ProcessExecutor` that, for example, records
//!   the commands it was given and replays scripted outcomes.
//!
//! [`system`]: super::system
//! [`RealProcessExecutor`]: super::RealProcessExecutor

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;
use crate::exec::{Command, EventStream};

/// Boxed future returned by executor operations.
pub type ExecFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Trait abstracting how external commands are executed.
///
/// Every fallible mode fails with `ExecutorError::ProcessFailure` when the
/// process exits non-zero or is killed by a signal.
pub trait ProcessExecutor: Send + Sync {
    /// Run to completion, discarding stdout.
    fn run<'a>(&'a self, command: &'a Command) -> ExecFuture<'a, ()>;

    /// Run to completion and return stdout with surrounding whitespace
    /// trimmed.
    fn capture<'a>(&'a self, command: &'a Command) -> ExecFuture<'a, String>;

    /// Run to completion while forwarding output to this process's stdout and
    /// stderr as it arrives.
    ///
    /// With `verbose`, the command line is echoed before and the collected
    /// output after.
    fn stream_and_print<'a>(&'a self, command: &'a Command, verbose: bool)
    -> ExecFuture<'a, ()>;

    /// Start the command detached from this process and return immediately.
    fn run_on_background(&self, command: &Command) -> Result<()>;

    /// Start the command and return its output as an [`EventStream`].
    fn stream_events(&self, command: &Command) -> Result<EventStream>;

    /// Resolve an executable name to its path.
    fn which<'a>(&'a self, name: &'a str) -> ExecFuture<'a, String>;

    fn command_exists<'a>(&'a self, name: &'a str) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(async move { self.which(name).await.is_ok() })
    }
}
