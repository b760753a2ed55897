// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is the single place where external programs are started,
//! using `tokio::process::Command`, and where their outcome is normalised.
//!
//! - [`command`] holds the `Command` model and exit classification.
//! - [`backend`] provides the `ProcessExecutor` trait the rest of the crate
//!   depends on, so tests can replace it with a fake implementation.
//! - [`system`] is the real `RealProcessExecutor`.
//! - [`stream`] contains `EventStream`, the cancellable output sequence used
//!   for live streaming.

pub mod backend;
pub mod command;
pub mod stream;
pub mod system;

pub use backend::{ExecFuture, ProcessExecutor};
pub use command::{Command, ExecutionResult, ExitClassification, shell_escape};
pub use stream::{EventStream, OutputChannel, OutputEvent};
pub use system::RealProcessExecutor;
