// src/tart/mod.rs

//! VM lifecycle orchestration on top of the process executor.
//!
//! - [`args`] renders typed `tart run` options into arguments.
//! - [`service`] issues the fixed vocabulary of `tart` subcommands.
//! - [`ssh`] talks to the guest: readiness handshakes and job scripts.
//! - [`readiness`] is the bounded polling loop run after a VM starts.

pub mod args;
pub mod readiness;
pub mod service;
pub mod ssh;

pub use args::{DirMount, DiskMount, NetworkMode, RunOptions};
pub use readiness::{ReadinessPolicy, ReadinessState, wait_until_ready};
pub use service::Tart;
pub use ssh::{Handshake, SshClient};
