// src/hooks/mod.rs

//! Lifecycle hooks invoked by the CI runner, plus a few maintenance commands.
//!
//! Each hook is an async function over a [`HookContext`], so tests can drive
//! it with a fake `ProcessExecutor` and a hand-built job environment.

pub mod check;
pub mod cleanup;
pub mod maintenance;
pub mod prepare;
pub mod prepare_ssh;
pub mod run;

pub use check::check;
pub use cleanup::cleanup;
pub use maintenance::{prune, pull};
pub use prepare::{PreparedVm, prepare};
pub use prepare_ssh::prepare_ssh;
pub use run::run_script;

use crate::config::ConfigFile;
use crate::env::JobEnvironment;
use crate::exec::ProcessExecutor;
use crate::tart::{ReadinessPolicy, SshClient, Tart};

/// Everything a hook needs: how to start processes, the executor config and
/// the job it runs for.
pub struct HookContext<'a, E: ProcessExecutor + ?Sized> {
    pub executor: &'a E,
    pub config: &'a ConfigFile,
    pub job: &'a JobEnvironment,
}

impl<'a, E: ProcessExecutor + ?Sized> HookContext<'a, E> {
    pub fn new(executor: &'a E, config: &'a ConfigFile, job: &'a JobEnvironment) -> Self {
        Self {
            executor,
            config,
            job,
        }
    }

    pub fn tart(&self) -> Tart<'a, E> {
        Tart::new(self.executor).with_binary(self.config.tart.binary.clone())
    }

    pub fn ssh(&self) -> SshClient<'a, E> {
        SshClient::from_config(self.executor, &self.config.ssh)
    }

    pub fn readiness_policy(&self) -> ReadinessPolicy {
        ReadinessPolicy::from(&self.config.readiness)
    }
}
