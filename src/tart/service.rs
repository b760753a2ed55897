// src/tart/service.rs

//! `tart` invocations: one method per VM manager subcommand.

use tracing::info;

use crate::errors::Result;
use crate::exec::{Command, ProcessExecutor};
use crate::tart::RunOptions;

/// Thin wrapper that turns VM lifecycle intents into `tart` commands.
///
/// Failures are passed through unchanged as `ProcessFailure`.
pub struct Tart<'a, E: ProcessExecutor + ?Sized> {
    executor: &'a E,
    binary: String,
}

impl<'a, E: ProcessExecutor + ?Sized> Tart<'a, E> {
    pub fn new(executor: &'a E) -> Self {
        Self {
            executor,
            binary: "tart".to_string(),
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    fn command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Command::new(
            std::iter::once(self.binary.clone()).chain(args.into_iter().map(Into::into)),
        )
    }

    /// `tart clone <source> <new_name> [--insecure]`
    pub async fn clone_vm(&self, source: &str, new_name: &str, insecure: bool) -> Result<()> {
        let mut args = vec!["clone", source, new_name];
        if insecure {
            args.push("--insecure");
        }
        info!(source, vm = new_name, "cloning VM");
        self.executor.run(&self.command(args)).await
    }

    /// `tart run <name> ...` detached from this process.
    ///
    /// Returns once the VM process has been started, not when the VM is
    /// reachable.
    pub fn start_in_background(&self, name: &str, options: &RunOptions) -> Result<()> {
        let args = ["run".to_string(), name.to_string()]
            .into_iter()
            .chain(options.to_args());
        info!(vm = name, "starting VM in background");
        self.executor.run_on_background(&self.command(args))
    }

    /// `tart ip --wait <secs> <name>`; returns the trimmed address.
    pub async fn ip(&self, name: &str, wait_secs: u64) -> Result<String> {
        let wait = wait_secs.to_string();
        let cmd = self.command(["ip", "--wait", wait.as_str(), name]);
        let address = self.executor.capture(&cmd).await?;
        info!(vm = name, %address, "VM address resolved");
        Ok(address)
    }

    /// `tart stop -t <secs> <name>`
    pub async fn stop(&self, name: &str, timeout_secs: u64) -> Result<()> {
        let timeout = timeout_secs.to_string();
        self.executor
            .run(&self.command(["stop", "-t", timeout.as_str(), name]))
            .await
    }

    /// `tart delete <name>`
    pub async fn delete(&self, name: &str) -> Result<()> {
        self.executor.run(&self.command(["delete", name])).await
    }

    /// `tart pull <name> [--insecure]`
    pub async fn pull(&self, name: &str, insecure: bool) -> Result<()> {
        let mut args = vec!["pull", name];
        if insecure {
            args.push("--insecure");
        }
        self.executor.run(&self.command(args)).await
    }

    /// `tart prune --older-than <days> [--cache-budget <n>]`
    pub async fn prune(&self, older_than_days: u32, cache_budget: Option<u64>) -> Result<()> {
        let mut args = vec![
            "prune".to_string(),
            "--older-than".to_string(),
            older_than_days.to_string(),
        ];
        if let Some(budget) = cache_budget {
            args.push("--cache-budget".to_string());
            args.push(budget.to_string());
        }
        self.executor.run(&self.command(args)).await
    }
}
