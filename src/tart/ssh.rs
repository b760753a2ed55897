// src/tart/ssh.rs

//! `ssh` client used for the readiness handshake and for running job scripts.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Duration;

use tracing::debug;

use crate::config::SshSection;
use crate::errors::Result;
use crate::exec::{Command, ProcessExecutor};

/// Something that can tell whether a host accepts remote-shell connections.
pub trait Handshake: Send + Sync {
    fn attempt<'a>(&'a self, host: &'a str) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>>;
}

/// Builds and runs `ssh` commands against a VM.
///
/// Host keys are never checked or recorded: every job gets a freshly cloned
/// VM whose key the host has not seen before. Password prompts are disabled
/// so a guest without our key fails the attempt instead of blocking on a tty.
pub struct SshClient<'a, E: ProcessExecutor + ?Sized> {
    executor: &'a E,
    binary: String,
    user: String,
    identity: Option<PathBuf>,
    connect_timeout: Duration,
    remote_shell: String,
}

impl<'a, E: ProcessExecutor + ?Sized> SshClient<'a, E> {
    pub fn new(executor: &'a E) -> Self {
        Self::from_config(executor, &SshSection::default())
    }

    pub fn from_config(executor: &'a E, cfg: &SshSection) -> Self {
        Self {
            executor,
            binary: cfg.binary.clone(),
            user: cfg.user.clone(),
            identity: cfg.identity.clone(),
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            remote_shell: cfg.remote_shell.clone(),
        }
    }

    fn command(&self, host: &str, remote: &str) -> Command {
        let mut args = vec![
            self.binary.clone(),
            "-o".to_string(),
            "StrictHostKeyChecking=no".to_string(),
            "-o".to_string(),
            "UserKnownHostsFile=/dev/null".to_string(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout.as_secs()),
        ];
        if let Some(identity) = &self.identity {
            args.push("-i".to_string());
            args.push(identity.display().to_string());
        }
        args.push(format!("{}@{}", self.user, host));
        args.push(remote.to_string());
        Command::new(args)
    }

    /// Connect, authenticate and run `true`.
    pub fn handshake_command(&self, host: &str) -> Command {
        self.command(host, "true")
    }

    /// Run the remote shell with `script` as its stdin.
    pub fn script_command(&self, host: &str, script: &Path) -> Command {
        self.command(host, &self.remote_shell).stdin_file(script)
    }

    pub async fn handshake(&self, host: &str) -> bool {
        match self.executor.run(&self.handshake_command(host)).await {
            Ok(()) => true,
            Err(e) => {
                debug!(host, error = %e, "ssh handshake failed");
                false
            }
        }
    }

    /// Execute a job script on `host`, streaming its output.
    pub async fn run_script(&self, host: &str, script: &Path) -> Result<()> {
        self.executor
            .stream_and_print(&self.script_command(host, script), false)
            .await
    }
}

impl<E: ProcessExecutor + ?Sized> Handshake for SshClient<'_, E> {
    fn attempt<'a>(&'a self, host: &'a str) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(self.handshake(host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::RealProcessExecutor;

    #[test]
    fn handshake_command_disables_host_key_checks() {
        let executor = RealProcessExecutor::new();
        let ssh = SshClient::new(&executor);
        let cmd = ssh.handshake_command("192.168.64.10");

        assert_eq!(
            cmd.args(),
            [
                "ssh",
                "-o",
                "StrictHostKeyChecking=no",
                "-o",
                "UserKnownHostsFile=/dev/null",
                "-o",
                "BatchMode=yes",
                "-o",
                "ConnectTimeout=5",
                "admin@192.168.64.10",
                "true",
            ]
        );
        assert!(cmd.stdin().is_none());
    }

    #[test]
    fn script_command_feeds_script_to_remote_shell() {
        let executor = RealProcessExecutor::new();
        let cfg = SshSection {
            identity: Some(PathBuf::from("/keys/id_ed25519")),
            user: "ci".into(),
            ..SshSection::default()
        };
        let ssh = SshClient::from_config(&executor, &cfg);
        let cmd = ssh.script_command("10.0.0.2", Path::new("/tmp/script.sh"));

        let args = cmd.args();
        assert_eq!(args[args.len() - 4..], ["-i", "/keys/id_ed25519", "ci@10.0.0.2", "bash"]);
        assert_eq!(cmd.stdin(), Some(Path::new("/tmp/script.sh")));
        assert!(args.windows(2).any(|w| w == ["-o", "BatchMode=yes"]));
    }
}
