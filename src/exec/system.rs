// src/exec/system.rs

//! Production executor backed by `tokio::process`.

use std::process::Stdio;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::{ExecutorError, Result};
use crate::exec::backend::{ExecFuture, ProcessExecutor};
use crate::exec::stream::{OutputChannel, spawn_reader};
use crate::exec::{Command, EventStream, ExecutionResult};

const EVENT_BUFFER: usize = 64;

/// Real executor used in production.
///
/// Stateless; construct one in `main` and pass it down by reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealProcessExecutor;

impl RealProcessExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Stream the output of `second` while `first`'s stdout is piped into its
    /// stdin. `first`'s stderr is part of the stream as well.
    ///
    /// Failure is reported for `first` if it failed, otherwise for `second`.
    /// Dropping the stream early kills both processes.
    pub fn stream_piped_events(&self, first: &Command, second: &Command) -> Result<EventStream> {
        debug!(
            command = %format!("{} | {}", first.escaped(), second.escaped()),
            "streaming piped processes"
        );

        let mut first_cmd = first.to_tokio()?;
        first_cmd
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        let mut first_child = first_cmd.spawn().map_err(|source| spawn_error(first, source))?;

        let pipe: Stdio = first_child
            .stdout
            .take()
            .ok_or_else(|| missing_pipe(first, "stdout"))?
            .try_into()?;

        let mut second_cmd = second.to_tokio()?;
        second_cmd
            .stdin(pipe)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        let mut second_child = second_cmd
            .spawn()
            .map_err(|source| spawn_error(second, source))?;

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        if let Some(err) = first_child.stderr.take() {
            spawn_reader(err, OutputChannel::Stderr, tx.clone());
        }
        attach_readers(&mut second_child, tx);

        Ok(EventStream::supervise(
            vec![
                (first.display_name(), first_child),
                (second.display_name(), second_child),
            ],
            rx,
        ))
    }

    async fn collect(&self, command: &Command, capture_stdout: bool) -> Result<ExecutionResult> {
        debug!(command = %command.escaped(), "running process");

        let mut cmd = command.to_tokio()?;
        cmd.stdout(if capture_stdout {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stderr(Stdio::piped())
        .kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| spawn_error(command, source))?;
        let result = ExecutionResult::from(child.wait_with_output().await?);

        debug!(
            command = %command.display_name(),
            status = %result.status,
            stdout = %String::from_utf8_lossy(&result.stdout).trim(),
            "process exited"
        );

        result.check(command)
    }
}

impl ProcessExecutor for RealProcessExecutor {
    fn run<'a>(&'a self, command: &'a Command) -> ExecFuture<'a, ()> {
        Box::pin(async move {
            self.collect(command, false).await?;
            Ok(())
        })
    }

    fn capture<'a>(&'a self, command: &'a Command) -> ExecFuture<'a, String> {
        Box::pin(async move {
            let result = self.collect(command, true).await?;
            Ok(result.stdout_trimmed())
        })
    }

    fn stream_and_print<'a>(
        &'a self,
        command: &'a Command,
        verbose: bool,
    ) -> ExecFuture<'a, ()> {
        Box::pin(async move {
            let mut stdout = tokio::io::stdout();
            let mut stderr = tokio::io::stderr();

            if verbose {
                write_flush(&mut stdout, format!("{}\n", command.escaped()).as_bytes()).await?;
            }

            let mut events = self.stream_events(command)?;
            let mut transcript = Vec::new();
            let mut outcome = Ok(());

            while let Some(event) = events.next().await {
                let event = match event {
                    Ok(event) => event,
                    Err(err) => {
                        outcome = Err(err);
                        break;
                    }
                };
                match event.channel {
                    OutputChannel::Stdout => write_flush(&mut stdout, &event.bytes).await?,
                    OutputChannel::Stderr => write_flush(&mut stderr, &event.bytes).await?,
                }
                if verbose {
                    transcript.extend_from_slice(&event.bytes);
                }
            }

            if verbose && !transcript.is_empty() {
                write_flush(&mut stdout, &transcript).await?;
            }

            outcome
        })
    }

    fn run_on_background(&self, command: &Command) -> Result<()> {
        let mut cmd = command.to_tokio()?;
        cmd.stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(false);

        // A fresh process group keeps the child out of signals aimed at ours
        // (runner timeouts, Ctrl-C on the terminal).
        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd.spawn().map_err(|source| spawn_error(command, source))?;
        info!(
            command = %command.escaped(),
            pid = ?child.id(),
            "started background process"
        );

        Ok(())
    }

    fn stream_events(&self, command: &Command) -> Result<EventStream> {
        debug!(command = %command.escaped(), "streaming process");

        let mut cmd = command.to_tokio()?;
        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| spawn_error(command, source))?;
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        attach_readers(&mut child, tx);

        Ok(EventStream::supervise(
            vec![(command.display_name(), child)],
            rx,
        ))
    }

    fn which<'a>(&'a self, name: &'a str) -> ExecFuture<'a, String> {
        Box::pin(async move {
            let command = Command::new(["/usr/bin/env", "which", name]);
            self.capture(&command).await
        })
    }
}

fn attach_readers(child: &mut tokio::process::Child, tx: mpsc::Sender<crate::exec::OutputEvent>) {
    if let Some(out) = child.stdout.take() {
        spawn_reader(out, OutputChannel::Stdout, tx.clone());
    }
    if let Some(err) = child.stderr.take() {
        spawn_reader(err, OutputChannel::Stderr, tx);
    }
}

async fn write_flush<W: AsyncWrite + Unpin>(writer: &mut W, bytes: &[u8]) -> Result<()> {
    writer.write_all(bytes).await?;
    writer.flush().await?;
    Ok(())
}

fn spawn_error(command: &Command, source: std::io::Error) -> ExecutorError {
    ExecutorError::Spawn {
        command: command.display_name(),
        source,
    }
}

fn missing_pipe(command: &Command, pipe: &str) -> ExecutorError {
    ExecutorError::Spawn {
        command: command.display_name(),
        source: std::io::Error::other(format!("{pipe} pipe was not captured")),
    }
}
