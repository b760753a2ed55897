// src/exec/stream.rs

//! Lazy, cancellable sequence of output events from running processes.

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::errors::{ExecutorError, Result};
use crate::exec::ExitClassification;

const READ_CHUNK: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputChannel {
    Stdout,
    Stderr,
}

/// One chunk of output, tagged with the channel it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEvent {
    pub channel: OutputChannel,
    pub bytes: Vec<u8>,
}

impl OutputEvent {
    pub fn stdout(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            channel: OutputChannel::Stdout,
            bytes: bytes.into(),
        }
    }

    pub fn stderr(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            channel: OutputChannel::Stderr,
            bytes: bytes.into(),
        }
    }
}

/// Output of one or more supervised processes, in arrival order.
///
/// - [`EventStream::next`] yields events until every pipe is closed, then
///   waits for the processes and yields a final `Err(ProcessFailure)` if any
///   of them failed, or `None` on success.
/// - Once `None` or an error has been returned the stream stays exhausted.
/// - Dropping the stream before it is exhausted sends SIGKILL to every
///   process it supervises.
pub struct EventStream {
    events: mpsc::Receiver<OutputEvent>,
    children: Vec<(String, Child)>,
    scripted_outcome: Option<Result<()>>,
    stderr: Vec<u8>,
    finished: bool,
}

impl EventStream {
    pub(crate) fn supervise(
        children: Vec<(String, Child)>,
        events: mpsc::Receiver<OutputEvent>,
    ) -> Self {
        Self {
            events,
            children,
            scripted_outcome: None,
            stderr: Vec::new(),
            finished: false,
        }
    }

    /// A stream with no process behind it that replays `events` and then ends
    /// with `outcome`. Used by fake executors.
    pub fn scripted(events: Vec<OutputEvent>, outcome: Result<()>) -> Self {
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            // Capacity covers every event, so this cannot fail.
            let _ = tx.try_send(event);
        }
        Self {
            events: rx,
            children: Vec::new(),
            scripted_outcome: Some(outcome),
            stderr: Vec::new(),
            finished: false,
        }
    }

    pub async fn next(&mut self) -> Option<Result<OutputEvent>> {
        if self.finished {
            return None;
        }

        if let Some(event) = self.events.recv().await {
            if event.channel == OutputChannel::Stderr {
                self.stderr.extend_from_slice(&event.bytes);
            }
            return Some(Ok(event));
        }

        let outcome = self.wait_all().await;
        self.finished = true;
        outcome.err().map(Err)
    }

    /// Standard error seen so far.
    pub fn stderr(&self) -> &[u8] {
        &self.stderr
    }

    async fn wait_all(&mut self) -> Result<()> {
        if let Some(outcome) = self.scripted_outcome.take() {
            return outcome;
        }

        let mut failure = None;
        for (name, child) in self.children.iter_mut() {
            let status = ExitClassification::from(child.wait().await?);
            debug!(command = %name, %status, "streamed process exited");

            if failure.is_none() && !status.is_success() {
                failure = Some(ExecutorError::ProcessFailure {
                    command: name.clone(),
                    status,
                    stderr: self.stderr.clone(),
                });
            }
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        for (name, child) in self.children.iter_mut() {
            match child.start_kill() {
                Ok(()) => debug!(command = %name, "killed process of abandoned stream"),
                Err(e) => debug!(command = %name, error = %e, "process already gone"),
            }
        }
    }
}

/// Forward everything `reader` produces into `tx` as `channel` events.
///
/// Ends at EOF or as soon as the receiving side is gone.
pub(crate) fn spawn_reader<R>(mut reader: R, channel: OutputChannel, tx: mpsc::Sender<OutputEvent>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = vec![0u8; READ_CHUNK];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => {
                    let event = OutputEvent {
                        channel,
                        bytes: buf[..n].to_vec(),
                    };
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(?channel, error = %e, "failed reading process output");
                    break;
                }
            }
        }
    });
}
