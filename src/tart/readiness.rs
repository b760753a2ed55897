// src/tart/readiness.rs

//! Bounded polling loop that waits for a started VM to accept SSH.
//!
//! A VM reports an address before its SSH daemon is up, so after `tart ip`
//! succeeds the handshake is retried until it works or the attempt budget is
//! spent. The address is never re-queried here.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::ReadinessSection;
use crate::errors::{ExecutorError, Result};
use crate::tart::Handshake;

/// Attempt budget and retry interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_secs(1),
        }
    }
}

impl From<&ReadinessSection> for ReadinessPolicy {
    fn from(cfg: &ReadinessSection) -> Self {
        Self {
            max_attempts: cfg.attempts,
            interval: cfg.interval(),
        }
    }
}

/// State of one readiness loop.
///
/// `Polling` is initial and carries the number of attempts made so far;
/// `Ready` and `Exhausted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessState {
    Polling { attempts: u32 },
    Ready { attempts: u32 },
    Exhausted { attempts: u32 },
}

impl ReadinessState {
    pub fn initial() -> Self {
        ReadinessState::Polling { attempts: 0 }
    }

    /// Record the outcome of one more handshake. Terminal states stay put.
    pub fn after_attempt(self, succeeded: bool, max_attempts: u32) -> Self {
        match self {
            ReadinessState::Polling { attempts } => {
                let attempts = attempts + 1;
                if succeeded {
                    ReadinessState::Ready { attempts }
                } else if attempts >= max_attempts {
                    ReadinessState::Exhausted { attempts }
                } else {
                    ReadinessState::Polling { attempts }
                }
            }
            terminal => terminal,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReadinessState::Polling { .. })
    }
}

/// Handshake with `host` until it succeeds or `policy.max_attempts` attempts
/// have failed.
///
/// The first attempt happens immediately; `policy.interval` is slept before
/// every retry. So K failures followed by a success cost K+1 attempts and K
/// sleeps, and exhaustion is exactly `max_attempts` attempts.
///
/// Returns the number of attempts it took.
pub async fn wait_until_ready<H>(handshake: &H, host: &str, policy: &ReadinessPolicy) -> Result<u32>
where
    H: Handshake + ?Sized,
{
    let mut state = ReadinessState::initial();

    loop {
        match state {
            ReadinessState::Polling { attempts } => {
                if attempts > 0 {
                    sleep(policy.interval).await;
                }
                let ok = handshake.attempt(host).await;
                debug!(host, attempt = attempts + 1, ok, "readiness handshake");
                state = state.after_attempt(ok, policy.max_attempts);
            }
            ReadinessState::Ready { attempts } => {
                info!(host, attempts, "VM accepts SSH connections");
                return Ok(attempts);
            }
            ReadinessState::Exhausted { attempts } => {
                warn!(host, attempts, "VM never accepted SSH connections");
                return Err(ExecutorError::ReadinessTimeout {
                    host: host.to_string(),
                    attempts,
                });
            }
        }
    }
}
