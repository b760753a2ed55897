// src/errors.rs

//! Crate-wide error type and exit-code mapping.

use std::fmt;

use thiserror::Error;

use crate::exec::ExitClassification;

/// Step of the `prepare` hook that an external failure happened in.
///
/// Each step maps to its own process exit code so the runner log tells
/// "the clone failed" apart from "the VM never got an address".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrepareStep {
    Clone,
    Start,
    AddressQuery,
}

impl fmt::Display for PrepareStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PrepareStep::Clone => "cloning the VM image",
            PrepareStep::Start => "starting the VM",
            PrepareStep::AddressQuery => "querying the VM address",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("{command} failed with {status}: {}", String::from_utf8_lossy(.stderr).trim())]
    ProcessFailure {
        command: String,
        status: ExitClassification,
        stderr: Vec<u8>,
    },

    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("VM at {host} did not accept SSH connections after {attempts} attempts")]
    ReadinessTimeout { host: String, attempts: u32 },

    #[error("Missing precondition: {0}")]
    MissingPrecondition(String),

    #[error("{step} failed: {source}")]
    Prepare {
        step: PrepareStep,
        #[source]
        source: Box<ExecutorError>,
    },

    #[error("job script failed: {source}")]
    ScriptFailed {
        #[source]
        source: Box<ExecutorError>,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ExecutorError {
    /// Tag an error with the `prepare` step it came from.
    pub fn in_step(self, step: PrepareStep) -> Self {
        ExecutorError::Prepare {
            step,
            source: Box::new(self),
        }
    }

    /// Process exit code reported to the CI runner for this failure.
    ///
    /// `build_failure` / `system_failure` are the codes the runner asked for
    /// through `BUILD_FAILURE_EXIT_CODE` / `SYSTEM_FAILURE_EXIT_CODE`; they
    /// only apply to the `run` hook.
    pub fn exit_code(&self, build_failure: i32, system_failure: i32) -> i32 {
        match self {
            ExecutorError::MissingPrecondition(_) => 2,
            ExecutorError::Prepare { step, .. } => match step {
                PrepareStep::Clone => 3,
                PrepareStep::Start => 4,
                PrepareStep::AddressQuery => 7,
            },
            ExecutorError::ReadinessTimeout { .. } => 6,
            ExecutorError::ScriptFailed { .. } => build_failure,
            ExecutorError::ProcessFailure { .. } | ExecutorError::Spawn { .. } => system_failure,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExecutorError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn failure() -> ExecutorError {
        ExecutorError::ProcessFailure {
            command: "tart".into(),
            status: ExitClassification::NormalExit(1),
            stderr: b"boom\n".to_vec(),
        }
    }

    #[test]
    fn each_prepare_failure_class_has_its_own_code() {
        let codes = [
            ExecutorError::MissingPrecondition("no image".into()).exit_code(1, 2),
            failure().in_step(PrepareStep::Clone).exit_code(1, 2),
            failure().in_step(PrepareStep::Start).exit_code(1, 2),
            failure().in_step(PrepareStep::AddressQuery).exit_code(1, 2),
            ExecutorError::ReadinessTimeout {
                host: "10.0.0.2".into(),
                attempts: 30,
            }
            .exit_code(1, 2),
        ];

        let mut unique = codes.to_vec();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), codes.len(), "codes must be distinct: {codes:?}");
    }

    #[test]
    fn script_failure_uses_runner_build_failure_code() {
        let err = ExecutorError::ScriptFailed {
            source: Box::new(failure()),
        };
        assert_eq!(err.exit_code(42, 43), 42);
        assert_eq!(failure().exit_code(42, 43), 43);
    }

    #[test]
    fn process_failure_message_names_command_and_stderr() {
        let msg = failure().to_string();
        assert!(msg.contains("tart"));
        assert!(msg.contains("exit code 1"));
        assert!(msg.contains("boom"));
    }
}
