// src/exec/command.rs

//! Command model and exit classification shared by every execution mode.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use crate::errors::{ExecutorError, Result};

/// Programs that only exist to locate and launch another tool.
///
/// When one of these is the first token, errors name the second token so the
/// operator sees `which` or `simctl` instead of `/usr/bin/env`.
const RESOLVER_PREFIXES: &[&str] = &["/usr/bin/xcrun", "xcrun", "/usr/bin/env", "env"];

/// An external program invocation: tokens plus optional environment overrides
/// and an optional file fed to the child's stdin.
///
/// Built once and never mutated afterwards; builder methods consume `self`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    args: Vec<String>,
    env: BTreeMap<String, String>,
    stdin: Option<PathBuf>,
}

impl Command {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            env: BTreeMap::new(),
            stdin: None,
        }
    }

    /// Set (or override) an environment variable for the child.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Feed the contents of `path` to the child's stdin.
    pub fn stdin_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdin = Some(path.into());
        self
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn program(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    pub fn env_overrides(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn stdin(&self) -> Option<&Path> {
        self.stdin.as_deref()
    }

    /// Name of the tool this command really runs, for error messages.
    pub fn display_name(&self) -> String {
        match self.args.as_slice() {
            [] => String::new(),
            [first, second, ..] if RESOLVER_PREFIXES.contains(&first.as_str()) => second.clone(),
            [first, ..] => first.clone(),
        }
    }

    /// Shell-escaped command line, used for logging and verbose echo.
    pub fn escaped(&self) -> String {
        let line = self
            .args
            .iter()
            .map(|a| shell_escape(a))
            .collect::<Vec<_>>()
            .join(" ");
        match &self.stdin {
            Some(path) => format!("{line} < {}", shell_escape(&path.to_string_lossy())),
            None => line,
        }
    }

    /// Build the tokio command. Stdin is the configured file or null; the
    /// caller decides what happens to stdout and stderr.
    pub(crate) fn to_tokio(&self) -> Result<tokio::process::Command> {
        let (program, rest) = self.args.split_first().ok_or_else(|| ExecutorError::Spawn {
            command: String::new(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
        })?;

        let mut cmd = tokio::process::Command::new(program);
        cmd.args(rest).envs(&self.env);

        match &self.stdin {
            Some(path) => {
                let file = std::fs::File::open(path).map_err(|source| ExecutorError::Spawn {
                    command: self.display_name(),
                    source,
                })?;
                cmd.stdin(Stdio::from(file));
            }
            None => {
                cmd.stdin(Stdio::null());
            }
        }

        Ok(cmd)
    }
}

/// How a process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitClassification {
    NormalExit(i32),
    Signalled(i32),
}

impl ExitClassification {
    pub fn is_success(&self) -> bool {
        matches!(self, ExitClassification::NormalExit(0))
    }

    /// Exit code, or the signal number for signalled processes.
    pub fn code(&self) -> i32 {
        match self {
            ExitClassification::NormalExit(code) | ExitClassification::Signalled(code) => *code,
        }
    }
}

impl From<ExitStatus> for ExitClassification {
    fn from(status: ExitStatus) -> Self {
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitClassification::Signalled(signal);
            }
        }
        ExitClassification::NormalExit(status.code().unwrap_or(-1))
    }
}

impl fmt::Display for ExitClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitClassification::NormalExit(code) => write!(f, "exit code {code}"),
            ExitClassification::Signalled(signal) => write!(f, "signal {signal}"),
        }
    }
}

/// Outcome of a finished process. Which buffers are filled depends on the
/// execution mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub status: ExitClassification,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ExecutionResult {
    /// Turn an unsuccessful result into `ProcessFailure`.
    pub fn check(self, command: &Command) -> Result<Self> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(ExecutorError::ProcessFailure {
                command: command.display_name(),
                status: self.status,
                stderr: self.stderr,
            })
        }
    }

    pub fn stdout_trimmed(&self) -> String {
        String::from_utf8_lossy(&self.stdout).trim().to_string()
    }
}

impl From<std::process::Output> for ExecutionResult {
    fn from(output: std::process::Output) -> Self {
        Self {
            status: output.status.into(),
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }
}

/// Quote `arg` for a POSIX shell if it contains anything beyond a safe set.
pub fn shell_escape(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
