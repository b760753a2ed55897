use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tart_executor::errors::{ExecutorError, Result};
use tart_executor::exec::{
    Command, EventStream, ExecFuture, ExecutionResult, ExitClassification, OutputEvent,
    ProcessExecutor,
};

/// Scripted outcome of one fake process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeResponse {
    Success { stdout: String },
    Exit { code: i32, stderr: String },
    Signalled(i32),
}

impl FakeResponse {
    pub fn ok() -> Self {
        FakeResponse::Success {
            stdout: String::new(),
        }
    }

    pub fn stdout(stdout: &str) -> Self {
        FakeResponse::Success {
            stdout: stdout.to_string(),
        }
    }

    pub fn fail(code: i32, stderr: &str) -> Self {
        FakeResponse::Exit {
            code,
            stderr: stderr.to_string(),
        }
    }

    fn to_result(&self) -> ExecutionResult {
        match self {
            FakeResponse::Success { stdout } => ExecutionResult {
                status: ExitClassification::NormalExit(0),
                stdout: stdout.clone().into_bytes(),
                stderr: vec![],
            },
            FakeResponse::Exit { code, stderr } => ExecutionResult {
                status: ExitClassification::NormalExit(*code),
                stdout: vec![],
                stderr: stderr.clone().into_bytes(),
            },
            FakeResponse::Signalled(signal) => ExecutionResult {
                status: ExitClassification::Signalled(*signal),
                stdout: vec![],
                stderr: vec![],
            },
        }
    }
}

/// How the code under test asked for a command to be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Run,
    Capture,
    StreamAndPrint,
    Background,
    Events,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub mode: Mode,
    pub command: Command,
}

struct Rule {
    prefix: Vec<String>,
    responses: VecDeque<FakeResponse>,
}

/// A fake executor that:
/// - records every command it was asked to run, in order
/// - answers with scripted responses chosen by argument prefix
///
/// Each rule holds a queue of responses; the last one repeats forever. Commands
/// no rule matches succeed with empty output.
#[derive(Clone, Default)]
pub struct FakeExecutor {
    rules: Arc<Mutex<Vec<Rule>>>,
    invocations: Arc<Mutex<Vec<Invocation>>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands starting with `prefix` with `response`.
    pub fn respond(self, prefix: &[&str], response: FakeResponse) -> Self {
        self.respond_sequence(prefix, vec![response])
    }

    /// Answer successive matching commands with `responses` in order.
    pub fn respond_sequence(self, prefix: &[&str], responses: Vec<FakeResponse>) -> Self {
        assert!(!responses.is_empty(), "need at least one response");
        self.rules.lock().unwrap().push(Rule {
            prefix: prefix.iter().map(|s| s.to_string()).collect(),
            responses: responses.into(),
        });
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    /// Argument vectors of every invocation, in order.
    pub fn command_lines(&self) -> Vec<Vec<String>> {
        self.invocations()
            .into_iter()
            .map(|i| i.command.args().to_vec())
            .collect()
    }

    /// Number of invocations whose arguments start with `prefix`.
    pub fn count(&self, prefix: &[&str]) -> usize {
        self.invocations()
            .iter()
            .filter(|i| starts_with(i.command.args(), prefix))
            .count()
    }

    fn execute(&self, mode: Mode, command: &Command) -> Result<ExecutionResult> {
        self.invocations.lock().unwrap().push(Invocation {
            mode,
            command: command.clone(),
        });

        let response = {
            let mut rules = self.rules.lock().unwrap();
            rules
                .iter_mut()
                .find(|r| starts_with(command.args(), &r.prefix))
                .map(|r| {
                    if r.responses.len() > 1 {
                        r.responses.pop_front().unwrap()
                    } else {
                        r.responses[0].clone()
                    }
                })
                .unwrap_or_else(FakeResponse::ok)
        };

        response.to_result().check(command)
    }
}

fn starts_with<S: AsRef<str>>(args: &[String], prefix: &[S]) -> bool {
    args.len() >= prefix.len() && args.iter().zip(prefix).all(|(a, p)| a == p.as_ref())
}

impl ProcessExecutor for FakeExecutor {
    fn run<'a>(&'a self, command: &'a Command) -> ExecFuture<'a, ()> {
        Box::pin(async move { self.execute(Mode::Run, command).map(|_| ()) })
    }

    fn capture<'a>(&'a self, command: &'a Command) -> ExecFuture<'a, String> {
        Box::pin(async move {
            self.execute(Mode::Capture, command)
                .map(|r| r.stdout_trimmed())
        })
    }

    fn stream_and_print<'a>(
        &'a self,
        command: &'a Command,
        _verbose: bool,
    ) -> ExecFuture<'a, ()> {
        Box::pin(async move { self.execute(Mode::StreamAndPrint, command).map(|_| ()) })
    }

    fn run_on_background(&self, command: &Command) -> Result<()> {
        self.execute(Mode::Background, command).map(|_| ())
    }

    fn stream_events(&self, command: &Command) -> Result<EventStream> {
        let (events, outcome) = match self.execute(Mode::Events, command) {
            Ok(result) => (vec![OutputEvent::stdout(result.stdout)], Ok(())),
            Err(err) => {
                let stderr = match &err {
                    ExecutorError::ProcessFailure { stderr, .. } => stderr.clone(),
                    _ => vec![],
                };
                (vec![OutputEvent::stderr(stderr)], Err(err))
            }
        };
        Ok(EventStream::scripted(events, outcome))
    }

    fn which<'a>(&'a self, name: &'a str) -> ExecFuture<'a, String> {
        Box::pin(async move {
            let command = Command::new(["/usr/bin/env", "which", name]);
            self.capture(&command).await
        })
    }
}
