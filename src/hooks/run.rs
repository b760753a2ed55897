// src/hooks/run.rs

use std::path::Path;

use tracing::info;

use crate::errors::{ExecutorError, Result};
use crate::exec::{ExitClassification, ProcessExecutor};
use crate::hooks::HookContext;

/// `ssh` exits with 255 when it could not connect or authenticate.
const SSH_CONNECTION_FAILURE: i32 = 255;

/// `run` hook: execute one stage script of the job inside its VM.
///
/// A script that fails comes back as `ScriptFailed` (a build failure for the
/// runner). Not finding the VM or not reaching it over SSH stays an
/// infrastructure error.
pub async fn run_script<E>(ctx: &HookContext<'_, E>, script: &Path, stage: Option<&str>) -> Result<()>
where
    E: ProcessExecutor + ?Sized,
{
    let name = ctx.job.vm_identity();
    let address = ctx.tart().ip(&name, 0).await?;

    info!(vm = %name, %address, stage = stage.unwrap_or("-"), "running job script");

    match ctx.ssh().run_script(&address, script).await {
        Ok(()) => Ok(()),
        Err(
            err @ ExecutorError::ProcessFailure {
                status: ExitClassification::NormalExit(SSH_CONNECTION_FAILURE),
                ..
            },
        ) => Err(err),
        Err(err @ ExecutorError::ProcessFailure { .. }) => Err(ExecutorError::ScriptFailed {
            source: Box::new(err),
        }),
        Err(err) => Err(err),
    }
}
