// src/hooks/check.rs

use tracing::{debug, info};

use crate::errors::{ExecutorError, Result};
use crate::exec::ProcessExecutor;
use crate::hooks::HookContext;

/// Verify the host has every tool the hooks shell out to.
pub async fn check<E>(ctx: &HookContext<'_, E>) -> Result<()>
where
    E: ProcessExecutor + ?Sized,
{
    let mut missing = Vec::new();

    for tool in [&ctx.config.tart.binary, &ctx.config.ssh.binary] {
        if ctx.executor.command_exists(tool).await {
            debug!(tool = %tool, "found");
        } else {
            missing.push(tool.as_str());
        }
    }

    if !missing.is_empty() {
        return Err(ExecutorError::MissingPrecondition(format!(
            "required tools not found on PATH: {}",
            missing.join(", ")
        )));
    }

    info!("all required tools are available");
    Ok(())
}
