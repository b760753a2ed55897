// src/hooks/cleanup.rs

use tracing::{info, warn};

use crate::errors::Result;
use crate::exec::ProcessExecutor;
use crate::hooks::HookContext;

/// `cleanup` hook: stop and delete the job VM.
///
/// Best effort: the VM may never have been created or may already be gone,
/// so failures are logged and swallowed.
pub async fn cleanup<E>(ctx: &HookContext<'_, E>) -> Result<()>
where
    E: ProcessExecutor + ?Sized,
{
    let name = ctx.job.vm_identity();
    let tart = ctx.tart();

    info!(vm = %name, "cleaning up job VM");

    if let Err(e) = tart.stop(&name, ctx.config.tart.stop_timeout_secs).await {
        warn!(vm = %name, error = %e, "stopping VM failed; continuing");
    }
    if let Err(e) = tart.delete(&name).await {
        warn!(vm = %name, error = %e, "deleting VM failed");
    }

    Ok(())
}
