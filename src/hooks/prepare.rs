// src/hooks/prepare.rs

use tracing::info;

use crate::errors::{PrepareStep, Result};
use crate::exec::ProcessExecutor;
use crate::hooks::HookContext;
use crate::tart::wait_until_ready;

/// The VM a successful `prepare` left running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedVm {
    pub name: String,
    pub address: String,
    /// Handshakes it took until SSH answered.
    pub attempts: u32,
}

/// `prepare` hook: clone the job image, boot it and wait for SSH.
///
/// - A missing image fails before any process is started.
/// - Clone, start and address failures are tagged with their step so they
///   map to distinct exit codes.
/// - Nothing is torn down on failure; the runner calls `cleanup` for that.
pub async fn prepare<E>(ctx: &HookContext<'_, E>) -> Result<PreparedVm>
where
    E: ProcessExecutor + ?Sized,
{
    let image = ctx.job.require_image()?;
    let name = ctx.job.vm_identity();
    let tart = ctx.tart();

    info!(image, vm = %name, "preparing job VM");

    tart.clone_vm(image, &name, ctx.config.tart.insecure)
        .await
        .map_err(|e| e.in_step(PrepareStep::Clone))?;

    tart.start_in_background(&name, &ctx.config.run_options())
        .map_err(|e| e.in_step(PrepareStep::Start))?;

    let address = tart
        .ip(&name, ctx.config.tart.ip_wait_secs)
        .await
        .map_err(|e| e.in_step(PrepareStep::AddressQuery))?;

    let ssh = ctx.ssh();
    let attempts = wait_until_ready(&ssh, &address, &ctx.readiness_policy()).await?;

    Ok(PreparedVm {
        name,
        address,
        attempts,
    })
}
