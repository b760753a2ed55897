// src/hooks/maintenance.rs

//! Host maintenance outside of any job: pre-pulling images and pruning the
//! image cache.

use tracing::info;

use crate::errors::Result;
use crate::exec::ProcessExecutor;
use crate::hooks::HookContext;

pub async fn pull<E>(ctx: &HookContext<'_, E>, image: &str) -> Result<()>
where
    E: ProcessExecutor + ?Sized,
{
    info!(image, "pulling image");
    ctx.tart().pull(image, ctx.config.tart.insecure).await
}

pub async fn prune<E>(ctx: &HookContext<'_, E>) -> Result<()>
where
    E: ProcessExecutor + ?Sized,
{
    let cfg = &ctx.config.prune;
    info!(
        older_than_days = cfg.older_than_days,
        cache_budget = ?cfg.cache_budget,
        "pruning tart cache"
    );
    ctx.tart().prune(cfg.older_than_days, cfg.cache_budget).await
}
