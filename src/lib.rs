// src/lib.rs

pub mod cli;
pub mod config;
pub mod env;
pub mod errors;
pub mod exec;
pub mod hooks;
pub mod logging;
pub mod tart;

use tracing::info;

use crate::cli::{CliArgs, HookCommand};
use crate::config::resolve_config;
use crate::env::JobEnvironment;
use crate::errors::Result;
use crate::exec::RealProcessExecutor;
use crate::hooks::HookContext;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the job environment handed over by the runner
/// - the real process executor
/// - the hook selected on the command line
pub async fn run(args: CliArgs) -> Result<()> {
    let config = resolve_config(args.config.as_deref())?;
    let job = JobEnvironment::from_process_env();
    let executor = RealProcessExecutor::new();
    let ctx = HookContext::new(&executor, &config, &job);

    match args.command {
        HookCommand::Prepare => {
            let vm = hooks::prepare(&ctx).await?;
            info!(
                vm = %vm.name,
                address = %vm.address,
                attempts = vm.attempts,
                "VM ready"
            );
        }
        HookCommand::Run { script, stage } => {
            hooks::run_script(&ctx, &script, stage.as_deref()).await?;
        }
        HookCommand::Cleanup => hooks::cleanup(&ctx).await?,
        HookCommand::PrepareSsh => {
            hooks::prepare_ssh(&config.guest)?;
        }
        HookCommand::Check => hooks::check(&ctx).await?,
        HookCommand::Pull { image } => hooks::pull(&ctx, &image).await?,
        HookCommand::Prune => hooks::prune(&ctx).await?,
    }

    Ok(())
}
