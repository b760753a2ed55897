// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! The runner's `config.toml` wires the hooks up like this:
//!
//! ```toml
//! [runners.custom]
//! prepare_exec = "tart-executor"
//! prepare_args = ["prepare"]
//! run_exec = "tart-executor"
//! run_args = ["run"]
//! cleanup_exec = "tart-executor"
//! cleanup_args = ["cleanup"]
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `tart-executor`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tart-executor",
    version,
    about = "GitLab custom executor that runs every job in a fresh Tart VM.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `TART_EXECUTOR_CONFIG`, then `tart-executor.toml` in the
    /// current directory, then built-in defaults.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TART_EXECUTOR_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: HookCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum HookCommand {
    /// Clone the job image, boot the VM and wait until it accepts SSH.
    Prepare,

    /// Run one stage script of the job inside the VM.
    Run {
        /// Script generated by the runner for this stage.
        script: PathBuf,

        /// Stage name, only used for logging.
        stage: Option<String>,
    },

    /// Stop and delete the job VM.
    Cleanup,

    /// Inside the guest: install the host's shared public keys.
    PrepareSsh,

    /// Check that `tart` and `ssh` are installed.
    Check,

    /// Pull an image into the local tart cache.
    Pull {
        image: String,
    },

    /// Prune old entries from the tart cache.
    Prune,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
