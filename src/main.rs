// src/main.rs

use tart_executor::env::JobEnvironment;
use tart_executor::errors::Result;
use tart_executor::{cli, logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        let job = JobEnvironment::from_process_env();
        eprintln!("tart-executor error: {err}");
        std::process::exit(err.exit_code(job.build_failure_exit_code, job.system_failure_exit_code));
    }
}

async fn run_main() -> Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
