#![allow(dead_code)]

use std::path::PathBuf;

use tart_executor::config::{ConfigFile, RawConfigFile};
use tart_executor::env::JobEnvironment;
use tart_executor::tart::NetworkMode;

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts from the built-in defaults with no shared directories, so tests do
/// not depend on `$HOME`.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        let mut config = RawConfigFile::default();
        config.tart.dirs.clear();
        Self { config }
    }

    pub fn with_readiness(mut self, attempts: u32, interval_ms: u64) -> Self {
        self.config.readiness.attempts = attempts;
        self.config.readiness.interval_ms = interval_ms;
        self
    }

    pub fn with_network(mut self, network: NetworkMode) -> Self {
        self.config.tart.network = network;
        self
    }

    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.config.tart.insecure = insecure;
        self
    }

    pub fn with_ssh_identity(mut self, path: &str) -> Self {
        self.config.ssh.identity = Some(PathBuf::from(path));
        self
    }

    pub fn with_cache_budget(mut self, gb: u64) -> Self {
        self.config.prune.cache_budget = Some(gb);
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for the runner-provided `JobEnvironment`.
pub struct JobBuilder {
    job: JobEnvironment,
}

impl JobBuilder {
    /// A job with project `p1`, slot `c0`, job `42` and image `macos-base`.
    pub fn new() -> Self {
        Self {
            job: JobEnvironment {
                runner_id: None,
                project_id: Some("p1".to_string()),
                concurrent_id: Some("c0".to_string()),
                job_id: Some("42".to_string()),
                image: Some("macos-base".to_string()),
                build_failure_exit_code: 1,
                system_failure_exit_code: 2,
            },
        }
    }

    pub fn runner(mut self, id: &str) -> Self {
        self.job.runner_id = Some(id.to_string());
        self
    }

    pub fn image(mut self, image: &str) -> Self {
        self.job.image = Some(image.to_string());
        self
    }

    pub fn without_image(mut self) -> Self {
        self.job.image = None;
        self
    }

    pub fn failure_codes(mut self, build: i32, system: i32) -> Self {
        self.job.build_failure_exit_code = build;
        self.job.system_failure_exit_code = system;
        self
    }

    pub fn build(self) -> JobEnvironment {
        self.job
    }
}

impl Default for JobBuilder {
    fn default() -> Self {
        Self::new()
    }
}
