// src/env.rs

//! Job context handed to the executor by the CI runner through environment
//! variables.

use std::collections::HashMap;

use crate::errors::{ExecutorError, Result};

pub const RUNNER_ID_VAR: &str = "CUSTOM_ENV_CI_RUNNER_ID";
pub const PROJECT_ID_VAR: &str = "CUSTOM_ENV_CI_PROJECT_ID";
pub const CONCURRENT_ID_VAR: &str = "CUSTOM_ENV_CI_CONCURRENT_PROJECT_ID";
pub const JOB_ID_VAR: &str = "CUSTOM_ENV_CI_JOB_ID";
pub const JOB_IMAGE_VAR: &str = "CUSTOM_ENV_CI_JOB_IMAGE";
pub const BUILD_FAILURE_EXIT_CODE_VAR: &str = "BUILD_FAILURE_EXIT_CODE";
pub const SYSTEM_FAILURE_EXIT_CODE_VAR: &str = "SYSTEM_FAILURE_EXIT_CODE";

const DEFAULT_BUILD_FAILURE_EXIT_CODE: i32 = 1;
const DEFAULT_SYSTEM_FAILURE_EXIT_CODE: i32 = 2;

/// Snapshot of the variables the runner sets for one hook invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobEnvironment {
    pub runner_id: Option<String>,
    pub project_id: Option<String>,
    pub concurrent_id: Option<String>,
    pub job_id: Option<String>,
    pub image: Option<String>,
    pub build_failure_exit_code: i32,
    pub system_failure_exit_code: i32,
}

impl JobEnvironment {
    pub fn from_process_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Build from arbitrary `(name, value)` pairs. Empty values count as
    /// unset.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(_, v)| !v.trim().is_empty())
            .collect();

        let code = |name: &str, default: i32| {
            vars.get(name)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };

        Self {
            runner_id: vars.get(RUNNER_ID_VAR).cloned(),
            project_id: vars.get(PROJECT_ID_VAR).cloned(),
            concurrent_id: vars.get(CONCURRENT_ID_VAR).cloned(),
            job_id: vars.get(JOB_ID_VAR).cloned(),
            image: vars.get(JOB_IMAGE_VAR).cloned(),
            build_failure_exit_code: code(
                BUILD_FAILURE_EXIT_CODE_VAR,
                DEFAULT_BUILD_FAILURE_EXIT_CODE,
            ),
            system_failure_exit_code: code(
                SYSTEM_FAILURE_EXIT_CODE_VAR,
                DEFAULT_SYSTEM_FAILURE_EXIT_CODE,
            ),
        }
    }

    /// Name of the VM that belongs to this job.
    pub fn vm_identity(&self) -> String {
        vm_identity(
            self.runner_id.as_deref(),
            self.project_id.as_deref(),
            self.concurrent_id.as_deref(),
            self.job_id.as_deref(),
        )
    }

    /// Image to clone the job VM from.
    pub fn require_image(&self) -> Result<&str> {
        self.image.as_deref().ok_or_else(|| {
            ExecutorError::MissingPrecondition(format!(
                "no job image configured ({JOB_IMAGE_VAR} is not set)"
            ))
        })
    }
}

/// VM name for a job: `runner-<runner>-<project>-concurrent-<slot>-job-<job>`.
///
/// Same inputs always give the same name, so every hook of one job addresses
/// the same VM; the concurrency slot and job id keep concurrent jobs of one
/// runner apart. Missing components are skipped.
pub fn vm_identity(
    runner_id: Option<&str>,
    project_id: Option<&str>,
    concurrent_id: Option<&str>,
    job_id: Option<&str>,
) -> String {
    [
        Some("runner"),
        runner_id,
        project_id,
        Some("concurrent"),
        concurrent_id,
        Some("job"),
        job_id,
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join("-")
}
