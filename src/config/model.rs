// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::tart::{DirMount, DiskMount, NetworkMode, RunOptions};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [tart]
/// network = "softnet"
/// ip_wait_secs = 10
/// dirs = [{ name = "ssh", path = "~/.ssh" }]
///
/// [ssh]
/// user = "admin"
/// connect_timeout_secs = 5
///
/// [readiness]
/// attempts = 30
/// interval_ms = 1000
///
/// [prune]
/// older_than_days = 7
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub tart: TartSection,

    #[serde(default)]
    pub ssh: SshSection,

    #[serde(default)]
    pub readiness: ReadinessSection,

    #[serde(default)]
    pub prune: PruneSection,

    #[serde(default)]
    pub guest: GuestSection,
}

/// Validated configuration with `~` expanded in every path.
///
/// Only obtainable through `ConfigFile::try_from(RawConfigFile)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub tart: TartSection,
    pub ssh: SshSection,
    pub readiness: ReadinessSection,
    pub prune: PruneSection,
    pub guest: GuestSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            tart: raw.tart,
            ssh: raw.ssh,
            readiness: raw.readiness,
            prune: raw.prune,
            guest: raw.guest,
        }
    }

    /// Options for `tart run` during `prepare`.
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            graphics: self.tart.graphics,
            disks: self.tart.disks.clone(),
            dirs: self.tart.dirs.clone(),
            network: self.tart.network.clone(),
        }
    }
}

/// `[tart]` section: the VM manager binary and how VMs are started.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TartSection {
    pub binary: String,

    /// Pass `--insecure` to `clone` and `pull` (plain-HTTP registries).
    pub insecure: bool,

    pub graphics: bool,

    pub network: NetworkMode,

    /// How long `tart ip --wait` may block during `prepare`.
    pub ip_wait_secs: u64,

    pub stop_timeout_secs: u64,

    /// Host directories shared into the guest.
    ///
    /// The default shares `~/.ssh` as `ssh` so `prepare-ssh` inside the guest
    /// can install the host's public keys.
    pub dirs: Vec<DirMount>,

    pub disks: Vec<DiskMount>,
}

impl Default for TartSection {
    fn default() -> Self {
        Self {
            binary: "tart".to_string(),
            insecure: false,
            graphics: false,
            network: NetworkMode::Softnet,
            ip_wait_secs: 10,
            stop_timeout_secs: 30,
            dirs: vec![DirMount::new("ssh", "~/.ssh")],
            disks: vec![],
        }
    }
}

/// `[ssh]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SshSection {
    pub binary: String,
    pub user: String,
    pub identity: Option<PathBuf>,
    pub connect_timeout_secs: u64,

    /// Remote command that reads the job script from stdin.
    pub remote_shell: String,
}

impl Default for SshSection {
    fn default() -> Self {
        Self {
            binary: "ssh".to_string(),
            user: "admin".to_string(),
            identity: None,
            connect_timeout_secs: 5,
            remote_shell: "bash".to_string(),
        }
    }
}

/// `[readiness]` section: bounds of the SSH readiness loop.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReadinessSection {
    pub attempts: u32,
    pub interval_ms: u64,
}

impl ReadinessSection {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for ReadinessSection {
    fn default() -> Self {
        Self {
            attempts: 30,
            interval_ms: 1000,
        }
    }
}

/// `[prune]` section, used by the `prune` maintenance command.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PruneSection {
    pub older_than_days: u32,
    pub cache_budget: Option<u64>,
}

impl Default for PruneSection {
    fn default() -> Self {
        Self {
            older_than_days: 7,
            cache_budget: None,
        }
    }
}

/// `[guest]` section: paths used by `prepare-ssh` inside the VM.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GuestSection {
    /// Where the host's shared `ssh` directory shows up in the guest.
    pub shared_keys_dir: PathBuf,
    pub authorized_keys: PathBuf,
}

impl Default for GuestSection {
    fn default() -> Self {
        Self {
            shared_keys_dir: PathBuf::from("/Volumes/My Shared Files/ssh"),
            authorized_keys: PathBuf::from("~/.ssh/authorized_keys"),
        }
    }
}
