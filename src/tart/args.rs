// src/tart/args.rs

//! Typed options for `tart run` and their command-line rendering.

use std::path::PathBuf;

use serde::Deserialize;

/// A host directory shared into the guest (`--dir=name:path[:ro]`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DirMount {
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub read_only: bool,
}

impl DirMount {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            read_only: false,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn to_arg(&self) -> String {
        format!(
            "--dir={}:{}{}",
            self.name,
            self.path.display(),
            if self.read_only { ":ro" } else { "" }
        )
    }
}

/// An extra disk image attached to the VM (`--disk=path[:ro]`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DiskMount {
    pub path: PathBuf,
    #[serde(default)]
    pub read_only: bool,
}

impl DiskMount {
    pub fn to_arg(&self) -> String {
        format!(
            "--disk={}{}",
            self.path.display(),
            if self.read_only { ":ro" } else { "" }
        )
    }
}

/// VM networking mode.
///
/// In TOML: `network = "default"`, `network = "softnet"` or
/// `network = { bridged = "en0" }`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    /// Tart's own default (shared NAT).
    #[default]
    Default,
    Softnet,
    Bridged(String),
}

impl NetworkMode {
    pub fn to_args(&self) -> Vec<String> {
        match self {
            NetworkMode::Default => vec![],
            NetworkMode::Softnet => vec!["--net-softnet".to_string()],
            NetworkMode::Bridged(interface) => {
                vec!["--net-bridged".to_string(), interface.clone()]
            }
        }
    }
}

/// Everything `tart run` accepts besides the VM name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub graphics: bool,
    pub disks: Vec<DiskMount>,
    pub dirs: Vec<DirMount>,
    pub network: NetworkMode,
}

impl RunOptions {
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![if self.graphics {
            "--graphics".to_string()
        } else {
            "--no-graphics".to_string()
        }];
        args.extend(self.disks.iter().map(DiskMount::to_arg));
        args.extend(self.dirs.iter().map(DirMount::to_arg));
        args.extend(self.network.to_args());
        args
    }
}
