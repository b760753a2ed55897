// src/hooks/prepare_ssh.rs

//! Guest-side helper: install the host's public keys so the host can SSH in.
//!
//! The host shares its `~/.ssh` into the VM (see `[tart].dirs`); this command
//! runs inside the guest at login and merges every `*.pub` found there into
//! `authorized_keys`.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::GuestSection;
use crate::errors::Result;

/// Merge shared public keys into `authorized_keys`, keeping existing keys and
/// dropping duplicates. Returns the number of keys written.
pub fn prepare_ssh(guest: &GuestSection) -> Result<usize> {
    let mut keys = read_keys(&guest.authorized_keys)?;
    for file in public_key_files(&guest.shared_keys_dir)? {
        debug!(file = %file.display(), "reading public key");
        keys.extend(read_keys(&file)?);
    }

    let mut seen = HashSet::new();
    keys.retain(|k| seen.insert(k.clone()));

    if let Some(parent) = guest.authorized_keys.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut contents = keys.join("\n");
    if !contents.is_empty() {
        contents.push('\n');
    }
    fs::write(&guest.authorized_keys, contents)?;

    info!(
        path = %guest.authorized_keys.display(),
        keys = keys.len(),
        "authorized_keys updated"
    );
    Ok(keys.len())
}

/// Non-empty trimmed lines of `path`; a missing file has none.
fn read_keys(path: &Path) -> Result<Vec<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(vec![]),
        Err(e) => Err(e.into()),
    }
}

/// `*.pub` files directly inside `dir`, sorted by name.
fn public_key_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "shared key directory not mounted");
            return Ok(vec![]);
        }
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_pub = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pub"));
        if is_pub && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
