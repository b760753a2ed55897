// src/config/validate.rs

use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{ExecutorError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::ExecutorError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        let home = std::env::var_os("HOME").map(PathBuf::from);
        Ok(ConfigFile::new_unchecked(expand_paths(raw, home.as_deref())))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_binaries(cfg)?;
    validate_ssh(cfg)?;
    validate_readiness(cfg)?;
    validate_mounts(cfg)?;
    Ok(())
}

fn validate_binaries(cfg: &RawConfigFile) -> Result<()> {
    if cfg.tart.binary.trim().is_empty() {
        return Err(config_error("[tart].binary must not be empty"));
    }
    if cfg.ssh.binary.trim().is_empty() {
        return Err(config_error("[ssh].binary must not be empty"));
    }
    Ok(())
}

fn validate_ssh(cfg: &RawConfigFile) -> Result<()> {
    if cfg.ssh.user.trim().is_empty() {
        return Err(config_error("[ssh].user must not be empty"));
    }
    if cfg.ssh.remote_shell.trim().is_empty() {
        return Err(config_error("[ssh].remote_shell must not be empty"));
    }
    if cfg.ssh.connect_timeout_secs == 0 {
        return Err(config_error(
            "[ssh].connect_timeout_secs must be >= 1 (got 0)",
        ));
    }
    Ok(())
}

fn validate_readiness(cfg: &RawConfigFile) -> Result<()> {
    if cfg.readiness.attempts == 0 {
        return Err(config_error("[readiness].attempts must be >= 1 (got 0)"));
    }
    Ok(())
}

fn validate_mounts(cfg: &RawConfigFile) -> Result<()> {
    for dir in cfg.tart.dirs.iter() {
        if dir.name.is_empty() {
            return Err(config_error("[tart].dirs entries need a non-empty name"));
        }
        // `:` separates name, path and the `ro` flag on the tart command line.
        if dir.name.contains(':') {
            return Err(ExecutorError::ConfigError(format!(
                "[tart].dirs name '{}' must not contain ':'",
                dir.name
            )));
        }
    }
    Ok(())
}

fn config_error(msg: &str) -> ExecutorError {
    ExecutorError::ConfigError(msg.to_string())
}

fn expand_paths(mut raw: RawConfigFile, home: Option<&Path>) -> RawConfigFile {
    for dir in raw.tart.dirs.iter_mut() {
        dir.path = expand_home(&dir.path, home);
    }
    for disk in raw.tart.disks.iter_mut() {
        disk.path = expand_home(&disk.path, home);
    }
    raw.ssh.identity = raw.ssh.identity.map(|p| expand_home(&p, home));
    raw.guest.shared_keys_dir = expand_home(&raw.guest.shared_keys_dir, home);
    raw.guest.authorized_keys = expand_home(&raw.guest.authorized_keys, home);
    raw
}

/// Replace a leading `~` with `home`. Paths are left alone when `home` is
/// unknown.
pub fn expand_home(path: &Path, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return path.to_path_buf();
    };
    match path.strip_prefix("~") {
        Ok(rest) if rest.as_os_str().is_empty() => home.to_path_buf(),
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tart::DirMount;

    #[test]
    fn expands_leading_tilde_only() {
        let home = Path::new("/Users/ci");
        assert_eq!(
            expand_home(Path::new("~/.ssh"), Some(home)),
            PathBuf::from("/Users/ci/.ssh")
        );
        assert_eq!(expand_home(Path::new("~"), Some(home)), home);
        assert_eq!(
            expand_home(Path::new("/opt/~x"), Some(home)),
            PathBuf::from("/opt/~x")
        );
        assert_eq!(
            expand_home(Path::new("~/.ssh"), None),
            PathBuf::from("~/.ssh")
        );
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.readiness.attempts = 0;
        match ConfigFile::try_from(raw) {
            Err(ExecutorError::ConfigError(msg)) => assert!(msg.contains("attempts")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn dir_name_with_colon_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.tart.dirs = vec![DirMount::new("a:b", "/tmp")];
        assert!(matches!(
            ConfigFile::try_from(raw),
            Err(ExecutorError::ConfigError(_))
        ));
    }

    #[test]
    fn empty_user_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.ssh.user = " ".into();
        assert!(ConfigFile::try_from(raw).is_err());
    }

    #[test]
    fn expand_paths_touches_every_path_field() {
        let mut raw = RawConfigFile::default();
        raw.ssh.identity = Some(PathBuf::from("~/.ssh/id_ed25519"));
        let out = expand_paths(raw, Some(Path::new("/h")));

        assert_eq!(out.tart.dirs[0].path, PathBuf::from("/h/.ssh"));
        assert_eq!(out.ssh.identity, Some(PathBuf::from("/h/.ssh/id_ed25519")));
        assert_eq!(
            out.guest.authorized_keys,
            PathBuf::from("/h/.ssh/authorized_keys")
        );
    }
}
