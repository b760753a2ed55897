// tests/config_loading.rs

use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use tart_executor::config::{load_and_validate, load_from_path};
use tart_executor::errors::ExecutorError;
use tart_executor::tart::NetworkMode;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn empty_file_gives_defaults() {
    let file = config_file("");
    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.tart.binary, "tart");
    assert_eq!(cfg.tart.network, NetworkMode::Softnet);
    assert_eq!(cfg.ssh.user, "admin");
    assert_eq!(cfg.readiness.attempts, 30);
    assert_eq!(cfg.readiness.interval_ms, 1000);
    assert_eq!(cfg.prune.older_than_days, 7);
}

#[test]
fn full_file_is_parsed() {
    let file = config_file(
        r#"
[tart]
binary = "/opt/homebrew/bin/tart"
insecure = true
graphics = true
network = { bridged = "en0" }
ip_wait_secs = 30
dirs = [{ name = "cache", path = "/var/cache/ci", read_only = true }]
disks = [{ path = "/images/data.img" }]

[ssh]
user = "ci"
identity = "/etc/tart-executor/id_ed25519"
connect_timeout_secs = 2

[readiness]
attempts = 60
interval_ms = 500

[prune]
older_than_days = 3
cache_budget = 100
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.tart.binary, "/opt/homebrew/bin/tart");
    assert_eq!(cfg.tart.network, NetworkMode::Bridged("en0".to_string()));
    assert_eq!(cfg.tart.dirs.len(), 1);
    assert!(cfg.tart.dirs[0].read_only);
    assert_eq!(
        cfg.ssh.identity,
        Some(PathBuf::from("/etc/tart-executor/id_ed25519"))
    );
    assert_eq!(cfg.readiness.attempts, 60);
    assert_eq!(cfg.prune.cache_budget, Some(100));

    let args = cfg.run_options().to_args();
    assert_eq!(args[0], "--graphics");
    assert!(args.contains(&"--dir=cache:/var/cache/ci:ro".to_string()));
    assert!(args.contains(&"--disk=/images/data.img".to_string()));
}

#[test]
fn invalid_toml_returns_toml_error() {
    let file = config_file("[tart\nbinary = ");

    match load_from_path(file.path()) {
        Err(ExecutorError::TomlError(_)) => {}
        Err(e) => panic!("Expected TomlError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn zero_attempts_returns_config_error() {
    let file = config_file("[readiness]\nattempts = 0\n");

    match load_and_validate(file.path()) {
        Err(ExecutorError::ConfigError(msg)) => assert!(msg.contains("attempts")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn missing_file_returns_io_error() {
    let result = load_and_validate("/definitely/not/here/tart-executor.toml");
    assert!(matches!(result, Err(ExecutorError::IoError(_))));
}
