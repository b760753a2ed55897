// src/config/mod.rs

//! Configuration loading and validation for tart-executor.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, or fall back to defaults (`loader.rs`).
//! - Validate basic invariants and expand `~` in paths (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, resolve_config};
pub use model::{
    ConfigFile, GuestSection, PruneSection, RawConfigFile, ReadinessSection, SshSection,
    TartSection,
};
pub use validate::expand_home;
