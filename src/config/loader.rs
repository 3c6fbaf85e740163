// Configuration loading
//
// Reads a TOML file into a `Config`. Mirrors the teacher's `config/loader.rs`
// `Context`-chained style, minus anything specific to the teacher's own
// settings shape.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::settings::Config;

/// Default location: `~/.karen/config.toml`, following the same
/// `dirs::home_dir()`-based convention the teacher uses for its own dotfile.
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".karen")
        .join("config.toml")
}

/// Loads and parses the config file at `path`.
pub fn load_config(path: &Path) -> Result<Config> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    load_config_from_str(&raw)
        .with_context(|| format!("failed to parse config file at {}", path.display()))
}

/// Parses a config file already read into memory. Split out from
/// `load_config` so tests and embedders can build a `Config` without
/// touching the filesystem.
pub fn load_config_from_str(raw: &str) -> Result<Config> {
    toml::from_str(raw).context("invalid TOML in config file")
}
