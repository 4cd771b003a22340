//! Configuration for margin.
//!
//! Loads `config.toml` from the path discovered by [`crate::paths::discover`],
//! with optional CLI override via `--config`.
//!
//! # Architecture
//!
//! 1. **Startup** calls [`crate::paths::discover`] to find the `.margin/` directory
//! 2. [`Config::load_with_overrides`] picks the config path: CLI override > discovered > defaults
//! 3. The [`Config`] is handed to [`crate::Session::new`]
//!
//! # Testing
//!
//! Tests use [`Config::load()`] with explicit paths to temporary directories.

use crate::anchor::DeletePolicy;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Emit a notice when navigation wraps around. Wrapping is silent otherwise.
    pub notify_on_wrap: bool,

    /// Fate of annotations whose line gets deleted.
    pub anchor_on_delete: DeletePolicy,

    /// Report delivery targets, in preference order.
    pub sinks: Vec<SinkKind>,

    /// File written by the `file` sink. Relative paths resolve against the
    /// working directory.
    pub report_file: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    Clipboard,
    File,
    Stdout,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notify_on_wrap: false,
            anchor_on_delete: DeletePolicy::Invalidate,
            sinks: vec![SinkKind::Clipboard, SinkKind::File],
            report_file: PathBuf::from("annotations.md"),
        }
    }
}

impl Config {
    /// Read and deserialize a TOML config file from the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration with priority: CLI override > discovered path > defaults.
    pub fn load_with_overrides(
        cli_override: Option<&Path>,
        discovered_path: Option<&Path>,
    ) -> Result<Self> {
        if let Some(path) = cli_override {
            return Self::load(path);
        }
        if let Some(path) = discovered_path {
            return Self::load(path);
        }
        Self::load_embedded()
    }

    fn load_embedded() -> Result<Self> {
        let source = include_str!("../../config.toml");
        toml::from_str(source).context("Failed to parse embedded config.toml")
    }
}
