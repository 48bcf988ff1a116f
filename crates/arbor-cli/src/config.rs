//! Configuration for the arbor command.

use anyhow::{Context, Result};
use arbor_core::{CyclePolicy, MaterializeOptions, DEFAULT_MAX_DEPTH};
use arbor_render::{OutputFormat, TextStyle};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArborConfig {
    /// Default output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Connector style for text output
    #[serde(default)]
    pub text_style: TextStyle,

    /// Cycle handling during materialization
    #[serde(default)]
    pub cycle_policy: CyclePolicy,

    /// Maximum tree depth (null disables the limit)
    #[serde(default = "default_max_depth")]
    pub max_depth: Option<usize>,

    /// Fail on any data-quality issue instead of omitting orphans
    #[serde(default)]
    pub strict: bool,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_max_depth() -> Option<usize> {
    Some(DEFAULT_MAX_DEPTH)
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// `~/.arbor/config.yaml`
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".arbor")
        .join("config.yaml")
}

impl Default for ArborConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            text_style: TextStyle::default(),
            cycle_policy: CyclePolicy::default(),
            max_depth: default_max_depth(),
            strict: false,
            log_level: default_log_level(),
        }
    }
}

impl ArborConfig {
    /// Load `path` if it exists, otherwise return defaults.
    ///
    /// An unreadable or invalid file is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    /// Pick the effective configuration before logging is initialised.
    ///
    /// An explicit path must load. A broken file at `fallback` is replaced
    /// by defaults and its error handed back for the caller to log.
    pub fn resolve(
        explicit: Option<&Path>,
        fallback: &Path,
    ) -> Result<(Self, Option<anyhow::Error>)> {
        match explicit {
            Some(path) => Ok((Self::load_from(path)?, None)),
            None => match Self::load_or_default(fallback) {
                Ok(config) => Ok((config, None)),
                Err(e) => Ok((Self::default(), Some(e))),
            },
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn materialize_options(&self) -> MaterializeOptions {
        MaterializeOptions {
            cycle_policy: self.cycle_policy,
            max_depth: self.max_depth,
        }
    }
}
