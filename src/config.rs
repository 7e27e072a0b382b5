// src/config.rs
//! Configuration file parsing for patchwork
//!
//! `patchwork.toml` is optional. Every key has a default, and command line
//! flags override whatever the file says.
//!
//! ```toml
//! output_dir = "output"
//! jobs = 4
//! color = true
//!
//! [transform]
//! duplicate_mod_identity = "first-wins"
//! isolate_class_failures = false
//! strip_signatures = true
//! ```

use crate::transform::{DuplicatePolicy, TransformOptions};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "patchwork.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// TOML configuration file structure
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PatchworkConfig {
    /// Where transformed jars are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Worker threads for batch runs (unset = one per core)
    #[serde(default)]
    pub jobs: Option<usize>,

    /// Colored log output
    #[serde(default = "default_true")]
    pub color: bool,

    #[serde(default)]
    pub transform: TransformSection,
}

/// `[transform]` table
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TransformSection {
    #[serde(default)]
    pub duplicate_mod_identity: DuplicatePolicy,

    #[serde(default)]
    pub isolate_class_failures: bool,

    #[serde(default = "default_true")]
    pub strip_signatures: bool,
}

impl Default for PatchworkConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            jobs: None,
            color: true,
            transform: TransformSection::default(),
        }
    }
}

impl Default for TransformSection {
    fn default() -> Self {
        Self {
            duplicate_mod_identity: DuplicatePolicy::default(),
            isolate_class_failures: false,
            strip_signatures: true,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_true() -> bool {
    true
}

impl PatchworkConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: PatchworkConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, else `patchwork.toml` if it exists, else defaults
    ///
    /// An explicitly named file must exist.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jobs == Some(0) {
            return Err(ConfigError::Invalid("jobs must be at least 1".to_string()));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("output_dir must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            duplicate_mod_identity: self.transform.duplicate_mod_identity,
            isolate_class_failures: self.transform.isolate_class_failures,
            strip_signatures: self.transform.strip_signatures,
        }
    }
}
