//! Raw configuration and named-config persistence
//!
//! Configs are JSON files stored under `codemap/config/` in the working directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::paths::config_dir;

/// Name used when saving or loading without an explicit name
pub const DEFAULT_CONFIG_NAME: &str = "default";

/// Fatal configuration errors; raised before any traversal starts
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config not found: {0}")]
    NotFound(String),

    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("max_file_size_mb must be a positive number, got {0}")]
    InvalidMaxFileSize(f64),

    #[error("invalid text extension: {0:?}")]
    InvalidExtension(String),

    #[error("source folder entries must not be empty")]
    EmptySource,
}

/// Loosely-written configuration as written by users or built from flags.
///
/// Every field is optional; the resolver fills in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folders: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub except_folders: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub except_files: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_extensions: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_size_mb: Option<f64>,

    /// Output file path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Output format (text/jsonl)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl RawConfig {
    /// Parse a config from JSON text
    pub fn from_json(path: &Path, text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Whether any rule field is set; `output` and `format` are not rules
    pub fn has_rules(&self) -> bool {
        self.src.is_some()
            || self.folders.is_some()
            || self.files.is_some()
            || self.except_folders.is_some()
            || self.except_files.is_some()
            || self.text_extensions.is_some()
            || self.max_file_size_mb.is_some()
    }

    /// Layer `overrides` on top of this config; every field set there wins
    pub fn overlay(self, overrides: RawConfig) -> RawConfig {
        RawConfig {
            src: overrides.src.or(self.src),
            folders: overrides.folders.or(self.folders),
            files: overrides.files.or(self.files),
            except_folders: overrides.except_folders.or(self.except_folders),
            except_files: overrides.except_files.or(self.except_files),
            text_extensions: overrides.text_extensions.or(self.text_extensions),
            max_file_size_mb: overrides.max_file_size_mb.or(self.max_file_size_mb),
            output: overrides.output.or(self.output),
            format: overrides.format.or(self.format),
        }
    }
}

/// Named configurations under `<base>/codemap/config`
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(base: &Path) -> Self {
        Self {
            dir: config_dir(base),
        }
    }

    #[allow(dead_code)]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Candidate file paths for a name, with and without a `.json` suffix
    fn candidates(&self, name: &str) -> [PathBuf; 2] {
        [
            self.dir.join(format!("{}.json", name)),
            self.dir.join(name),
        ]
    }

    /// Find the file backing a named config, if any
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        self.candidates(name).into_iter().find(|p| p.is_file())
    }

    /// Load a named config; a missing name is an error
    pub fn load(&self, name: &str) -> Result<RawConfig, ConfigError> {
        let path = self
            .locate(name)
            .ok_or_else(|| ConfigError::NotFound(name.to_string()))?;
        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        RawConfig::from_json(&path, &text)
    }

    /// Load the `default` config if one has been saved
    pub fn load_default(&self) -> Result<Option<RawConfig>, ConfigError> {
        match self.locate(DEFAULT_CONFIG_NAME) {
            Some(_) => self.load(DEFAULT_CONFIG_NAME).map(Some),
            None => Ok(None),
        }
    }

    /// Save a config under a name, returning the written path
    pub fn save(&self, name: &str, config: &RawConfig) -> anyhow::Result<PathBuf> {
        use anyhow::Context;

        let name = if name.trim().is_empty() {
            DEFAULT_CONFIG_NAME
        } else {
            name.trim()
        };
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create config directory: {:?}", self.dir))?;
        let path = self.dir.join(format!("{}.json", name));
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&path, json).with_context(|| format!("Failed to write config: {:?}", path))?;
        Ok(path)
    }
}
