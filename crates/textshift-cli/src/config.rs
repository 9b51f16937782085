//! YAML configuration for the command-line front end

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use textshift_convert::config::DEFAULT_SUFFIX;
use textshift_convert::{ConvertConfig, FailurePolicy};
use textshift_loader::LoaderConfig;
use textshift_loader::config::{DEFAULT_CHUNK_SIZE, DEFAULT_EXTENSIONS};
use textshift_mapping::ReplaceMode;
use thiserror::Error;
use tracing::debug;

/// Errors raised while reading the configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Invalid config '{path}': {message}")]
    Parse { path: String, message: String },
}

/// Top-level configuration document
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub loader: LoaderSection,
    pub convert: ConvertSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderSection {
    pub chunk_size: usize,
    pub extensions: Vec<String>,
}

impl Default for LoaderSection {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertSection {
    pub suffix: String,
    pub output_dir: Option<PathBuf>,
    /// Mapping document; the builtin table is used when unset
    pub mapping: Option<PathBuf>,
    pub stop_on_error: bool,
    pub per_rule: bool,
}

impl Default for ConvertSection {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
            output_dir: None,
            mapping: None,
            stop_on_error: false,
            per_rule: false,
        }
    }
}

impl AppConfig {
    /// Read a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let path_str = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path_str.clone(),
            message: e.to_string(),
        })?;
        let config = Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path_str.clone(),
            message: e.to_string(),
        })?;
        debug!("Loaded configuration from {}", path_str);
        Ok(config)
    }

    /// Parse a configuration document
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Read `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig::new()
            .chunk_size(self.loader.chunk_size)
            .extensions(&self.loader.extensions)
    }

    pub fn convert_config(&self) -> ConvertConfig {
        let mut config = ConvertConfig::new()
            .suffix(self.convert.suffix.clone())
            .failure_policy(FailurePolicy::from_stop_flag(self.convert.stop_on_error))
            .replace_mode(if self.convert.per_rule {
                ReplaceMode::PerRule
            } else {
                ReplaceMode::Scan
            });
        if let Some(dir) = &self.convert.output_dir {
            config = config.output_dir(dir);
        }
        config
    }
}
