//! Converter configuration

use std::path::PathBuf;

use textshift_mapping::ReplaceMode;

use crate::FailurePolicy;

/// Default file name suffix for directory batches
pub const DEFAULT_SUFFIX: &str = ".txt";

/// Configuration for single-file and batch conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertConfig {
    /// Files in a directory batch must end with this suffix (default: `.txt`)
    pub suffix: String,
    /// Write results here; `None` rewrites each file in place
    pub output_dir: Option<PathBuf>,
    /// What to do after a file fails
    pub failure_policy: FailurePolicy,
    /// How the mapping table is applied
    pub replace_mode: ReplaceMode,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
            output_dir: None,
            failure_policy: FailurePolicy::default(),
            replace_mode: ReplaceMode::default(),
        }
    }
}

impl ConvertConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the file name suffix used by directory batches
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Write results into `dir`
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Set the failure policy
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Set the replacement mode
    pub fn replace_mode(mut self, mode: ReplaceMode) -> Self {
        self.replace_mode = mode;
        self
    }
}
