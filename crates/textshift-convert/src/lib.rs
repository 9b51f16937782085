#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

//! # textshift-convert
//!
//! Single-file and batch character substitution.
//!
//! A [`Converter`] applies a [`MappingTable`] to one file or to every file in
//! a directory whose name ends with the configured suffix. Each file's
//! outcome is recorded in a [`ConversionResult`]; one file failing never
//! aborts the rest of the batch unless [`FailurePolicy::StopOnFirstError`]
//! is selected.
//!
//! [`MappingTable`]: textshift_mapping::MappingTable

pub mod batch;
pub mod config;
pub mod convert;
pub mod pipeline;
pub mod policies;

pub use batch::{BatchEvent, BatchHandle, BatchSummary};
pub use config::ConvertConfig;
pub use convert::{ConversionResult, convert_file, output_path_for};
pub use pipeline::Converter;
pub use policies::FailurePolicy;

use thiserror::Error;

/// Errors that stop a conversion before or during a batch
#[derive(Error, Debug, Clone)]
pub enum ConvertError {
    #[error("IO error during {operation} for '{path}': {message}")]
    Io {
        operation: String,
        path: String,
        message: String,
    },

    #[error("No files ending in '{suffix}' found in '{dir}'")]
    EmptyInput { dir: String, suffix: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Conversion cancelled")]
    Cancelled,

    #[error("Conversion worker failed: {0}")]
    Worker(String),

    #[error(transparent)]
    Mapping(#[from] textshift_mapping::Error),
}

impl ConvertError {
    /// Create a structured I/O error with operation/path context.
    pub fn io(
        operation: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an empty-input error for a directory scan
    pub fn empty_input(dir: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self::EmptyInput {
            dir: dir.into(),
            suffix: suffix.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

impl From<std::io::Error> for ConvertError {
    fn from(e: std::io::Error) -> Self {
        ConvertError::io("io", "<unknown>", e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_error_names_directory_and_suffix() {
        let error = ConvertError::empty_input("/data/in", ".txt");
        assert_eq!(
            error.to_string(),
            "No files ending in '.txt' found in '/data/in'"
        );
    }

    #[test]
    fn mapping_errors_convert_transparently() {
        let error: ConvertError =
            textshift_mapping::Error::configuration("no mappings to save").into();
        assert_eq!(error.to_string(), "Configuration error: no mappings to save");
        assert!(matches!(error, ConvertError::Mapping(_)));
    }
}
