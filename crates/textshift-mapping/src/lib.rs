#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

//! # textshift-mapping
//!
//! Ordered character mapping tables and their JSON persistence.
//!
//! A [`MappingTable`] holds literal `source -> replacement` rules in
//! insertion order. [`MappingStore`] reads and writes the table as a flat
//! JSON object, keeping key order and writing non-ASCII text literally.

pub mod store;
pub mod table;

pub use store::MappingStore;
pub use table::{MappingTable, ReplaceMode};

use thiserror::Error;

/// Errors that can occur while editing or persisting a mapping table
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("IO error during {operation} for '{path}': {message}")]
    Io {
        operation: String,
        path: String,
        message: String,
    },

    #[error("Invalid mapping document '{path}': {message}")]
    Format { path: String, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
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

    /// Create a document format error.
    pub fn format(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Format {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("io", "<unknown>", e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
