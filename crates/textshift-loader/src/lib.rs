#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

//! # textshift-loader
//!
//! Chunked UTF-8 file loading with progress events.
//!
//! [`reader::ChunkedReader`] is the synchronous core: it sizes the source,
//! reads fixed-size chunks, and reports an integer percentage after each
//! one. [`FileLoader`] runs that core on a dedicated worker thread per load
//! and delivers [`LoadEvent`]s over an async channel, allowing at most one
//! in-flight load per path.

pub mod config;
pub mod listing;
pub mod reader;
pub mod search;
pub mod worker;

pub use config::LoaderConfig;
pub use listing::{list_text_files, save_text};
pub use reader::{ChunkedReader, read_chunked};
pub use search::{TextMatch, find_all, find_text};
pub use worker::{FileLoader, LoadEvent, LoadHandle, LoadedText};

use thiserror::Error;

/// Errors that can end a load
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("IO error during {operation} for '{path}': {message}")]
    Io {
        operation: String,
        path: String,
        message: String,
    },

    #[error("'{path}' is not valid UTF-8 at byte {offset}")]
    Decoding { path: String, offset: u64 },

    #[error("A load of '{0}' is already in progress")]
    AlreadyLoading(String),

    #[error("Load cancelled")]
    Cancelled,

    #[error("Loader worker failed: {0}")]
    WorkerFailed(String),
}

impl LoadError {
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

    /// Create a decoding error at a byte offset
    pub fn decoding(path: impl Into<String>, offset: u64) -> Self {
        Self::Decoding {
            path: path.into(),
            offset,
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::io("io", "<unknown>", e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LoadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoding_error_reports_path_and_offset() {
        let error = LoadError::decoding("notes.txt", 8193);
        assert_eq!(error.to_string(), "'notes.txt' is not valid UTF-8 at byte 8193");
    }

    #[test]
    fn io_error_from_std_error_has_fallback_context() {
        let error = std::fs::File::open("/path/that/does/not/exist")
            .map_err(LoadError::from)
            .expect_err("open should fail");

        match error {
            LoadError::Io {
                operation,
                path,
                message,
            } => {
                assert_eq!(operation, "io");
                assert_eq!(path, "<unknown>");
                assert!(!message.is_empty());
            }
            _ => panic!("expected io variant"),
        }
    }
}
