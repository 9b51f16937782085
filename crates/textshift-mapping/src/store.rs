//! Mapping document persistence
//!
//! Tables are stored as a flat JSON object, pretty-printed with four-space
//! indentation. Non-ASCII characters are written as-is, never `\u` escaped.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::{debug, info};

use crate::{Error, MappingTable, Result};

const INDENT: &[u8] = b"    ";

/// A mapping document on disk
#[derive(Debug, Clone)]
pub struct MappingStore {
    path: PathBuf,
}

impl MappingStore {
    /// Create a store for the document at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the document exists
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the table from disk
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the file cannot be read and a format error
    /// when it is not a flat object of strings.
    pub fn load(&self) -> Result<MappingTable> {
        let path_str = self.path.display().to_string();
        debug!("Loading mapping table from {}", path_str);

        let content = fs::read_to_string(&self.path)
            .map_err(|e| Error::io("load", &path_str, e.to_string()))?;
        let table = parse(&content).map_err(|e| Error::format(&path_str, e.to_string()))?;

        info!("Loaded {} mappings from {}", table.len(), path_str);
        Ok(table)
    }

    /// Load the table, or return `fallback` when the document does not exist
    ///
    /// # Errors
    ///
    /// Same as [`MappingStore::load`] for a document that exists.
    pub fn load_or(&self, fallback: MappingTable) -> Result<MappingTable> {
        if self.exists() {
            self.load()
        } else {
            debug!(
                "Mapping document {} not found, using fallback",
                self.path.display()
            );
            Ok(fallback)
        }
    }

    /// Write the table to disk, replacing any existing document
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty table and an I/O error
    /// when the file cannot be written.
    pub fn save(&self, table: &MappingTable) -> Result<()> {
        let path_str = self.path.display().to_string();
        if table.is_empty() {
            return Err(Error::configuration("no mappings to save"));
        }

        let document = to_document(table).map_err(|e| Error::format(&path_str, e.to_string()))?;
        fs::write(&self.path, document).map_err(|e| Error::io("save", &path_str, e.to_string()))?;

        info!("Saved {} mappings to {}", table.len(), path_str);
        Ok(())
    }
}

/// Parse a mapping document
///
/// # Errors
///
/// Returns the JSON error when the text is not a flat object of strings.
pub fn parse(content: &str) -> serde_json::Result<MappingTable> {
    serde_json::from_str(content)
}

/// Render a table as a mapping document
///
/// # Errors
///
/// Propagates serializer failures.
pub fn to_document(table: &MappingTable) -> serde_json::Result<String> {
    let mut buffer = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
    table.serialize(&mut serializer)?;
    String::from_utf8(buffer).map_err(serde::ser::Error::custom)
}
