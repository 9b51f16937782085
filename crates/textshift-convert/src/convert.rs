//! Single-file conversion

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tempfile::NamedTempFile;
use textshift_mapping::{MappingTable, ReplaceMode};
use tracing::{debug, warn};

/// Outcome of converting one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    /// File that was read
    pub source: PathBuf,
    /// File that was (or would have been) written
    pub output: PathBuf,
    /// Whether the file was converted and written
    pub success: bool,
    /// Error message if failed
    pub error: Option<String>,
    /// Processing duration
    pub duration: Duration,
}

impl ConversionResult {
    /// Create a successful result
    pub fn success(source: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
            success: true,
            error: None,
            duration: Duration::ZERO,
        }
    }

    /// Create a failed result
    pub fn failure(
        source: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
            success: false,
            error: Some(error.into()),
            duration: Duration::ZERO,
        }
    }

    /// Create a result with duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Where the converted copy of `input` goes.
///
/// With an output directory the file keeps its name inside that directory;
/// without one the input itself is rewritten.
pub fn output_path_for(input: &Path, output_dir: Option<&Path>) -> Option<PathBuf> {
    let name = input.file_name()?;
    Some(match output_dir {
        Some(dir) => dir.join(name),
        None => input.to_path_buf(),
    })
}

/// Convert one file. I/O and decoding failures are captured in the result.
///
/// The caller is responsible for rejecting an empty table; an empty table
/// here simply copies the text.
pub fn convert_file(
    input: &Path,
    table: &MappingTable,
    output_dir: Option<&Path>,
    mode: ReplaceMode,
) -> ConversionResult {
    let start = Instant::now();

    let Some(output) = output_path_for(input, output_dir) else {
        return ConversionResult::failure(input, input, "input path has no file name");
    };

    let outcome = fs::read_to_string(input)
        .map_err(|e| format!("read failed for '{}': {}", input.display(), e))
        .map(|content| table.apply_with(&content, mode))
        .and_then(|converted| {
            write_replacing(&output, &converted)
                .map_err(|e| format!("write failed for '{}': {}", output.display(), e))
        });

    let result = match outcome {
        Ok(()) => {
            debug!("Converted {} -> {}", input.display(), output.display());
            ConversionResult::success(input, output)
        }
        Err(message) => {
            warn!("Conversion of {} failed: {}", input.display(), message);
            ConversionResult::failure(input, output, message)
        }
    };

    result.with_duration(start.elapsed())
}

/// Write `text` to a temporary file beside `target`, then rename it over
/// `target`. A failed write leaves any existing `target` untouched.
fn write_replacing(target: &Path, text: &str) -> io::Result<()> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(text.as_bytes())?;
    staged.as_file().sync_all()?;
    if let Ok(existing) = fs::metadata(target) {
        staged.as_file().set_permissions(existing.permissions())?;
    }
    staged.persist(target).map_err(|e| e.error)?;
    Ok(())
}
