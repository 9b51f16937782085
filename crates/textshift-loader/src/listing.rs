//! Folder listing and saving for the viewer

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{LoadError, Result};

/// List the files directly inside `dir` whose extension is in `extensions`.
///
/// Extensions are compared without the dot and ignoring ASCII case. The
/// result is sorted by file name so listings are reproducible.
///
/// # Errors
///
/// Returns an I/O error when the directory cannot be read.
pub fn list_text_files<S: AsRef<str>>(
    dir: impl AsRef<Path>,
    extensions: &[S],
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let dir_str = dir.display().to_string();

    let entries = fs::read_dir(dir).map_err(|e| LoadError::io("list", &dir_str, e.to_string()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| LoadError::io("list", &dir_str, e.to_string()))?;
        let path = entry.path();
        if path.is_file() && has_extension(&path, extensions) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    debug!("Found {} viewable files in {}", files.len(), dir_str);
    Ok(files)
}

fn has_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|wanted| wanted.as_ref().trim_start_matches('.').eq_ignore_ascii_case(ext))
}

/// Write `content` to `path` as UTF-8, replacing the file
///
/// # Errors
///
/// Returns an I/O error when the file cannot be written.
pub fn save_text(path: impl AsRef<Path>, content: &str) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, content)
        .map_err(|e| LoadError::io("save", path.display().to_string(), e.to_string()))?;
    info!("Saved {} bytes to {}", content.len(), path.display());
    Ok(())
}
