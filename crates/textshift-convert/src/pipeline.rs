//! Conversion orchestration
//!
//! [`Converter`] owns a shared, read-only mapping table and the conversion
//! settings. Directory batches select files by suffix, sort them by name,
//! and convert them one at a time, emitting a [`BatchEvent`] per file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use textshift_mapping::{MappingStore, MappingTable};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::batch::{BatchEvent, BatchHandle, BatchSummary};
use crate::convert::convert_file;
use crate::{ConvertConfig, ConvertError, FailurePolicy, Result};

/// Applies a mapping table to files and directories
#[derive(Debug, Clone)]
pub struct Converter {
    table: Arc<MappingTable>,
    config: ConvertConfig,
}

impl Converter {
    /// Create a converter for `table`
    pub fn new(table: impl Into<Arc<MappingTable>>, config: ConvertConfig) -> Self {
        Self {
            table: table.into(),
            config,
        }
    }

    /// Create a converter from a saved mapping document
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Mapping`] when the document cannot be loaded.
    pub fn from_mapping_file(path: impl AsRef<Path>, config: ConvertConfig) -> Result<Self> {
        let table = MappingStore::new(path.as_ref()).load()?;
        Ok(Self::new(table, config))
    }

    pub fn table(&self) -> &MappingTable {
        &self.table
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    fn ensure_table(&self) -> Result<()> {
        if self.table.is_empty() {
            return Err(ConvertError::configuration("no character mappings defined"));
        }
        Ok(())
    }

    fn ensure_output_dir(&self) -> Result<()> {
        if let Some(dir) = &self.config.output_dir {
            if !dir.is_dir() {
                fs::create_dir_all(dir).map_err(|e| {
                    ConvertError::io("create output dir", dir.display().to_string(), e.to_string())
                })?;
                debug!("Created output directory {}", dir.display());
            }
        }
        Ok(())
    }

    /// Files in `dir` selected for a batch, sorted by file name
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the directory cannot be listed.
    pub fn discover(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let dir_str = dir.display().to_string();
        let entries =
            fs::read_dir(dir).map_err(|e| ConvertError::io("list", &dir_str, e.to_string()))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| ConvertError::io("list", &dir_str, e.to_string()))?
                .path();
            let matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(&self.config.suffix));
            if matches && path.is_file() {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    /// Convert a single file.
    ///
    /// Per-file failures are reported in the returned result.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty table, or an I/O error if
    /// the output directory cannot be created.
    pub fn convert_file(&self, input: impl AsRef<Path>) -> Result<crate::ConversionResult> {
        self.ensure_table()?;
        self.ensure_output_dir()?;
        Ok(convert_file(
            input.as_ref(),
            &self.table,
            self.config.output_dir.as_deref(),
            self.config.replace_mode,
        ))
    }

    /// Convert every matching file in `dir`
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty table and
    /// [`ConvertError::EmptyInput`] when no file matches; both are raised
    /// before anything is written.
    pub fn convert_directory<F: FnMut(BatchEvent)>(
        &self,
        dir: impl AsRef<Path>,
        on_event: F,
    ) -> Result<BatchSummary> {
        self.run_directory(dir.as_ref(), None, on_event)
    }

    /// Convert `path` as a single file, or as a batch if it is a directory
    ///
    /// # Errors
    ///
    /// See [`Converter::convert_directory`]; a path that does not exist is
    /// an I/O error.
    pub fn convert_path<F: FnMut(BatchEvent)>(
        &self,
        path: impl AsRef<Path>,
        mut on_event: F,
    ) -> Result<BatchSummary> {
        let path = path.as_ref();
        if path.is_dir() {
            return self.convert_directory(path, on_event);
        }
        if !path.exists() {
            return Err(ConvertError::io(
                "convert",
                path.display().to_string(),
                "no such file or directory",
            ));
        }

        let start = Instant::now();
        let result = self.convert_file(path)?;
        let mut summary = BatchSummary::new(1);
        on_event(BatchEvent::FileConverted(result.clone()));
        summary.record(result);
        on_event(progress_event(&summary));
        summary.duration = start.elapsed();
        on_event(BatchEvent::Completed(summary.clone()));
        Ok(summary)
    }

    /// Run a directory batch on a blocking worker, delivering events
    /// asynchronously. Must be called from within a tokio runtime.
    pub fn spawn_directory(&self, dir: impl Into<PathBuf>) -> BatchHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = Arc::new(AtomicBool::new(false));

        let converter = self.clone();
        let dir = dir.into();
        let flag = Arc::clone(&cancel);
        let task = tokio::task::spawn_blocking(move || {
            converter.run_directory(&dir, Some(flag.as_ref()), |event| {
                let _ = tx.send(event);
            })
        });

        BatchHandle {
            events: rx,
            cancel,
            task,
        }
    }

    fn run_directory<F: FnMut(BatchEvent)>(
        &self,
        dir: &Path,
        cancel: Option<&AtomicBool>,
        mut on_event: F,
    ) -> Result<BatchSummary> {
        self.ensure_table()?;

        let files = self.discover(dir)?;
        if files.is_empty() {
            return Err(ConvertError::empty_input(
                dir.display().to_string(),
                &self.config.suffix,
            ));
        }
        self.ensure_output_dir()?;

        let start = Instant::now();
        let mut summary = BatchSummary::new(files.len());
        info!("Converting {} files in {}", files.len(), dir.display());

        for file in &files {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                info!("Batch cancelled after {} files", summary.processed);
                return Err(ConvertError::Cancelled);
            }

            let result = convert_file(
                file,
                &self.table,
                self.config.output_dir.as_deref(),
                self.config.replace_mode,
            );
            let failed = !result.success;

            on_event(BatchEvent::FileConverted(result.clone()));
            summary.record(result);
            on_event(progress_event(&summary));

            if failed && self.config.failure_policy == FailurePolicy::StopOnFirstError {
                warn!("Stopping batch after failure in {}", file.display());
                summary.stopped_early = true;
                break;
            }
        }

        summary.duration = start.elapsed();
        info!("Batch finished: {}", summary);
        on_event(BatchEvent::Completed(summary.clone()));
        Ok(summary)
    }
}

fn progress_event(summary: &BatchSummary) -> BatchEvent {
    BatchEvent::Progress {
        percent: summary.percent(),
        processed: summary.processed,
        succeeded: summary.succeeded,
        total: summary.total,
    }
}
