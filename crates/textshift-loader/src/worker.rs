//! Background file loading
//!
//! Every [`FileLoader::load`] call spawns one worker thread that owns the
//! open file for the whole read and is the only producer of that load's
//! events. Events reach the caller over an unbounded tokio channel, so the
//! handle can be drained from async code or from a plain thread.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use dashmap::DashSet;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::reader::ChunkedReader;
use crate::{LoadError, LoaderConfig, Result};

/// A notification from a running load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    /// Percentage of the file decoded so far, 0..=100
    Progress(u8),
    /// Terminal event, sent exactly once
    Finished(Result<LoadedText>),
}

/// Text produced by a successful load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedText {
    pub path: PathBuf,
    pub content: String,
}

impl LoadedText {
    pub fn byte_len(&self) -> usize {
        self.content.len()
    }

    /// Number of lines, counting a final line without a newline
    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }

    pub fn size_kib(&self) -> f64 {
        self.content.len() as f64 / 1024.0
    }

    /// One-line description: `name | size KB | lines`
    pub fn summary(&self) -> String {
        let name = self
            .path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned());
        format!(
            "File: {} | Size: {:.1} KB | Lines: {}",
            name,
            self.size_kib(),
            self.line_count()
        )
    }
}

/// Starts loads and keeps at most one in flight per path
#[derive(Debug, Clone)]
pub struct FileLoader {
    config: LoaderConfig,
    in_flight: Arc<DashSet<PathBuf>>,
}

impl Default for FileLoader {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl FileLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            in_flight: Arc::new(DashSet::new()),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(LoaderConfig::default())
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Whether a load of `path` is still running
    pub fn is_loading(&self, path: impl AsRef<Path>) -> bool {
        self.in_flight.contains(&slot_key(path.as_ref()))
    }

    /// Start loading `path` on a background worker.
    ///
    /// Failures to open or read the file are reported through the returned
    /// handle's terminal event, not here.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::AlreadyLoading`] when a load of the same path is
    /// still running, and [`LoadError::WorkerFailed`] when the worker thread
    /// cannot be spawned.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<LoadHandle> {
        let path = path.as_ref().to_path_buf();
        let key = slot_key(&path);

        if !self.in_flight.insert(key.clone()) {
            warn!("Rejected overlapping load of {}", path.display());
            return Err(LoadError::AlreadyLoading(path.display().to_string()));
        }
        let slot = SlotGuard {
            set: Arc::clone(&self.in_flight),
            key,
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let reader =
            ChunkedReader::new(self.config.chunk_size).with_cancel_flag(Arc::clone(&cancel));

        let worker_path = path.clone();
        let worker_cancel = Arc::clone(&cancel);
        thread::Builder::new()
            .name("textshift-loader".to_string())
            .spawn(move || run_load(&reader, worker_path, &tx, &worker_cancel, slot))
            .map_err(|e| LoadError::WorkerFailed(e.to_string()))?;

        info!("Started loading {}", path.display());
        Ok(LoadHandle {
            path,
            events: rx,
            cancel,
            finished: false,
        })
    }
}

fn slot_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Frees the in-flight slot when the worker is done, even if it panics
struct SlotGuard {
    set: Arc<DashSet<PathBuf>>,
    key: PathBuf,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.set.remove(&self.key);
    }
}

fn run_load(
    reader: &ChunkedReader,
    path: PathBuf,
    tx: &UnboundedSender<LoadEvent>,
    cancel: &AtomicBool,
    slot: SlotGuard,
) {
    let label = path.display().to_string();

    let result = File::open(&path)
        .map_err(|e| LoadError::io("open", &label, e.to_string()))
        .and_then(|file| {
            reader.read(file, &label, |percent| {
                // Nobody is listening any more
                if tx.send(LoadEvent::Progress(percent)).is_err() {
                    cancel.store(true, Ordering::Relaxed);
                }
            })
        })
        .map(|content| LoadedText {
            path: path.clone(),
            content,
        });

    match &result {
        Ok(text) => debug!("Loaded {} ({} bytes)", label, text.byte_len()),
        Err(e) => warn!("Load of {} failed: {}", label, e),
    }

    // Free the slot first so a caller reacting to the terminal event can
    // start the next load of the same path.
    drop(slot);
    let _ = tx.send(LoadEvent::Finished(result));
}

/// Receiving side of a running load
#[derive(Debug)]
pub struct LoadHandle {
    path: PathBuf,
    events: UnboundedReceiver<LoadEvent>,
    cancel: Arc<AtomicBool>,
    finished: bool,
}

impl LoadHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ask the worker to stop before its next chunk
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Next event, or `None` after the terminal event has been taken
    pub async fn next_event(&mut self) -> Option<LoadEvent> {
        if self.finished {
            return None;
        }
        let event = self.events.recv().await;
        self.observe(event)
    }

    /// Blocking variant of [`LoadHandle::next_event`] for non-async callers.
    ///
    /// Must not be called from within an async runtime.
    pub fn blocking_next_event(&mut self) -> Option<LoadEvent> {
        if self.finished {
            return None;
        }
        let event = self.events.blocking_recv();
        self.observe(event)
    }

    fn observe(&mut self, event: Option<LoadEvent>) -> Option<LoadEvent> {
        match event {
            Some(LoadEvent::Finished(result)) => {
                self.finished = true;
                Some(LoadEvent::Finished(result))
            }
            Some(progress) => Some(progress),
            None => {
                self.finished = true;
                Some(LoadEvent::Finished(Err(LoadError::WorkerFailed(
                    "worker exited without a result".to_string(),
                ))))
            }
        }
    }

    /// Drain the load, forwarding progress, and return its outcome
    ///
    /// # Errors
    ///
    /// Returns the load's terminal error.
    pub async fn wait<F: FnMut(u8)>(mut self, mut on_progress: F) -> Result<LoadedText> {
        while let Some(event) = self.next_event().await {
            match event {
                LoadEvent::Progress(percent) => on_progress(percent),
                LoadEvent::Finished(result) => return result,
            }
        }
        Err(LoadError::WorkerFailed("load already finished".to_string()))
    }

    /// Drain the load ignoring progress
    ///
    /// # Errors
    ///
    /// Returns the load's terminal error.
    pub async fn finish(self) -> Result<LoadedText> {
        self.wait(|_| {}).await
    }

    /// Blocking variant of [`LoadHandle::wait`]
    ///
    /// # Errors
    ///
    /// Returns the load's terminal error.
    pub fn wait_blocking<F: FnMut(u8)>(mut self, mut on_progress: F) -> Result<LoadedText> {
        while let Some(event) = self.blocking_next_event() {
            match event {
                LoadEvent::Progress(percent) => on_progress(percent),
                LoadEvent::Finished(result) => return result,
            }
        }
        Err(LoadError::WorkerFailed("load already finished".to_string()))
    }
}
