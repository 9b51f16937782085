//! Batch summaries, events, and the async batch handle

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use crate::{ConversionResult, ConvertError, Result};

/// A notification from a running batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    /// One file finished, successfully or not
    FileConverted(ConversionResult),
    /// Sent after every file
    Progress {
        /// `floor(processed / total * 100)`
        percent: u8,
        processed: usize,
        succeeded: usize,
        total: usize,
    },
    /// The batch ran to its end
    Completed(BatchSummary),
}

/// Result of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Files selected for the batch
    pub total: usize,
    /// Files actually attempted
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Per-file results in processing order
    pub results: Vec<ConversionResult>,
    /// Whether the failure policy ended the batch early
    pub stopped_early: bool,
    /// Total processing time
    pub duration: Duration,
}

impl BatchSummary {
    pub(crate) fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub(crate) fn record(&mut self, result: ConversionResult) {
        self.processed += 1;
        if result.success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(result);
    }

    /// Percentage of selected files attempted so far
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        u8::try_from((self.processed * 100 / self.total).min(100)).unwrap_or(100)
    }

    /// Whether every selected file was converted
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.processed == self.total
    }

    /// Results of the files that failed
    pub fn failures(&self) -> impl Iterator<Item = &ConversionResult> {
        self.results.iter().filter(|r| !r.success)
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} files converted successfully",
            self.succeeded, self.total
        )
    }
}

/// Receiving side of a batch running on a background worker
#[derive(Debug)]
pub struct BatchHandle {
    pub(crate) events: UnboundedReceiver<BatchEvent>,
    pub(crate) cancel: Arc<AtomicBool>,
    pub(crate) task: JoinHandle<Result<BatchSummary>>,
}

impl BatchHandle {
    /// Stop the batch before its next file
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Next event, or `None` once the worker is done
    pub async fn next_event(&mut self) -> Option<BatchEvent> {
        self.events.recv().await
    }

    /// Wait for the batch, forwarding every event to `on_event`
    ///
    /// # Errors
    ///
    /// Returns the error that stopped the batch, or
    /// [`ConvertError::Worker`] if the worker panicked.
    pub async fn wait<F: FnMut(BatchEvent)>(mut self, mut on_event: F) -> Result<BatchSummary> {
        while let Some(event) = self.events.recv().await {
            on_event(event);
        }
        self.task
            .await
            .map_err(|e| ConvertError::Worker(e.to_string()))?
    }

    /// Wait for the batch, discarding events
    ///
    /// # Errors
    ///
    /// See [`BatchHandle::wait`].
    pub async fn finish(self) -> Result<BatchSummary> {
        self.wait(|_| {}).await
    }
}
