//! Chunked UTF-8 reading with progress reporting
//!
//! The total size is taken up front by seeking to the end of the source and
//! back, so the source must be seekable. Each chunk is decoded as UTF-8; a
//! multi-byte sequence split across two chunks is carried into the next one.
//! After every chunk the reader reports `floor(decoded / total * 100)`.

use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace};

use crate::config::DEFAULT_CHUNK_SIZE;
use crate::{LoadError, Result};

/// Reads a seekable source in fixed-size chunks
#[derive(Debug, Clone)]
pub struct ChunkedReader {
    chunk_size: usize,
    cancel: Option<Arc<AtomicBool>>,
}

impl Default for ChunkedReader {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl ChunkedReader {
    /// Create a reader; a zero chunk size is raised to one
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            cancel: None,
        }
    }

    /// Stop between chunks once `flag` is set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Read the whole source, calling `on_progress` once per chunk.
    ///
    /// `label` names the source in errors. An empty source reports 100 once.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] when seeking or reading fails,
    /// [`LoadError::Decoding`] on invalid or truncated UTF-8, and
    /// [`LoadError::Cancelled`] when the cancel flag is observed.
    pub fn read<R, F>(&self, mut source: R, label: &str, mut on_progress: F) -> Result<String>
    where
        R: Read + Seek,
        F: FnMut(u8),
    {
        let total = source
            .seek(SeekFrom::End(0))
            .map_err(|e| LoadError::io("seek", label, e.to_string()))?;
        source
            .seek(SeekFrom::Start(0))
            .map_err(|e| LoadError::io("seek", label, e.to_string()))?;
        debug!("Reading {} ({} bytes, {} byte chunks)", label, total, self.chunk_size);

        let mut content = String::with_capacity(usize::try_from(total).unwrap_or(0));
        let mut chunk = vec![0u8; self.chunk_size];
        let mut pending: Vec<u8> = Vec::with_capacity(self.chunk_size + 4);
        let mut decoded: u64 = 0;
        let mut chunks = 0usize;

        loop {
            if self.is_cancelled() {
                debug!("Read of {} cancelled after {} chunks", label, chunks);
                return Err(LoadError::Cancelled);
            }

            let n = fill_chunk(&mut source, &mut chunk)
                .map_err(|e| LoadError::io("read", label, e.to_string()))?;
            if n == 0 {
                break;
            }

            pending.extend_from_slice(&chunk[..n]);
            let valid = decode_prefix(&pending, &mut content)
                .map_err(|offset| LoadError::decoding(label, decoded + offset as u64))?;
            pending.drain(..valid);
            decoded += valid as u64;
            chunks += 1;

            let percent = percent(decoded, total);
            trace!("Chunk {} of {}: {}%", chunks, label, percent);
            on_progress(percent);
        }

        if !pending.is_empty() {
            return Err(LoadError::decoding(label, decoded));
        }
        if chunks == 0 {
            on_progress(100);
        }

        debug!("Finished {} in {} chunks", label, chunks);
        Ok(content)
    }
}

/// Read `source` with the given chunk size and no cancellation
///
/// # Errors
///
/// See [`ChunkedReader::read`].
pub fn read_chunked<R, F>(source: R, chunk_size: usize, on_progress: F) -> Result<String>
where
    R: Read + Seek,
    F: FnMut(u8),
{
    ChunkedReader::new(chunk_size).read(source, "<stream>", on_progress)
}

/// Fill `buf` unless the source ends first; returns the bytes read.
fn fill_chunk<R: Read>(source: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Append the longest valid UTF-8 prefix of `bytes` to `out`.
///
/// Returns how many bytes were consumed. An incomplete sequence at the end
/// is left for the next chunk; an invalid sequence yields its offset.
fn decode_prefix(bytes: &[u8], out: &mut String) -> std::result::Result<usize, usize> {
    match std::str::from_utf8(bytes) {
        Ok(text) => {
            out.push_str(text);
            Ok(bytes.len())
        }
        Err(e) if e.error_len().is_some() => Err(e.valid_up_to()),
        Err(e) => {
            let valid = e.valid_up_to();
            let text = std::str::from_utf8(&bytes[..valid]).map_err(|_| valid)?;
            out.push_str(text);
            Ok(valid)
        }
    }
}

fn percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let value = (u128::from(done) * 100 / u128::from(total)).min(100);
    u8::try_from(value).unwrap_or(100)
}
