//! Shared read-only access to an opened dictionary file.
//!
//! Every lazy list in an opened dictionary keeps an [`Arc<DictFile>`] and
//! reads elements by absolute offset. The handle serialises the seek+read
//! pair under a single mutex so the dictionary can be shared across threads
//! for reads. [`SectionReader`] layers a positioned, buffered [`Read`] on top
//! so element decoders don't take the mutex per byte.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;

use crate::{DictError, Result};

/// Shared handle to an opened dictionary file.
///
/// `close()` releases the underlying handle; any read issued afterwards,
/// including through lists created before the close, fails with `Closed`.
pub struct DictFile {
    inner: Mutex<Option<File>>,
    len: u64,
}

impl DictFile {
    /// Opens the file at `path` read-only and captures its length.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Arc<Self>> {
        let file = File::open(&path)?;
        let len = file.metadata()?.len();
        debug!("opened {} ({} bytes)", path.as_ref().display(), len);
        Ok(Arc::new(Self {
            inner: Mutex::new(Some(file)),
            len,
        }))
    }

    /// Total file length in bytes, captured at open time.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn lock(&self) -> MutexGuard<'_, Option<File>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Reads exactly `buf.len()` bytes starting at `offset`.
    ///
    /// The seek and the read happen under one lock so concurrent readers
    /// cannot interleave cursor moves.
    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let end = offset + buf.len() as u64;
        if end > self.len {
            return Err(DictError::corrupt(format!(
                "read past end of file: {} > {}",
                end, self.len
            )));
        }
        let mut guard = self.lock();
        let file = guard.as_mut().ok_or_else(DictError::closed)?;
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)?;
        Ok(())
    }

    /// Releases the file handle. Idempotent.
    pub fn close(&self) {
        *self.lock() = None;
    }

    pub fn is_closed(&self) -> bool {
        self.lock().is_none()
    }
}

const READ_AHEAD: usize = 8 * 1024;

/// Positioned reader over a shared [`DictFile`].
///
/// Keeps a small read-ahead buffer; `position`/`set_position` let a decoder
/// skip over a nested list to its end offset.
pub struct SectionReader {
    file: Arc<DictFile>,
    pos: u64,
    buf: Vec<u8>,
    buf_start: u64,
}

impl SectionReader {
    pub fn new(file: Arc<DictFile>, pos: u64) -> Self {
        Self {
            file,
            pos,
            buf: Vec::new(),
            buf_start: 0,
        }
    }

    pub fn file(&self) -> &Arc<DictFile> {
        &self.file
    }

    /// Absolute offset of the next byte this reader will yield.
    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn set_position(&mut self, pos: u64) {
        self.pos = pos;
    }
}

impl Read for SectionReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        if self.pos >= self.buf_start {
            let off = (self.pos - self.buf_start) as usize;
            if off < self.buf.len() {
                let n = (self.buf.len() - off).min(out.len());
                out[..n].copy_from_slice(&self.buf[off..off + n]);
                self.pos += n as u64;
                return Ok(n);
            }
        }
        let remaining = self.file.len().saturating_sub(self.pos);
        if remaining == 0 {
            return Ok(0);
        }
        let chunk = remaining.min(READ_AHEAD.max(out.len()) as u64) as usize;
        self.buf.resize(chunk, 0);
        self.file
            .read_at(self.pos, &mut self.buf)
            .map_err(io::Error::other)?;
        self.buf_start = self.pos;
        let n = chunk.min(out.len());
        out[..n].copy_from_slice(&self.buf[..n]);
        self.pos += n as u64;
        Ok(n)
    }
}
