//! Read-ahead caching decorators.
//!
//! A buffered stream issues at most one parent read per cache refill and is
//! otherwise observationally transparent: the byte sequence it produces is
//! identical to the parent's for every cache size, including sizes that do
//! not divide the stream length.

use std::io::SeekFrom;
use tracing::trace;

use crate::stream::{ReadStream, SeekableReadStream, Stream, resolve_seek};

/// Streaming read-ahead cache over a forward-only parent.
///
/// A cache size of zero degrades to a direct pass-through.
#[derive(Debug)]
pub struct BufferedReadStream<R: ReadStream> {
    parent: R,
    buf: Vec<u8>,
    buf_pos: usize,
    buf_size: usize,
}

impl<R: ReadStream> BufferedReadStream<R> {
    /// Wrap `parent` with a cache of `buf_size` bytes.
    pub fn new(parent: R, buf_size: usize) -> Self {
        Self {
            parent,
            buf: Vec::with_capacity(buf_size),
            buf_pos: 0,
            buf_size,
        }
    }

    /// Consume the decorator and hand the parent back.
    ///
    /// Bytes sitting in the cache are discarded; the parent has already
    /// advanced past them.
    pub fn into_inner(self) -> R {
        self.parent
    }

    fn cached(&self) -> usize {
        self.buf.len() - self.buf_pos
    }

    /// Refill the cache with exactly one parent read.
    fn fill(&mut self) {
        self.buf.resize(self.buf_size, 0);
        let n = self.parent.read(&mut self.buf);
        self.buf.truncate(n);
        self.buf_pos = 0;
        trace!(requested = self.buf_size, got = n, "cache refill");
    }
}

impl<R: ReadStream> Stream for BufferedReadStream<R> {
    fn io_failed(&self) -> bool {
        self.parent.io_failed()
    }

    fn clear_io_failed(&mut self) {
        self.parent.clear_io_failed();
    }
}

impl<R: ReadStream> ReadStream for BufferedReadStream<R> {
    fn eos(&self) -> bool {
        // An empty cache alone is not end-of-stream.
        self.cached() == 0 && self.parent.eos()
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        if self.buf_size == 0 {
            return self.parent.read(buf);
        }
        let mut copied = 0;
        while copied < buf.len() {
            if self.cached() > 0 {
                let n = (buf.len() - copied).min(self.cached());
                buf[copied..copied + n]
                    .copy_from_slice(&self.buf[self.buf_pos..self.buf_pos + n]);
                self.buf_pos += n;
                copied += n;
            } else if self.parent.eos() {
                break;
            } else {
                self.fill();
                if self.buf.is_empty() {
                    break;
                }
            }
        }
        copied
    }
}

/// Read-ahead cache with seek support.
///
/// Tracks the parent offset of the first cached byte so that a seek landing
/// inside the cached window repositions the cursor without touching the
/// parent.
#[derive(Debug)]
pub struct BufferedSeekableReadStream<S: SeekableReadStream> {
    parent: S,
    buf: Vec<u8>,
    buf_pos: usize,
    buf_size: usize,
    /// Parent offset of `buf[0]`.
    buf_start: u64,
}

impl<S: SeekableReadStream> BufferedSeekableReadStream<S> {
    /// Wrap `parent` with a cache of `buf_size` bytes.
    pub fn new(parent: S, buf_size: usize) -> Self {
        let buf_start = parent.pos();
        Self {
            parent,
            buf: Vec::with_capacity(buf_size),
            buf_pos: 0,
            buf_size,
            buf_start,
        }
    }

    /// Consume the decorator and hand the parent back.
    pub fn into_inner(self) -> S {
        self.parent
    }

    fn cached(&self) -> usize {
        self.buf.len() - self.buf_pos
    }

    fn fill(&mut self) {
        self.buf_start = self.parent.pos();
        self.buf.resize(self.buf_size, 0);
        let n = self.parent.read(&mut self.buf);
        self.buf.truncate(n);
        self.buf_pos = 0;
        trace!(
            requested = self.buf_size,
            got = n,
            base = self.buf_start,
            "cache refill"
        );
    }
}

impl<S: SeekableReadStream> Stream for BufferedSeekableReadStream<S> {
    fn io_failed(&self) -> bool {
        self.parent.io_failed()
    }

    fn clear_io_failed(&mut self) {
        self.parent.clear_io_failed();
    }
}

impl<S: SeekableReadStream> ReadStream for BufferedSeekableReadStream<S> {
    fn eos(&self) -> bool {
        self.cached() == 0 && self.parent.eos()
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        if self.buf_size == 0 {
            return self.parent.read(buf);
        }
        let mut copied = 0;
        while copied < buf.len() {
            if self.cached() > 0 {
                let n = (buf.len() - copied).min(self.cached());
                buf[copied..copied + n]
                    .copy_from_slice(&self.buf[self.buf_pos..self.buf_pos + n]);
                self.buf_pos += n;
                copied += n;
            } else if self.parent.eos() {
                break;
            } else {
                self.fill();
                if self.buf.is_empty() {
                    break;
                }
            }
        }
        copied
    }
}

impl<S: SeekableReadStream> SeekableReadStream for BufferedSeekableReadStream<S> {
    fn pos(&self) -> u64 {
        if self.buf_size == 0 {
            self.parent.pos()
        } else {
            self.buf_start + self.buf_pos as u64
        }
    }

    fn size(&self) -> u64 {
        self.parent.size()
    }

    fn seek(&mut self, from: SeekFrom) -> u64 {
        let target = resolve_seek(from, self.pos(), self.size());
        if self.buf_size > 0
            && target >= self.buf_start
            && target < self.buf_start + self.buf.len() as u64
        {
            // Inside the cached window: reposition without parent I/O.
            self.buf_pos = (target - self.buf_start) as usize;
            trace!(target, base = self.buf_start, "seek inside cache");
        } else {
            self.parent.seek(SeekFrom::Start(target));
            self.buf.clear();
            self.buf_pos = 0;
            self.buf_start = target;
            trace!(target, "seek invalidated cache");
        }
        target
    }
}
