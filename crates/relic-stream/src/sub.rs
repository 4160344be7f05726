//! Bounded window views over a parent stream.
//!
//! Archive readers hand out "virtual files" by wrapping the container stream
//! in one of these instead of copying the embedded resource out.

use std::io::SeekFrom;

use crate::stream::{ReadStream, SeekableReadStream, Stream, resolve_seek};

/// Forward-only view of the next `len` bytes of a parent stream.
///
/// The window starts at the parent's current position. Reads never advance
/// the parent past the window, so the parent can be reused afterwards.
/// There is deliberately no way to seek this type.
#[derive(Debug)]
pub struct SubReadStream<R: ReadStream> {
    parent: R,
    remaining: u64,
}

impl<R: ReadStream> SubReadStream<R> {
    /// Create a window of `len` bytes over `parent`.
    ///
    /// Pass `&mut parent` to keep ownership of the parent at the call site.
    pub fn new(parent: R, len: u64) -> Self {
        Self {
            parent,
            remaining: len,
        }
    }

    /// Bytes left in the window.
    pub const fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Consume the view and hand the parent back.
    ///
    /// The parent's cursor is wherever the view left it, never past the
    /// window's end.
    pub fn into_inner(self) -> R {
        self.parent
    }
}

impl<R: ReadStream> Stream for SubReadStream<R> {
    fn io_failed(&self) -> bool {
        self.parent.io_failed()
    }

    fn clear_io_failed(&mut self) {
        self.parent.clear_io_failed();
    }
}

impl<R: ReadStream> ReadStream for SubReadStream<R> {
    fn eos(&self) -> bool {
        self.remaining == 0 || self.parent.eos()
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let want = buf.len().min(usize::try_from(self.remaining).unwrap_or(usize::MAX));
        let n = self.parent.read(&mut buf[..want]);
        self.remaining -= n as u64;
        n
    }
}

/// Seekable zero-based view of the parent range `[begin, end)`.
///
/// All offsets exposed by this type are relative to `begin`; `seek`
/// translates them back into parent coordinates and clamps into the window.
#[derive(Debug)]
pub struct SeekableSubReadStream<S: SeekableReadStream> {
    parent: S,
    begin: u64,
    end: u64,
}

impl<S: SeekableReadStream> SeekableSubReadStream<S> {
    /// Create a view of `parent[begin..end]`.
    ///
    /// The range is clamped to the parent's length and the parent is
    /// positioned at `begin`.
    pub fn new(mut parent: S, begin: u64, end: u64) -> Self {
        let end = end.min(parent.size());
        let begin = begin.min(end);
        parent.seek(SeekFrom::Start(begin));
        Self { parent, begin, end }
    }

    /// Consume the view and hand the parent back.
    pub fn into_inner(self) -> S {
        self.parent
    }
}

impl<S: SeekableReadStream> Stream for SeekableSubReadStream<S> {
    fn io_failed(&self) -> bool {
        self.parent.io_failed()
    }

    fn clear_io_failed(&mut self) {
        self.parent.clear_io_failed();
    }
}

impl<S: SeekableReadStream> ReadStream for SeekableSubReadStream<S> {
    fn eos(&self) -> bool {
        self.parent.pos() >= self.end || self.parent.eos()
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let avail = self.end.saturating_sub(self.parent.pos());
        let want = buf.len().min(usize::try_from(avail).unwrap_or(usize::MAX));
        self.parent.read(&mut buf[..want])
    }
}

impl<S: SeekableReadStream> SeekableReadStream for SeekableSubReadStream<S> {
    fn pos(&self) -> u64 {
        self.parent.pos().saturating_sub(self.begin)
    }

    fn size(&self) -> u64 {
        self.end - self.begin
    }

    fn seek(&mut self, from: SeekFrom) -> u64 {
        let target = resolve_seek(from, self.pos(), self.size());
        self.parent.seek(SeekFrom::Start(self.begin + target));
        target
    }
}
