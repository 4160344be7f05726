//! Adapter from `std::io` readers to the stream traits.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

use crate::stream::{ReadStream, SeekableReadStream, Stream, resolve_seek};

/// Seekable stream over any `std::io` reader.
///
/// The total length is probed once at construction. Transport errors set the
/// sticky failure flag and surface as zero-length reads; end-of-data is
/// discovered lazily through short reads.
#[derive(Debug)]
pub struct IoReadStream<T: Read + Seek> {
    inner: T,
    pos: u64,
    size: u64,
    hit_end: bool,
    io_failed: bool,
}

impl<T: Read + Seek> IoReadStream<T> {
    /// Wrap `inner`, probing its length with a seek to the end.
    ///
    /// The reader is restored to its original position afterwards.
    pub fn new(mut inner: T) -> io::Result<Self> {
        let pos = inner.stream_position()?;
        let size = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(pos))?;
        Ok(Self {
            inner,
            pos,
            size,
            hit_end: false,
            io_failed: false,
        })
    }

    /// Consume the adapter and hand the reader back.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl IoReadStream<File> {
    /// Open `path` as a stream.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        let stream = Self::new(File::open(path)?)?;
        debug!(path = %path.display(), size = stream.size, "opened file stream");
        Ok(stream)
    }
}

/// Stream over a file on disk.
pub type FileStream = IoReadStream<File>;

impl<T: Read + Seek> Stream for IoReadStream<T> {
    fn io_failed(&self) -> bool {
        self.io_failed
    }

    fn clear_io_failed(&mut self) {
        self.io_failed = false;
    }
}

impl<T: Read + Seek> ReadStream for IoReadStream<T> {
    fn eos(&self) -> bool {
        self.hit_end || self.pos >= self.size
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let mut total = 0;
        while total < buf.len() {
            match self.inner.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(_) => {
                    self.io_failed = true;
                    break;
                }
            }
        }
        self.pos += total as u64;
        if total < buf.len() && !buf.is_empty() {
            self.hit_end = true;
        }
        total
    }
}

impl<T: Read + Seek> SeekableReadStream for IoReadStream<T> {
    fn pos(&self) -> u64 {
        self.pos
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn seek(&mut self, from: SeekFrom) -> u64 {
        let target = resolve_seek(from, self.pos, self.size);
        match self.inner.seek(SeekFrom::Start(target)) {
            Ok(p) => {
                self.pos = p;
                self.hit_end = false;
            }
            Err(_) => self.io_failed = true,
        }
        self.pos
    }
}
