//! Streams over caller-owned memory buffers.

use std::io::SeekFrom;

use crate::stream::{ReadStream, SeekableReadStream, Stream, WriteStream, resolve_seek};

/// Read stream over a borrowed byte slice.
///
/// The buffer stays owned by the caller; the borrow ties the stream's
/// lifetime to it. An optional single-byte XOR key decrypts data
/// transparently as it is copied out, with no effect on position or
/// end-of-stream bookkeeping.
#[derive(Debug)]
pub struct MemoryReadStream<'a> {
    data: &'a [u8],
    pos: usize,
    xor_key: u8,
    io_failed: bool,
}

impl<'a> MemoryReadStream<'a> {
    /// Create a stream over `data`.
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            xor_key: 0,
            io_failed: false,
        }
    }

    /// Create a stream that XORs every byte read with `key`.
    ///
    /// A key of zero is equivalent to [`new`](Self::new).
    pub const fn with_key(data: &'a [u8], key: u8) -> Self {
        Self {
            data,
            pos: 0,
            xor_key: key,
            io_failed: false,
        }
    }
}

impl Stream for MemoryReadStream<'_> {
    fn io_failed(&self) -> bool {
        self.io_failed
    }

    fn clear_io_failed(&mut self) {
        self.io_failed = false;
    }
}

impl ReadStream for MemoryReadStream<'_> {
    fn eos(&self) -> bool {
        self.pos == self.data.len()
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let avail = self.data.len() - self.pos;
        let n = buf.len().min(avail);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        if self.xor_key != 0 {
            for b in &mut buf[..n] {
                *b ^= self.xor_key;
            }
        }
        self.pos += n;
        n
    }
}

impl SeekableReadStream for MemoryReadStream<'_> {
    fn pos(&self) -> u64 {
        self.pos as u64
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn seek(&mut self, from: SeekFrom) -> u64 {
        let target = resolve_seek(from, self.pos as u64, self.data.len() as u64);
        self.pos = target as usize;
        target
    }
}

/// Write stream over a borrowed, fixed-size byte slice.
///
/// Writing past the end of the buffer truncates the write and sets the
/// sticky failure flag.
#[derive(Debug)]
pub struct MemoryWriteStream<'a> {
    data: &'a mut [u8],
    pos: usize,
    io_failed: bool,
}

impl<'a> MemoryWriteStream<'a> {
    /// Create a write stream over `data`.
    pub fn new(data: &'a mut [u8]) -> Self {
        Self {
            data,
            pos: 0,
            io_failed: false,
        }
    }

    /// Number of bytes written so far.
    pub const fn bytes_written(&self) -> usize {
        self.pos
    }
}

impl Stream for MemoryWriteStream<'_> {
    fn io_failed(&self) -> bool {
        self.io_failed
    }

    fn clear_io_failed(&mut self) {
        self.io_failed = false;
    }
}

impl WriteStream for MemoryWriteStream<'_> {
    fn write(&mut self, buf: &[u8]) -> usize {
        let avail = self.data.len() - self.pos;
        let n = buf.len().min(avail);
        if buf.len() > avail {
            self.io_failed = true;
        }
        self.data[self.pos..self.pos + n].copy_from_slice(&buf[..n]);
        self.pos += n;
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn read_clamps_and_advances_by_actual_count() {
        let data = [10u8, 20, 30];
        let mut s = MemoryReadStream::new(&data);
        let mut buf = [0u8; 5];

        assert_eq!(s.read(&mut buf), 3);
        assert_eq!(&buf[..3], &[10, 20, 30]);
        assert_eq!(s.pos(), 3);
        assert!(s.eos());
        // Running out of data is not a transport failure.
        assert!(!s.io_failed());
    }

    #[test]
    fn eos_boundary_behavior() {
        let data = [1u8, 2];
        let mut s = MemoryReadStream::new(&data);
        assert!(!s.eos());

        assert_eq!(s.read_byte(), Some(1));
        assert!(!s.eos());
        assert_eq!(s.read_byte(), Some(2));
        assert!(s.eos());

        // Stays at end until a seek moves the cursor back.
        assert_eq!(s.read_byte(), None);
        assert!(s.eos());
        s.seek(SeekFrom::Start(1));
        assert!(!s.eos());
        assert_eq!(s.read_byte(), Some(2));
    }

    #[test]
    fn xor_key_decrypts_on_read() {
        let data = [0x10u8, 0x20];
        let mut s = MemoryReadStream::with_key(&data, 0xFF);
        assert_eq!(s.read_byte(), Some(0xEF));
        assert_eq!(s.read_byte(), Some(0xDF));
        assert!(s.eos());
        assert_eq!(s.pos(), 2);
    }

    #[test]
    fn seek_clamps_out_of_range_targets() {
        let data = [0u8; 8];
        let mut s = MemoryReadStream::new(&data);

        assert_eq!(s.seek(SeekFrom::Start(100)), 8);
        assert_eq!(s.seek(SeekFrom::Current(-100)), 0);
        assert_eq!(s.seek(SeekFrom::End(-3)), 5);
        assert_eq!(s.pos(), 5);
    }

    #[test]
    fn repeated_seeks_to_same_offset_are_idempotent() {
        let data: Vec<u8> = (0u8..10).collect();
        let mut s = MemoryReadStream::new(&data);

        s.seek(SeekFrom::Start(7));
        let first = s.read_byte();
        s.seek(SeekFrom::End(-3));
        let second = s.read_byte();
        assert_eq!(first, second);
        assert_eq!(first, Some(7));
    }

    #[test]
    fn write_stream_mirrors_reader_byte_order() {
        let mut buf = [0u8; 8];
        {
            let mut w = MemoryWriteStream::new(&mut buf);
            assert!(w.write_u32_le(0x0403_0201));
            assert!(w.write_u32_be(0x0102_0304));
            assert_eq!(w.bytes_written(), 8);
            assert!(!w.io_failed());
        }
        assert_eq!(buf, [1, 2, 3, 4, 1, 2, 3, 4]);
    }

    #[test]
    fn write_overflow_truncates_and_flags() {
        let mut buf = [0u8; 2];
        let mut w = MemoryWriteStream::new(&mut buf);
        assert_eq!(w.write(&[9, 9, 9]), 2);
        assert!(w.io_failed());
    }
}
