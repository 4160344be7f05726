//! Capability traits for byte-oriented I/O.
//!
//! Every multi-byte reader is a fixed composition of `read_byte` calls: a
//! 16-bit read is two bytes in the specified order, a 32-bit read is two
//! 16-bit halves. Resource formats are byte-exact, so the composition order
//! is part of the contract, not an implementation detail.

use std::io::SeekFrom;

/// Base capability shared by readable and writable streams.
///
/// The failure flag is sticky: once set by a transport error or short
/// transfer it stays set until [`clear_io_failed`](Stream::clear_io_failed)
/// is called. End-of-stream is not a failure and is reported separately.
pub trait Stream {
    /// Whether a previous operation failed at the transport level.
    fn io_failed(&self) -> bool;

    /// Reset the failure flag.
    fn clear_io_failed(&mut self);
}

/// A stream that can be read from.
pub trait ReadStream: Stream {
    /// True when the stream cannot deliver any further bytes.
    ///
    /// Memory-backed streams report this eagerly (`pos == len`); adapters
    /// over external transports may only discover the end through a short
    /// read. Either way the answer is stable until the cursor moves.
    fn eos(&self) -> bool;

    /// Read up to `buf.len()` bytes, returning the count actually copied.
    ///
    /// The cursor advances by the returned count, never by the requested
    /// amount when they differ.
    fn read(&mut self, buf: &mut [u8]) -> usize;

    /// Read a single byte, or `None` at end of stream.
    fn read_byte(&mut self) -> Option<u8> {
        let mut b = [0u8; 1];
        if self.read(&mut b) == 1 { Some(b[0]) } else { None }
    }

    /// Read a signed byte.
    fn read_i8(&mut self) -> Option<i8> {
        self.read_byte().map(|b| b as i8)
    }

    /// Read a little-endian `u16` (low byte first).
    fn read_u16_le(&mut self) -> Option<u16> {
        let lo = self.read_byte()?;
        let hi = self.read_byte()?;
        Some(u16::from(lo) | (u16::from(hi) << 8))
    }

    /// Read a big-endian `u16` (high byte first).
    fn read_u16_be(&mut self) -> Option<u16> {
        let hi = self.read_byte()?;
        let lo = self.read_byte()?;
        Some((u16::from(hi) << 8) | u16::from(lo))
    }

    /// Read a little-endian `u32` as two little-endian 16-bit halves.
    fn read_u32_le(&mut self) -> Option<u32> {
        let lo = self.read_u16_le()?;
        let hi = self.read_u16_le()?;
        Some(u32::from(lo) | (u32::from(hi) << 16))
    }

    /// Read a big-endian `u32` as two big-endian 16-bit halves.
    fn read_u32_be(&mut self) -> Option<u32> {
        let hi = self.read_u16_be()?;
        let lo = self.read_u16_be()?;
        Some((u32::from(hi) << 16) | u32::from(lo))
    }

    /// Read a little-endian `i16`.
    fn read_i16_le(&mut self) -> Option<i16> {
        self.read_u16_le().map(|v| v as i16)
    }

    /// Read a big-endian `i16`.
    fn read_i16_be(&mut self) -> Option<i16> {
        self.read_u16_be().map(|v| v as i16)
    }

    /// Read a little-endian `i32`.
    fn read_i32_le(&mut self) -> Option<i32> {
        self.read_u32_le().map(|v| v as i32)
    }

    /// Read a big-endian `i32`.
    fn read_i32_be(&mut self) -> Option<i32> {
        self.read_u32_be().map(|v| v as i32)
    }
}

/// A stream that can be written to.
///
/// Typed writers mirror the typed readers byte for byte; partial writes are
/// reported through the count and the sticky failure flag.
pub trait WriteStream: Stream {
    /// Write up to `buf.len()` bytes, returning the count actually written.
    fn write(&mut self, buf: &[u8]) -> usize;

    /// Write a single byte.
    fn write_byte(&mut self, b: u8) -> bool {
        self.write(&[b]) == 1
    }

    /// Write a little-endian `u16`.
    fn write_u16_le(&mut self, v: u16) -> bool {
        self.write_byte(v as u8) && self.write_byte((v >> 8) as u8)
    }

    /// Write a big-endian `u16`.
    fn write_u16_be(&mut self, v: u16) -> bool {
        self.write_byte((v >> 8) as u8) && self.write_byte(v as u8)
    }

    /// Write a little-endian `u32` as two little-endian 16-bit halves.
    fn write_u32_le(&mut self, v: u32) -> bool {
        self.write_u16_le(v as u16) && self.write_u16_le((v >> 16) as u16)
    }

    /// Write a big-endian `u32` as two big-endian 16-bit halves.
    fn write_u32_be(&mut self, v: u32) -> bool {
        self.write_u16_be((v >> 16) as u16) && self.write_u16_be(v as u16)
    }
}

/// A readable stream with a position and a known total length.
pub trait SeekableReadStream: ReadStream {
    /// Current zero-based offset.
    fn pos(&self) -> u64;

    /// Total stream length in bytes.
    fn size(&self) -> u64;

    /// Reposition the cursor and return the new position.
    ///
    /// Targets are clamped into `[0, size]`; an out-of-range request never
    /// corrupts the cursor. Seeking to `size` positions exactly at the end,
    /// so the next read returns zero bytes.
    fn seek(&mut self, from: SeekFrom) -> u64;

    /// Read one text line, handling both `\n` and `\r\n` terminators.
    ///
    /// The terminator is consumed but not returned. Returns `None` when the
    /// stream was already exhausted.
    fn read_line(&mut self) -> Option<String> {
        let mut line = Vec::new();
        let mut any = false;
        while let Some(b) = self.read_byte() {
            any = true;
            if b == b'\n' {
                break;
            }
            line.push(b);
        }
        if !any {
            return None;
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }
}

/// Resolve a seek request against a stream of length `len`, clamping the
/// target into `[0, len]`.
pub(crate) fn resolve_seek(from: SeekFrom, pos: u64, len: u64) -> u64 {
    let target = match from {
        SeekFrom::Start(offset) => i128::from(offset),
        SeekFrom::Current(delta) => i128::from(pos) + i128::from(delta),
        SeekFrom::End(delta) => i128::from(len) + i128::from(delta),
    };
    target.clamp(0, i128::from(len)) as u64
}

impl<S: Stream + ?Sized> Stream for &mut S {
    fn io_failed(&self) -> bool {
        (**self).io_failed()
    }

    fn clear_io_failed(&mut self) {
        (**self).clear_io_failed();
    }
}

impl<R: ReadStream + ?Sized> ReadStream for &mut R {
    fn eos(&self) -> bool {
        (**self).eos()
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        (**self).read(buf)
    }
}

impl<W: WriteStream + ?Sized> WriteStream for &mut W {
    fn write(&mut self, buf: &[u8]) -> usize {
        (**self).write(buf)
    }
}

impl<S: SeekableReadStream + ?Sized> SeekableReadStream for &mut S {
    fn pos(&self) -> u64 {
        (**self).pos()
    }

    fn size(&self) -> u64 {
        (**self).size()
    }

    fn seek(&mut self, from: SeekFrom) -> u64 {
        (**self).seek(from)
    }
}

impl<S: Stream + ?Sized> Stream for Box<S> {
    fn io_failed(&self) -> bool {
        (**self).io_failed()
    }

    fn clear_io_failed(&mut self) {
        (**self).clear_io_failed();
    }
}

impl<R: ReadStream + ?Sized> ReadStream for Box<R> {
    fn eos(&self) -> bool {
        (**self).eos()
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        (**self).read(buf)
    }
}

impl<S: SeekableReadStream + ?Sized> SeekableReadStream for Box<S> {
    fn pos(&self) -> u64 {
        (**self).pos()
    }

    fn size(&self) -> u64 {
        (**self).size()
    }

    fn seek(&mut self, from: SeekFrom) -> u64 {
        (**self).seek(from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryReadStream;

    #[test]
    fn endian_composition_law() {
        let data = [0x01, 0x02, 0x03, 0x04];

        let mut s = MemoryReadStream::new(&data);
        assert_eq!(s.read_u16_le(), Some(0x0201));
        s.seek(SeekFrom::Start(0));
        assert_eq!(s.read_u16_be(), Some(0x0102));

        s.seek(SeekFrom::Start(0));
        assert_eq!(s.read_u32_le(), Some(0x0403_0201));
        s.seek(SeekFrom::Start(0));
        assert_eq!(s.read_u32_be(), Some(0x0102_0304));
    }

    #[test]
    fn big_endian_is_byte_reverse_of_little_endian() {
        let data = [0xDE, 0xAD, 0xBE, 0xEF];
        let mut le = MemoryReadStream::new(&data);
        let mut be = MemoryReadStream::new(&data);
        assert_eq!(
            le.read_u32_le().map(u32::swap_bytes),
            be.read_u32_be()
        );
    }

    #[test]
    fn signed_reads_are_bit_casts() {
        let data = [0xFF, 0xFF, 0xFE, 0xFF];
        let mut s = MemoryReadStream::new(&data);
        assert_eq!(s.read_i16_le(), Some(-1));
        assert_eq!(s.read_i16_le(), Some(-2));
        s.seek(SeekFrom::Start(0));
        assert_eq!(s.read_i32_le(), Some(-65537));
    }

    #[test]
    fn typed_read_past_end_returns_none() {
        let data = [0xAA, 0xBB, 0xCC];
        let mut s = MemoryReadStream::new(&data);
        // Only three bytes: the 32-bit read must fail, not zero-fill.
        assert_eq!(s.read_u32_le(), None);
        assert!(s.eos());
    }

    #[test]
    fn read_line_handles_crlf_and_lf() {
        let data = b"first\r\nsecond\nlast";
        let mut s = MemoryReadStream::new(data);
        assert_eq!(s.read_line().as_deref(), Some("first"));
        assert_eq!(s.read_line().as_deref(), Some("second"));
        assert_eq!(s.read_line().as_deref(), Some("last"));
        assert_eq!(s.read_line(), None);
    }

    #[test]
    fn decorator_can_borrow_parent() {
        let data = [1u8, 2, 3, 4, 5];
        let mut parent = MemoryReadStream::new(&data);
        {
            let mut window = crate::SubReadStream::new(&mut parent, 2);
            assert_eq!(window.read_byte(), Some(1));
            assert_eq!(window.read_byte(), Some(2));
            assert_eq!(window.read_byte(), None);
        }
        // Parent retained by the caller and positioned past the window.
        assert_eq!(parent.read_byte(), Some(3));
    }
}
