//! HNM4-style frame container parsing.
//!
//! The container is a 16-byte header followed by tag-delimited chunks:
//!
//! ```text
//! header:  "HNM4"  width:u16le  height:u16le  frames:u32le  flags:u32le
//! chunk:   size:u32le  tag:[u8;2]  payload[size - 6]
//! ```
//!
//! Chunk tags: `PL` palette update, `IZ` intra (key) frame, `IU` inter
//! (delta) frame, `SD` sound data, `EC` end of container. Unknown tags are a
//! fatal decode error; known chunks with declared-but-unconsumed trailing
//! bytes are skipped to the declared boundary. Intra frames carry
//! LZSS-compressed pixel data; delta frames patch the previous frame through
//! skip/literal opcodes with the two frame buffers swapping roles each
//! frame.
//!
//! A looping container (header flag bit 0) restarts at the first chunk when
//! `EC` is reached, which is why the parser requires a seekable source.

use relic_stream::{ReadStream, SeekFrom, SeekableReadStream, SubReadStream};
use tracing::{debug, trace};

use crate::error::{DecodeError, Result};
use crate::lzss;

/// Container magic.
pub const HNM_MAGIC: &[u8; 4] = b"HNM4";

/// Fixed header size; chunk data starts here.
pub const HEADER_SIZE: u64 = 16;

const CHUNK_HEADER_SIZE: u32 = 6;

/// Parsed container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HnmHeader {
    pub width: u16,
    pub height: u16,
    pub frame_count: u32,
    pub flags: u32,
}

impl HnmHeader {
    /// Whether the container restarts from the first chunk after `EC`.
    pub const fn loops(&self) -> bool {
        self.flags & 1 != 0
    }

    /// Pixels per frame buffer.
    pub const fn frame_size(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// One decoded frame, yielded by [`HnmReader::next_frame`].
///
/// Pixel data stays inside the reader (see [`HnmReader::frame_data`]); the
/// frame carries the bookkeeping a playback loop needs plus the sound bytes
/// that arrived since the previous frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Zero-based frame index, reset when a looping container restarts.
    pub index: u32,
    /// True for intra frames (`IZ`), false for delta frames (`IU`).
    pub keyframe: bool,
    /// True when a palette chunk was applied since the last frame.
    pub palette_updated: bool,
    /// Unsigned 8-bit PCM accumulated from `SD` chunks since the last frame.
    pub audio: Vec<u8>,
}

/// Pull-based reader over an HNM4-style container.
#[derive(Debug)]
pub struct HnmReader<S: SeekableReadStream> {
    stream: S,
    header: HnmHeader,
    current: Vec<u8>,
    previous: Vec<u8>,
    palette: [u8; 768],
    palette_dirty: bool,
    frame_index: u32,
    pending_audio: Vec<u8>,
    restarted: bool,
    finished: bool,
}

impl<S: SeekableReadStream> HnmReader<S> {
    /// Parse and validate the container header.
    pub fn new(mut stream: S) -> Result<Self> {
        let mut magic = [0u8; 4];
        if stream.read(&mut magic) != 4 {
            return Err(DecodeError::UnexpectedEnd { context: "header" });
        }
        if &magic != HNM_MAGIC {
            return Err(DecodeError::InvalidMagic {
                expected: "HNM4",
                actual: magic,
            });
        }

        let header = HnmHeader {
            width: read_header_field(stream.read_u16_le())?,
            height: read_header_field(stream.read_u16_le())?,
            frame_count: read_header_field(stream.read_u32_le())?,
            flags: read_header_field(stream.read_u32_le())?,
        };
        if header.width == 0 || header.height == 0 {
            return Err(DecodeError::InvalidDimensions {
                width: header.width,
                height: header.height,
            });
        }

        debug!(
            width = header.width,
            height = header.height,
            frames = header.frame_count,
            loops = header.loops(),
            "parsed container header"
        );

        // Two distinct, equally sized buffers; roles swap every delta frame.
        let frame_size = header.frame_size();
        Ok(Self {
            stream,
            header,
            current: vec![0; frame_size],
            previous: vec![0; frame_size],
            palette: [0; 768],
            palette_dirty: false,
            frame_index: 0,
            pending_audio: Vec::new(),
            restarted: false,
            finished: false,
        })
    }

    /// Container header.
    pub const fn header(&self) -> &HnmHeader {
        &self.header
    }

    /// Pixels of the most recently completed frame, `width * height` bytes
    /// of palette indices.
    pub fn frame_data(&self) -> &[u8] {
        &self.current
    }

    /// Current palette, 256 RGB triplets scaled to 8 bits per channel.
    pub const fn palette(&self) -> &[u8; 768] {
        &self.palette
    }

    /// Decode chunks until the next frame is complete.
    ///
    /// Returns `Ok(None)` once playback is over (the `EC` marker of a
    /// non-looping container, or the end of the stream at a chunk boundary).
    /// Any decode error is fatal for the container.
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.finished {
            return Ok(None);
        }

        loop {
            if self.stream.eos() {
                self.finished = true;
                return Ok(None);
            }

            let chunk_start = self.stream.pos();
            let Some(size) = self.stream.read_u32_le() else {
                return Err(DecodeError::UnexpectedEnd {
                    context: "chunk size",
                });
            };
            let mut tag = [0u8; 2];
            if self.stream.read(&mut tag) != 2 {
                return Err(DecodeError::UnexpectedEnd { context: "chunk tag" });
            }
            if size < CHUNK_HEADER_SIZE {
                return Err(DecodeError::InvalidChunkSize {
                    size,
                    offset: chunk_start,
                });
            }
            let chunk_end = chunk_start + u64::from(size);
            if chunk_end > self.stream.size() {
                return Err(DecodeError::UnexpectedEnd {
                    context: "chunk body",
                });
            }
            let payload = u64::from(size - CHUNK_HEADER_SIZE);
            trace!(
                tag = %tag.escape_ascii(),
                size,
                offset = chunk_start,
                "chunk"
            );

            let mut frame_done = false;
            let mut keyframe = false;
            match &tag {
                b"PL" => {
                    let mut body = SubReadStream::new(&mut self.stream, payload);
                    parse_palette(&mut body, &mut self.palette)?;
                    self.palette_dirty = true;
                }
                b"IZ" => {
                    let mut body = SubReadStream::new(&mut self.stream, payload);
                    let expected = self.header.frame_size();
                    let Some(decompressed_size) = body.read_u32_le() else {
                        return Err(DecodeError::UnexpectedEnd {
                            context: "intra frame size",
                        });
                    };
                    if decompressed_size as usize != expected {
                        return Err(DecodeError::SizeMismatch {
                            expected,
                            actual: decompressed_size as usize,
                        });
                    }
                    let pixels = lzss::decompress(&mut body, expected)?;
                    std::mem::swap(&mut self.current, &mut self.previous);
                    self.current.copy_from_slice(&pixels);
                    frame_done = true;
                    keyframe = true;
                }
                b"IU" => {
                    std::mem::swap(&mut self.current, &mut self.previous);
                    self.current.copy_from_slice(&self.previous);
                    let mut body = SubReadStream::new(&mut self.stream, payload);
                    apply_delta(&mut body, &mut self.current, self.header)?;
                    frame_done = true;
                }
                b"SD" => {
                    let start = self.pending_audio.len();
                    self.pending_audio.resize(start + payload as usize, 0);
                    if self.stream.read(&mut self.pending_audio[start..]) != payload as usize {
                        return Err(DecodeError::UnexpectedEnd {
                            context: "sound data",
                        });
                    }
                }
                b"EC" => {
                    if self.header.loops() && !self.restarted {
                        debug!(frame = self.frame_index, "loop restart");
                        self.stream.seek(SeekFrom::Start(HEADER_SIZE));
                        self.frame_index = 0;
                        // One restart without an intervening frame means the
                        // container yields nothing; stop instead of spinning.
                        self.restarted = true;
                        continue;
                    }
                    self.finished = true;
                    return Ok(None);
                }
                _ => {
                    return Err(DecodeError::UnknownTag {
                        tag,
                        offset: chunk_start,
                    });
                }
            }

            // Consume exactly the declared chunk size, whatever the handler
            // actually read.
            self.stream.seek(SeekFrom::Start(chunk_end));

            if frame_done {
                let frame = Frame {
                    index: self.frame_index,
                    keyframe,
                    palette_updated: self.palette_dirty,
                    audio: std::mem::take(&mut self.pending_audio),
                };
                self.palette_dirty = false;
                self.restarted = false;
                self.frame_index += 1;
                return Ok(Some(frame));
            }
        }
    }
}

fn read_header_field<T>(value: Option<T>) -> Result<T> {
    value.ok_or(DecodeError::UnexpectedEnd { context: "header" })
}

/// Apply a `PL` palette chunk: `(start, count)` runs of 6-bit VGA triplets,
/// terminated by a `0xFF` start byte or the end of the chunk.
fn parse_palette<R: ReadStream>(body: &mut R, palette: &mut [u8; 768]) -> Result<()> {
    loop {
        let Some(start) = body.read_byte() else {
            break;
        };
        if start == 0xFF {
            break;
        }
        let Some(count) = body.read_byte() else {
            return Err(DecodeError::UnexpectedEnd {
                context: "palette run",
            });
        };
        // A count of zero is the historical encoding for a full 256-entry
        // update, which only fits when the run starts at index zero.
        let count: u16 = if count == 0 { 256 } else { u16::from(count) };
        if u16::from(start) + count > 256 {
            return Err(DecodeError::PaletteOverflow {
                start: u16::from(start),
                count,
            });
        }

        for entry in 0..count {
            let mut rgb = [0u8; 3];
            if body.read(&mut rgb) != 3 {
                return Err(DecodeError::UnexpectedEnd {
                    context: "palette entry",
                });
            }
            let base = (usize::from(start) + usize::from(entry)) * 3;
            for (slot, six_bit) in palette[base..base + 3].iter_mut().zip(rgb) {
                // 6-bit VGA to 8-bit, replicating the top bits.
                *slot = (six_bit << 2) | (six_bit >> 4);
            }
        }
    }
    Ok(())
}

/// Apply an `IU` delta chunk to `current` (already a copy of the previous
/// frame): `0x00` ends the frame, a set high bit skips `op & 0x7F` pixels,
/// otherwise `op` literal pixels follow.
fn apply_delta<R: ReadStream>(body: &mut R, current: &mut [u8], header: HnmHeader) -> Result<()> {
    let frame_size = header.frame_size();
    let mut cursor = 0usize;
    loop {
        let Some(op) = body.read_byte() else {
            return Err(DecodeError::UnexpectedEnd {
                context: "delta opcode",
            });
        };
        if op == 0 {
            return Ok(());
        }
        if op & 0x80 != 0 {
            cursor += usize::from(op & 0x7F);
            if cursor > frame_size {
                return Err(DecodeError::FrameOverrun {
                    width: header.width,
                    height: header.height,
                });
            }
        } else {
            let n = usize::from(op);
            if cursor + n > frame_size {
                return Err(DecodeError::FrameOverrun {
                    width: header.width,
                    height: header.height,
                });
            }
            if body.read(&mut current[cursor..cursor + n]) != n {
                return Err(DecodeError::UnexpectedEnd {
                    context: "delta pixels",
                });
            }
            cursor += n;
        }
    }
}
