//! Error types for format decoding.

use thiserror::Error;

/// Result type for decode operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Decode error types.
///
/// A decode error is fatal for the resource being loaded, but only for that
/// resource: the source stream stays usable and already-loaded state is
/// untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Input ran out before the declared data was complete
    #[error("Unexpected end of stream: {context}")]
    UnexpectedEnd {
        /// What was being read when the data ran out
        context: &'static str,
    },

    /// Invalid magic bytes at the start of a container
    #[error("Invalid magic: expected {expected:?}, got {}", hex::encode(actual))]
    InvalidMagic {
        expected: &'static str,
        actual: [u8; 4],
    },

    /// Chunk tag not known to the container format
    #[error("Unknown chunk tag {} at offset {offset}", hex::encode(tag))]
    UnknownTag { tag: [u8; 2], offset: u64 },

    /// Chunk size field smaller than the chunk header itself
    #[error("Invalid chunk size {size} at offset {offset}")]
    InvalidChunkSize { size: u32, offset: u64 },

    /// LZSS back-reference pointing outside the decoded history
    #[error("Bad back-reference: distance {distance} with only {decoded} bytes decoded")]
    BadBackReference { distance: u16, decoded: usize },

    /// LZSS copy that would exceed the requested output length
    #[error("Output overrun: {requested} bytes requested, token needs {needed}")]
    OutputOverrun { requested: usize, needed: usize },

    /// Decompressed data does not match the declared size
    #[error("Size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Palette update describing more than 256 entries
    #[error("Palette overflow: start {start} count {count}")]
    PaletteOverflow { start: u16, count: u16 },

    /// Delta-frame opcodes writing past the frame buffer
    #[error("Frame overrun: opcode stream exceeds {width}x{height} pixels")]
    FrameOverrun { width: u16, height: u16 },

    /// Frame dimensions the decoder cannot work with
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u16, height: u16 },
}
