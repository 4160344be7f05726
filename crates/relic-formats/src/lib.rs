//! Binary resource format parsers built on [`relic_stream`].
//!
//! Two representative consumers of the stream abstraction:
//!
//! - [`lzss`] — sliding-window decompression of literal/back-reference token
//!   streams (4096-byte window variant)
//! - [`hnm`] — an HNM4-style tag-delimited frame container with palette,
//!   intra-frame, delta-frame and sound chunks
//!
//! Parsers consume their input purely through the stream traits, so any
//! combination of memory, file, sub-range and buffered streams works as a
//! source. Malformed data is reported as a typed [`DecodeError`]; corrupt
//! input is never guessed at or silently truncated.

pub mod hnm;
pub mod lzss;

mod error;

pub use error::{DecodeError, Result};
