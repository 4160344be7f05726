//! Endian-aware binary stream abstraction for retro resource formats.
//!
//! The crate is built around three small capability traits ([`Stream`],
//! [`ReadStream`], [`SeekableReadStream`], plus [`WriteStream`]) and a set of
//! concrete stream types and decorators:
//!
//! - [`MemoryReadStream`] / [`MemoryWriteStream`] over caller-owned buffers,
//!   with an optional XOR decrypt-on-read transform
//! - [`SubReadStream`] / [`SeekableSubReadStream`] exposing a bounded window
//!   of a parent stream, remapped to a zero-based coordinate space
//! - [`BufferedReadStream`] / [`BufferedSeekableReadStream`] adding a
//!   fixed-size read-ahead cache that is observationally transparent
//! - [`IoReadStream`] / [`FileStream`] adapting `std::io` readers
//!
//! Decorators take their parent by value; pass `&mut parent` instead to keep
//! ownership at the call site. Streams are strictly sequential and not meant
//! to be shared between threads; two views over one parent must not interleave
//! reads.
//!
//! I/O failure is signalled through a sticky `io_failed` flag and end-of-data
//! through `eos()`, never through panics. Typed integer readers return
//! `None` when the underlying bytes run out; missing bytes are never
//! zero-filled.

mod buffered;
mod file;
mod memory;
mod stream;
mod sub;

pub use buffered::{BufferedReadStream, BufferedSeekableReadStream};
pub use file::{FileStream, IoReadStream};
pub use memory::{MemoryReadStream, MemoryWriteStream};
pub use stream::{ReadStream, SeekableReadStream, Stream, WriteStream};
pub use sub::{SeekableSubReadStream, SubReadStream};

pub use std::io::SeekFrom;
