//! LZSS sliding-window decompression.
//!
//! Token stream layout (4096-byte window variant):
//!
//! - a control byte, consumed LSB-first, one bit per token
//! - bit set: literal, the next byte is appended to the output
//! - bit clear: back-reference, two bytes `b1 b2` where
//!   `distance = (b2 & 0xF0) << 4 | b1` and `length = (b2 & 0x0F) + 3`,
//!   copying `length` bytes starting `distance` bytes behind the output end
//!
//! Back-references may overlap the bytes they produce (`distance < length`),
//! so the copy is byte-at-a-time by contract. Decoding stops exactly at the
//! requested output length; a control byte may be left partially consumed.

use relic_stream::ReadStream;
use tracing::debug;

use crate::error::{DecodeError, Result};

/// Size of the sliding history window.
pub const WINDOW_SIZE: usize = 4096;

/// Shortest encodable back-reference.
pub const MIN_MATCH: usize = 3;

/// Longest encodable back-reference.
pub const MAX_MATCH: usize = MIN_MATCH + 0x0F;

/// Decompress `expected` bytes of output from the token stream in `r`.
///
/// Malformed input is a hard error: a reference reaching before the start of
/// the decoded history, a copy that would exceed `expected`, or the stream
/// ending mid-token all fail without producing partial output.
pub fn decompress<R: ReadStream>(r: &mut R, expected: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected);

    'tokens: while out.len() < expected {
        let Some(control) = r.read_byte() else {
            return Err(DecodeError::UnexpectedEnd {
                context: "control byte",
            });
        };

        for bit in 0..8 {
            if out.len() == expected {
                break 'tokens;
            }
            if control & (1 << bit) != 0 {
                let Some(b) = r.read_byte() else {
                    return Err(DecodeError::UnexpectedEnd { context: "literal" });
                };
                out.push(b);
            } else {
                let (Some(b1), Some(b2)) = (r.read_byte(), r.read_byte()) else {
                    return Err(DecodeError::UnexpectedEnd {
                        context: "back-reference",
                    });
                };
                let distance = (u16::from(b2 & 0xF0) << 4) | u16::from(b1);
                let length = usize::from(b2 & 0x0F) + MIN_MATCH;

                if distance == 0 || usize::from(distance) > out.len() {
                    return Err(DecodeError::BadBackReference {
                        distance,
                        decoded: out.len(),
                    });
                }
                if out.len() + length > expected {
                    return Err(DecodeError::OutputOverrun {
                        requested: expected,
                        needed: out.len() + length,
                    });
                }

                // Byte-at-a-time so self-overlapping copies replicate bytes
                // written earlier in the same reference.
                let start = out.len() - usize::from(distance);
                for i in 0..length {
                    let b = out[start + i];
                    out.push(b);
                }
            }
        }
    }

    debug!(decoded = out.len(), "lzss stream decompressed");
    Ok(out)
}
