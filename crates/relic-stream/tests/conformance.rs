//! Cross-type conformance suite.
//!
//! Every decorator must behave exactly like the stream it wraps; these tests
//! run the same scenarios through the different concrete types and through
//! randomized inputs.

use proptest::prelude::*;
use relic_stream::{
    BufferedReadStream, BufferedSeekableReadStream, IoReadStream, MemoryReadStream, ReadStream,
    SeekFrom, SeekableReadStream, SeekableSubReadStream,
};
use std::io::Cursor;

fn drain_byte_by_byte<R: ReadStream>(stream: &mut R) -> Vec<u8> {
    let mut out = Vec::new();
    while let Some(b) = stream.read_byte() {
        out.push(b);
    }
    out
}

#[test]
fn all_seekable_types_agree_on_a_shared_scenario() {
    let data: Vec<u8> = (0u8..64).map(|b| b.wrapping_mul(7)).collect();

    fn scenario<S: SeekableReadStream>(mut s: S) -> (u64, Vec<Option<u8>>) {
        let mut reads = Vec::new();
        reads.push(s.read_byte());
        s.seek(SeekFrom::Start(40));
        reads.push(s.read_byte());
        s.seek(SeekFrom::Current(-2));
        reads.push(s.read_byte());
        s.seek(SeekFrom::End(-1));
        reads.push(s.read_byte());
        reads.push(s.read_byte());
        (s.pos(), reads)
    }

    let expected = scenario(MemoryReadStream::new(&data));
    assert_eq!(
        scenario(IoReadStream::new(Cursor::new(data.clone())).unwrap()),
        expected
    );
    assert_eq!(
        scenario(BufferedSeekableReadStream::new(
            MemoryReadStream::new(&data),
            8
        )),
        expected
    );
    assert_eq!(
        scenario(SeekableSubReadStream::new(
            MemoryReadStream::new(&data),
            0,
            data.len() as u64
        )),
        expected
    );
    // Stacked decorators: a buffered view of a sub-range of the whole.
    assert_eq!(
        scenario(BufferedSeekableReadStream::new(
            SeekableSubReadStream::new(MemoryReadStream::new(&data), 0, data.len() as u64),
            5
        )),
        expected
    );
}

#[test]
fn sub_stream_of_sub_stream_composes() {
    let data: Vec<u8> = (0u8..20).collect();
    let outer = SeekableSubReadStream::new(MemoryReadStream::new(&data), 4, 16);
    let mut inner = SeekableSubReadStream::new(outer, 2, 8);

    assert_eq!(inner.size(), 6);
    assert_eq!(drain_byte_by_byte(&mut inner), vec![6, 7, 8, 9, 10, 11]);
}

#[test]
fn buffered_sub_stream_respects_window() {
    let data: Vec<u8> = (0u8..32).collect();
    let sub = SeekableSubReadStream::new(MemoryReadStream::new(&data), 10, 20);
    // Cache larger than the window must not leak bytes past it.
    let mut buffered = BufferedSeekableReadStream::new(sub, 64);

    let out = drain_byte_by_byte(&mut buffered);
    assert_eq!(out, (10u8..20).collect::<Vec<_>>());
    assert!(buffered.eos());
}

#[test]
fn seed_case_ten_bytes_through_four_byte_cache() {
    let data: Vec<u8> = (0u8..10).collect();
    let mut buffered = BufferedReadStream::new(MemoryReadStream::new(&data), 4);
    assert_eq!(drain_byte_by_byte(&mut buffered), data);
}

proptest! {
    #[test]
    fn buffering_is_transparent_for_any_cache_size(
        data in proptest::collection::vec(any::<u8>(), 0..200),
        cache in 1usize..64,
    ) {
        let mut buffered = BufferedReadStream::new(MemoryReadStream::new(&data), cache);
        prop_assert_eq!(drain_byte_by_byte(&mut buffered), data);
    }

    #[test]
    fn chunked_reads_are_transparent_too(
        data in proptest::collection::vec(any::<u8>(), 1..200),
        cache in 1usize..32,
        chunk in 1usize..16,
    ) {
        let mut buffered = BufferedReadStream::new(MemoryReadStream::new(&data), cache);
        let mut out = Vec::new();
        let mut buf = vec![0u8; chunk];
        loop {
            let n = buffered.read(&mut buf);
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        prop_assert_eq!(out, data);
    }

    #[test]
    fn buffered_seeks_match_unbuffered_parent(
        data in proptest::collection::vec(any::<u8>(), 1..100),
        cache in 1usize..16,
        offsets in proptest::collection::vec(0usize..100, 1..20),
    ) {
        let mut plain = MemoryReadStream::new(&data);
        let mut buffered =
            BufferedSeekableReadStream::new(MemoryReadStream::new(&data), cache);

        for &offset in &offsets {
            let offset = offset as u64;
            prop_assert_eq!(
                plain.seek(SeekFrom::Start(offset)),
                buffered.seek(SeekFrom::Start(offset))
            );
            prop_assert_eq!(plain.read_byte(), buffered.read_byte());
            prop_assert_eq!(plain.pos(), buffered.pos());
        }
    }

    #[test]
    fn sub_stream_round_trip_for_any_window(
        data in proptest::collection::vec(any::<u8>(), 1..100),
        window in any::<(usize, usize)>(),
    ) {
        let len = data.len();
        let begin = (window.0 % len) as u64;
        let end = begin + (window.1 % (len - begin as usize + 1)) as u64;

        let mut sub = SeekableSubReadStream::new(MemoryReadStream::new(&data), begin, end);
        for offset in 0..sub.size() {
            sub.seek(SeekFrom::Start(offset));
            prop_assert_eq!(sub.pos(), offset);
            prop_assert_eq!(sub.read_byte(), Some(data[(begin + offset) as usize]));
        }
    }
}
