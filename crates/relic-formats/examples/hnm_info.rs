//! Inspect an HNM4-style container: print header metadata and per-frame
//! statistics.
//!
//! Usage: `cargo run --example hnm_info -- <movie-file>`

use relic_formats::hnm::HnmReader;
use relic_stream::{BufferedSeekableReadStream, FileStream};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: hnm_info <movie-file>")?;

    let file = FileStream::open(&path)?;
    let stream = BufferedSeekableReadStream::new(file, 4096);
    let mut reader = HnmReader::new(stream)?;

    let header = *reader.header();
    println!(
        "{path}: {}x{}, {} frames declared, loops: {}",
        header.width,
        header.height,
        header.frame_count,
        header.loops()
    );

    let mut frames = 0u32;
    let mut audio_bytes = 0usize;
    let mut keyframes = 0u32;
    while let Some(frame) = reader.next_frame()? {
        frames += 1;
        audio_bytes += frame.audio.len();
        if frame.keyframe {
            keyframes += 1;
        }
        // A looping movie would iterate forever; one pass is enough here.
        if header.loops() && frame.index + 1 == header.frame_count {
            break;
        }
    }

    println!("decoded {frames} frames ({keyframes} keyframes), {audio_bytes} bytes of audio");
    Ok(())
}
