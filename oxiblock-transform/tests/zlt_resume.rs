//! Chunked ZLT coding must match single-call coding.

use oxiblock_core::prelude::*;
use oxiblock_transform::{Pipeline, Zlt};

/// Zero-heavy data with occasional literals, including escaped ones.
fn zero_heavy(size: usize, seed: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut seed = seed;
    for _ in 0..size {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        let r = (seed >> 33) as u32;
        data.push(match r % 16 {
            0 => (r >> 8) as u8,
            1 => 0xFF,
            2 => 0xFE,
            _ => 0,
        });
    }
    data
}

fn encode_whole(data: &[u8]) -> Vec<u8> {
    let mut dst = vec![0u8; data.len() * 2 + 8];
    let progress = Zlt::new().forward(data, &mut dst).unwrap();
    assert_eq!(progress.consumed, data.len());
    dst.truncate(progress.produced);
    dst
}

/// Feed `data` to a sized ZLT in source chunks of `chunk` bytes, draining into
/// a destination of `room` bytes (at least 2, the size of an escape).
fn encode_chunked(data: &[u8], chunk: usize, room: usize) -> Vec<u8> {
    let mut zlt = Zlt::with_size(data.len());
    let mut dst = vec![0u8; room];
    let mut out = Vec::new();
    let mut pos = 0;

    while !zlt.is_finished() {
        let end = (pos + chunk).min(data.len());
        let progress = zlt.forward(&data[pos..end], &mut dst).unwrap();
        out.extend_from_slice(&dst[..progress.produced]);
        pos += progress.consumed;
    }

    assert_eq!(pos, data.len());
    out
}

fn decode_chunked(coded: &[u8], chunk: usize, room: usize) -> Vec<u8> {
    let mut zlt = Zlt::with_size(coded.len());
    let mut dst = vec![0u8; room];
    let mut out = Vec::new();
    let mut pos = 0;

    while !zlt.is_finished() {
        // A run code may need more than `chunk` bytes to be decided
        let end = (pos + chunk).min(coded.len());
        let progress = zlt.inverse(&coded[pos..end], &mut dst).unwrap();
        out.extend_from_slice(&dst[..progress.produced]);
        pos += progress.consumed;

        if progress == Progress::default() {
            let progress = zlt.inverse(&coded[pos..], &mut dst).unwrap();
            out.extend_from_slice(&dst[..progress.produced]);
            pos += progress.consumed;
        }
    }

    assert_eq!(pos, coded.len());
    out
}

#[test]
fn test_split_mid_run_matches_single_call() {
    let mut data = vec![3u8];
    data.extend(std::iter::repeat_n(0u8, 5000));
    data.push(4);

    let whole = encode_whole(&data);

    for split in [1, 2, 100, 2500, 5000, 5001] {
        let mut zlt = Zlt::with_size(data.len());
        let mut dst = vec![0u8; 64];
        let mut out = Vec::new();

        let first = zlt.forward(&data[..split], &mut dst).unwrap();
        assert_eq!(first.consumed, split);
        out.extend_from_slice(&dst[..first.produced]);

        let second = zlt.forward(&data[split..], &mut dst).unwrap();
        assert_eq!(second.consumed, data.len() - split);
        out.extend_from_slice(&dst[..second.produced]);

        assert!(zlt.is_finished());
        assert_eq!(out, whole, "split at {split}");
    }
}

#[test]
fn test_chunked_forward_matches_single_call() {
    for seed in 1..=8u64 {
        let data = zero_heavy(4096, seed);
        let whole = encode_whole(&data);

        for (chunk, room) in [(1, 2), (7, 3), (64, 2), (333, 17), (4096, 5)] {
            assert_eq!(
                encode_chunked(&data, chunk, room),
                whole,
                "seed {seed}, chunk {chunk}, room {room}"
            );
        }
    }
}

#[test]
fn test_chunked_inverse_matches_data() {
    for seed in 1..=8u64 {
        let data = zero_heavy(4096, seed);
        let whole = encode_whole(&data);

        for (chunk, room) in [(1, 1), (5, 3), (64, 2), (333, 17), (4096, 4096)] {
            assert_eq!(
                decode_chunked(&whole, chunk, room),
                data,
                "seed {seed}, chunk {chunk}, room {room}"
            );
        }
    }
}

#[test]
fn test_mtft_output_roundtrip() {
    let text: Vec<u8> = b"to be or not to be, that is the question. "
        .iter()
        .copied()
        .cycle()
        .take(20_000)
        .collect();

    let mut block = text.clone();
    let index = Pipeline::bwt_mtft().forward(&mut block).unwrap();

    let coded = encode_whole(&block);
    assert!(coded.len() < block.len() / 4);
    assert_eq!(encode_chunked(&block, 1000, 100), coded);

    let mut decoded = decode_chunked(&coded, 50, 700);
    Pipeline::bwt_mtft().inverse(&mut decoded, index).unwrap();
    assert_eq!(decoded, text);
}
