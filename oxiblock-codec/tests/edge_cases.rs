//! Malformed input must fail cleanly, never panic.

use oxiblock_codec::entropy::NullDecoder;
use oxiblock_codec::{BlockCodec, BlockHeader, CodecConfig, compress, decompress};
use oxiblock_core::prelude::*;
use std::io::Cursor;

fn encoded_text() -> Vec<u8> {
    let data: Vec<u8> = b"corrupt me if you can. ".iter().copied().cycle().take(2000).collect();
    let mut encoded = vec![0u8; BlockCodec::max_encoded_len(data.len())];
    let progress = BlockCodec::default().forward(&data, &mut encoded).unwrap();
    encoded.truncate(progress.produced);
    encoded
}

fn inverse(src: &[u8]) -> Result<Progress> {
    let mut dst = vec![0u8; 4096];
    BlockCodec::default().inverse(src, &mut dst)
}

#[test]
fn test_empty_source() {
    assert!(matches!(
        inverse(&[]),
        Err(OxiBlockError::UnexpectedEof { .. })
    ));
}

#[test]
fn test_width_nibble_zero_or_too_large() {
    for mode in [0x20u8, 0x24, 0x25, 0x2F, 0x60] {
        let src = [mode, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        assert!(
            matches!(inverse(&src), Err(OxiBlockError::InvalidHeader { .. })),
            "mode {mode:#04x}"
        );
    }
}

#[test]
fn test_truncated_header_fields() {
    assert!(matches!(
        inverse(&[0x23, 0x00, 0x00, 0x10, 0x00]),
        Err(OxiBlockError::InvalidHeader { .. })
    ));
}

#[test]
fn test_zero_compressed_length() {
    assert!(matches!(
        inverse(&[0x21, 0x00, 0x00, 0x41]),
        Err(OxiBlockError::InvalidHeader { .. })
    ));
}

#[test]
fn test_truncated_payload() {
    let encoded = encoded_text();
    let (_, header_len) = BlockHeader::parse(&encoded).unwrap();
    let middle = header_len + (encoded.len() - header_len) / 2;

    for cut in [encoded.len() - 1, middle, header_len] {
        assert!(
            matches!(
                inverse(&encoded[..cut]),
                Err(OxiBlockError::UnexpectedEof { .. })
            ),
            "cut at {cut}"
        );
    }
}

#[test]
fn test_truncated_stored_block() {
    assert!(matches!(
        inverse(&[0x85, 1, 2]),
        Err(OxiBlockError::UnexpectedEof { expected: 3 })
    ));
}

#[test]
fn test_primary_index_out_of_range() {
    // No-ZLT block of 3 bytes claiming primary index 3
    assert!(matches!(
        inverse(&[0x61, 0x03, 0x03, 1, 2, 3]),
        Err(OxiBlockError::CorruptedData { .. })
    ));
}

#[test]
fn test_destination_too_small() {
    let encoded = encoded_text();
    let mut dst = vec![0u8; 100];
    assert!(matches!(
        BlockCodec::default().inverse(&encoded, &mut dst),
        Err(OxiBlockError::BufferTooSmall { needed: 2000, .. })
    ));

    let mut dst = [0u8; 2];
    assert!(matches!(
        BlockCodec::default().inverse(&[0x83, 1, 2, 3], &mut dst),
        Err(OxiBlockError::BufferTooSmall { needed: 3, .. })
    ));
}

#[test]
fn test_every_byte_flip_is_handled() {
    let encoded = encoded_text();

    for i in 0..encoded.len() {
        for flip in [0x01u8, 0x80, 0xFF] {
            let mut damaged = encoded.clone();
            damaged[i] ^= flip;

            // Any outcome but a panic is acceptable
            let _ = inverse(&damaged);
        }
    }
}

#[test]
fn test_decode_truncated_bit_channel() {
    let encoded = encoded_text();
    let mut bits = BitReader::new(Cursor::new(encoded[..encoded.len() - 2].to_vec()));
    let mut dst = vec![0u8; 4096];
    let err = BlockCodec::default()
        .decode(&mut dst, &mut NullDecoder::new(&mut bits))
        .unwrap_err();
    assert!(err.is_end_of_stream());
}

#[test]
fn test_stream_garbage() {
    let compressed = compress(&[5u8; 3000], &CodecConfig::default()).unwrap();

    for i in 4..compressed.len() {
        let mut damaged = compressed.clone();
        damaged[i] ^= 0x5A;
        let _ = decompress(&damaged);
    }

    assert!(decompress(&[]).unwrap_err().is_end_of_stream());
    assert!(decompress(&compressed[..3]).is_err());
}
