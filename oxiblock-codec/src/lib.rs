//! # OxiBlock Codec
//!
//! Encodes blocks of bytes into self-describing compressed blocks and back.
//!
//! ## Block format
//!
//! Every block starts with a mode byte:
//!
//! | Mode | Meaning |
//! |------|---------|
//! | `0x80` | End marker (empty stored block) |
//! | `0x80 + n` | Stored block of `n < 16` raw bytes |
//! | `0x0w` | Transformed block, header fields `w` (1-3) bytes wide |
//! | `+ 0x20` | Run length transform skipped |
//! | `+ 0x40` | Zero length transform skipped |
//!
//! A transformed block carries its compressed length and BWT primary index
//! (`w` bytes each, most significant first) followed by the payload.
//!
//! ## Example
//!
//! ```rust
//! use oxiblock_codec::{BlockCodec, CodecConfig, EntropyKind, compress, decompress};
//!
//! // Single block
//! let data = vec![b'z'; 1000];
//! let mut encoded = vec![0u8; BlockCodec::max_encoded_len(data.len())];
//! let progress = BlockCodec::default().forward(&data, &mut encoded).unwrap();
//! assert!(progress.produced < 20);
//!
//! // Whole stream
//! let config = CodecConfig::default().with_entropy(EntropyKind::ExpGolomb);
//! let compressed = compress(&data, &config).unwrap();
//! assert_eq!(decompress(&compressed).unwrap(), data);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod block;
pub mod config;
pub mod entropy;
pub mod header;
pub mod stream;

pub use block::{BlockCodec, DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE, SMALL_BLOCK_SIZE};
pub use config::{CodecConfig, EntropyKind};
pub use header::BlockHeader;
pub use stream::{BlockCompressor, BlockDecompressor, compress, decompress};
