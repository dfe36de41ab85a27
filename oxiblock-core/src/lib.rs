//! # OxiBlock Core
//!
//! Core components for the OxiBlock block compression engine.
//!
//! This crate provides the fundamental building blocks shared by the
//! transforms and the block codec:
//!
//! - [`bitstream`]: Buffered MSB-first bit I/O with 64-bit close padding
//! - [`traits`]: Transform and entropy coder contracts
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! OxiBlock is layered the same way as a classic block-sorting compressor:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Stream / CLI                                        │
//! │     Block framing, end marker, entropy coder selection  │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Block codec                                         │
//! │     Header, stored blocks, RLT -> BWT -> MTFT -> ZLT    │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Transforms                                          │
//! │     ByteTransform / ByteFunction implementations        │
//! ├─────────────────────────────────────────────────────────┤
//! │ L0: BitStream (this crate)                              │
//! │     BitReader/BitWriter, traits, errors                 │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxiblock_core::bitstream::{BitReader, BitWriter};
//! use std::io::Cursor;
//!
//! let mut output = Vec::new();
//! let mut writer = BitWriter::new(&mut output);
//! writer.write_bits(0xABCD, 16).unwrap();
//! writer.close().unwrap();
//!
//! let mut reader = BitReader::new(Cursor::new(output));
//! assert_eq!(reader.read_bits(16).unwrap(), 0xABCD);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod error;
pub mod traits;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter};
pub use error::{OxiBlockError, Result};
pub use traits::{ByteFunction, ByteTransform, EntropyDecoder, EntropyEncoder, Progress};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{BitReader, BitWriter};
    pub use crate::error::{OxiBlockError, Result};
    pub use crate::traits::{
        ByteFunction, ByteTransform, EntropyDecoder, EntropyEncoder, Progress,
    };
}
