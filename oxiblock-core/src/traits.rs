//! Core traits for block transforms and entropy coders.
//!
//! Three seams are defined here:
//!
//! - [`ByteTransform`]: an in-place, size-preserving block transform (BWT,
//!   MTFT). Configured with [`ByteTransform::set_size`] before each block.
//! - [`ByteFunction`]: a source-to-destination transform that may change the
//!   length of the data (ZLT, RLT). Reports cursor movement as [`Progress`].
//! - [`EntropyEncoder`] / [`EntropyDecoder`]: codes payload bytes onto a shared
//!   bit channel that the block codec also writes its header to.

use crate::bitstream::{BitReader, BitWriter};
use crate::error::{OxiBlockError, Result};
use std::io::{Read, Write};

/// How far a [`ByteFunction`] call advanced its source and destination cursors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    /// Bytes consumed from the source.
    pub consumed: usize,
    /// Bytes written to the destination.
    pub produced: usize,
}

impl Progress {
    /// Create a progress report.
    pub fn new(consumed: usize, produced: usize) -> Self {
        Self { consumed, produced }
    }
}

/// An in-place reversible transform over a block of bytes.
///
/// Implementations are reused across blocks of varying length: the caller sets
/// the block size first, then calls [`forward`](Self::forward) or
/// [`inverse`](Self::inverse) on a slice of at least that many bytes. A size of
/// zero means "the whole slice".
pub trait ByteTransform {
    /// Configure the transform for a block of `size` bytes.
    fn set_size(&mut self, size: usize) -> Result<()>;

    /// The configured block size (0 means the whole slice).
    fn size(&self) -> usize;

    /// Apply the transform in place.
    fn forward(&mut self, block: &mut [u8]) -> Result<()>;

    /// Undo the transform in place.
    fn inverse(&mut self, block: &mut [u8]) -> Result<()>;

    /// Side information recorded by the last `forward` call, if the transform
    /// needs one to be inverted (the BWT primary index).
    fn primary_index(&self) -> Option<u32> {
        None
    }

    /// Provide the side information recorded at encode time before `inverse`.
    fn set_primary_index(&mut self, _index: u32) -> Result<()> {
        Ok(())
    }

    /// Resolve the slice the transform applies to.
    fn active<'a>(&self, block: &'a mut [u8]) -> Result<&'a mut [u8]> {
        match self.size() {
            0 => Ok(block),
            size if size <= block.len() => Ok(&mut block[..size]),
            size => Err(OxiBlockError::buffer_too_small(size, block.len())),
        }
    }
}

/// A reversible transform from a source slice into a destination slice.
///
/// Neither direction grows the destination: when it fills up, the call
/// either fails or stops early and says so through the returned [`Progress`],
/// depending on the implementation.
pub trait ByteFunction {
    /// Transform `src` into `dst`.
    fn forward(&mut self, src: &[u8], dst: &mut [u8]) -> Result<Progress>;

    /// Undo the transform from `src` into `dst`.
    fn inverse(&mut self, src: &[u8], dst: &mut [u8]) -> Result<Progress>;
}

/// An entropy encoder writing onto a bit channel.
pub trait EntropyEncoder {
    /// Underlying byte sink of the bit channel.
    type Writer: Write;

    /// The bit channel, for callers that interleave raw fields with coded data.
    fn bit_stream(&mut self) -> &mut BitWriter<Self::Writer>;

    /// Encode one byte.
    fn encode_byte(&mut self, value: u8) -> Result<()>;

    /// Encode every byte of `block`, returning the number of bytes encoded.
    fn encode(&mut self, block: &[u8]) -> Result<usize> {
        for &value in block {
            self.encode_byte(value)?;
        }
        Ok(block.len())
    }

    /// Flush any state the coder buffers between bytes.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// An entropy decoder reading from a bit channel.
pub trait EntropyDecoder {
    /// Underlying byte source of the bit channel.
    type Reader: Read;

    /// The bit channel, for callers that interleave raw fields with coded data.
    fn bit_stream(&mut self) -> &mut BitReader<Self::Reader>;

    /// Decode one byte.
    fn decode_byte(&mut self) -> Result<u8>;

    /// Fill `block` with decoded bytes, returning the number of bytes decoded.
    fn decode(&mut self, block: &mut [u8]) -> Result<usize> {
        for slot in block.iter_mut() {
            *slot = self.decode_byte()?;
        }
        Ok(block.len())
    }
}
