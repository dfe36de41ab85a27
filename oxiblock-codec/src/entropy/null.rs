//! Pass-through coder: every payload byte is written as 8 raw bits.

use oxiblock_core::bitstream::{BitReader, BitWriter};
use oxiblock_core::error::Result;
use oxiblock_core::traits::{EntropyDecoder, EntropyEncoder};
use std::io::{Read, Write};

/// Writes payload bytes verbatim.
#[derive(Debug)]
pub struct NullEncoder<'a, W: Write> {
    bits: &'a mut BitWriter<W>,
}

impl<'a, W: Write> NullEncoder<'a, W> {
    /// Create an encoder over a bit channel.
    pub fn new(bits: &'a mut BitWriter<W>) -> Self {
        Self { bits }
    }
}

impl<W: Write> EntropyEncoder for NullEncoder<'_, W> {
    type Writer = W;

    fn bit_stream(&mut self) -> &mut BitWriter<W> {
        self.bits
    }

    fn encode_byte(&mut self, value: u8) -> Result<()> {
        self.bits.write_bits(u64::from(value), 8)?;
        Ok(())
    }

    fn encode(&mut self, block: &[u8]) -> Result<usize> {
        let mut chunks = block.chunks_exact(8);

        for chunk in &mut chunks {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            self.bits.write_bits(u64::from_be_bytes(word), 64)?;
        }

        for &value in chunks.remainder() {
            self.encode_byte(value)?;
        }

        Ok(block.len())
    }
}

/// Reads payload bytes verbatim.
#[derive(Debug)]
pub struct NullDecoder<'a, R: Read> {
    bits: &'a mut BitReader<R>,
}

impl<'a, R: Read> NullDecoder<'a, R> {
    /// Create a decoder over a bit channel.
    pub fn new(bits: &'a mut BitReader<R>) -> Self {
        Self { bits }
    }
}

impl<R: Read> EntropyDecoder for NullDecoder<'_, R> {
    type Reader = R;

    fn bit_stream(&mut self) -> &mut BitReader<R> {
        self.bits
    }

    fn decode_byte(&mut self) -> Result<u8> {
        Ok(self.bits.read_bits(8)? as u8)
    }

    fn decode(&mut self, block: &mut [u8]) -> Result<usize> {
        let mut chunks = block.chunks_exact_mut(8);

        for chunk in &mut chunks {
            chunk.copy_from_slice(&self.bits.read_bits(64)?.to_be_bytes());
        }

        for slot in chunks.into_remainder() {
            *slot = self.decode_byte()?;
        }

        Ok(block.len())
    }
}
