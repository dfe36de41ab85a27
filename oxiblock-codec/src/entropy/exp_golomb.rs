//! Order-0 Exp-Golomb coder.
//!
//! A byte `v` is coded as `v + 1` in `n` bits preceded by `n - 1` zero bits,
//! where `n` is the bit length of `v + 1`. Zero costs a single bit, so the
//! zero-dominated output of MTFT + ZLT shrinks further; 0xFF costs 17 bits.

use oxiblock_core::bitstream::{BitReader, BitWriter};
use oxiblock_core::error::{OxiBlockError, Result};
use oxiblock_core::traits::{EntropyDecoder, EntropyEncoder};
use std::io::{Read, Write};

/// Longest zero prefix a byte value can produce (`0xFF + 1` has 9 bits).
const MAX_PREFIX: u32 = 8;

/// Exp-Golomb encoder.
#[derive(Debug)]
pub struct ExpGolombEncoder<'a, W: Write> {
    bits: &'a mut BitWriter<W>,
}

impl<'a, W: Write> ExpGolombEncoder<'a, W> {
    /// Create an encoder over a bit channel.
    pub fn new(bits: &'a mut BitWriter<W>) -> Self {
        Self { bits }
    }
}

impl<W: Write> EntropyEncoder for ExpGolombEncoder<'_, W> {
    type Writer = W;

    fn bit_stream(&mut self) -> &mut BitWriter<W> {
        self.bits
    }

    fn encode_byte(&mut self, value: u8) -> Result<()> {
        let code = u64::from(value) + 1;
        let length = 64 - code.leading_zeros();

        // The zero prefix is the high bits of a (2n - 1)-bit field
        self.bits.write_bits(code, 2 * length - 1)?;
        Ok(())
    }
}

/// Exp-Golomb decoder.
#[derive(Debug)]
pub struct ExpGolombDecoder<'a, R: Read> {
    bits: &'a mut BitReader<R>,
}

impl<'a, R: Read> ExpGolombDecoder<'a, R> {
    /// Create a decoder over a bit channel.
    pub fn new(bits: &'a mut BitReader<R>) -> Self {
        Self { bits }
    }
}

impl<R: Read> EntropyDecoder for ExpGolombDecoder<'_, R> {
    type Reader = R;

    fn bit_stream(&mut self) -> &mut BitReader<R> {
        self.bits
    }

    fn decode_byte(&mut self) -> Result<u8> {
        let mut prefix = 0;

        while self.bits.read_bit()? == 0 {
            prefix += 1;

            if prefix > MAX_PREFIX {
                return Err(OxiBlockError::corrupted(
                    self.bits.bits_read() / 8,
                    "Exp-Golomb prefix too long",
                ));
            }
        }

        let mut code = 1u64;
        if prefix > 0 {
            code = (code << prefix) | self.bits.read_bits(prefix)?;
        }

        u8::try_from(code - 1).map_err(|_| {
            OxiBlockError::corrupted(self.bits.bits_read() / 8, "Exp-Golomb value exceeds a byte")
        })
    }
}
