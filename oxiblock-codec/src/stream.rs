//! Stream framing over the block codec.
//!
//! ```text
//! entropy tag  (8 bits: b'N' null, b'G' Exp-Golomb)
//! block size   (24 bits, largest decoded block)
//! block*       (BlockCodec::encode output)
//! end marker   (0x80, a zero-length stored block)
//! padding      (to a multiple of 64 bits)
//! ```

use crate::block::{BlockCodec, MAX_BLOCK_SIZE};
use crate::config::{CodecConfig, EntropyKind};
use crate::entropy::{ExpGolombDecoder, ExpGolombEncoder, NullDecoder, NullEncoder};
use crate::header::BlockHeader;
use log::{debug, info};
use oxiblock_core::bitstream::{BitReader, BitWriter};
use oxiblock_core::error::{OxiBlockError, Result};
use std::io::{Cursor, Read, Write};

fn encode_block<W: Write>(
    codec: &mut BlockCodec,
    bits: &mut BitWriter<W>,
    entropy: EntropyKind,
    block: &[u8],
) -> Result<usize> {
    match entropy {
        EntropyKind::Null => codec.encode(block, &mut NullEncoder::new(bits)),
        EntropyKind::ExpGolomb => codec.encode(block, &mut ExpGolombEncoder::new(bits)),
    }
}

fn decode_block<R: Read>(
    codec: &mut BlockCodec,
    bits: &mut BitReader<R>,
    entropy: EntropyKind,
    dst: &mut [u8],
) -> Result<usize> {
    match entropy {
        EntropyKind::Null => codec.decode(dst, &mut NullDecoder::new(bits)),
        EntropyKind::ExpGolomb => codec.decode(dst, &mut ExpGolombDecoder::new(bits)),
    }
}

/// Writes a block stream.
#[derive(Debug)]
pub struct BlockCompressor<W: Write> {
    bits: BitWriter<W>,
    codec: BlockCodec,
    config: CodecConfig,
    blocks: u64,
}

impl<W: Write> BlockCompressor<W> {
    /// Create a compressor and write the stream header.
    pub fn new(writer: W, config: CodecConfig) -> Result<Self> {
        config.validate()?;

        let mut bits = BitWriter::new(writer);
        bits.write_bits(u64::from(config.entropy.tag()), 8)?;
        bits.write_bits(config.block_size as u64, 24)?;

        Ok(Self {
            bits,
            codec: BlockCodec::new(config),
            config,
            blocks: 0,
        })
    }

    /// The stream configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Number of blocks written so far.
    pub fn blocks(&self) -> u64 {
        self.blocks
    }

    /// Bits written so far, header included.
    pub fn bits_written(&self) -> u64 {
        self.bits.bits_written()
    }

    /// Compress one block of at most `block_size` bytes.
    ///
    /// Returns the block size in bytes before entropy coding. An empty block
    /// writes nothing, since it would read back as the end marker.
    pub fn write_block(&mut self, data: &[u8]) -> Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }

        if data.len() > self.config.block_size {
            return Err(OxiBlockError::invalid_argument(format!(
                "block of {} bytes exceeds the stream block size {}",
                data.len(),
                self.config.block_size
            )));
        }

        let written = encode_block(&mut self.codec, &mut self.bits, self.config.entropy, data)?;
        self.blocks += 1;
        Ok(written)
    }

    /// Compress `data`, split into blocks of `block_size` bytes.
    pub fn write_all(&mut self, data: &[u8]) -> Result<()> {
        for block in data.chunks(self.config.block_size) {
            self.write_block(block)?;
        }
        Ok(())
    }

    /// Write the end marker, close the bit stream and return the writer.
    pub fn finish(mut self) -> Result<W> {
        BlockHeader::END_MARKER.write_bits(&mut self.bits)?;
        info!(
            "Wrote {} blocks, {} bits before padding",
            self.blocks,
            self.bits.bits_written()
        );
        self.bits.into_inner()
    }
}

/// Reads a block stream.
#[derive(Debug)]
pub struct BlockDecompressor<R: Read> {
    bits: BitReader<R>,
    codec: BlockCodec,
    entropy: EntropyKind,
    block_size: usize,
    buffer: Vec<u8>,
    finished: bool,
}

impl<R: Read> BlockDecompressor<R> {
    /// Create a decompressor and read the stream header.
    pub fn new(reader: R) -> Result<Self> {
        let mut bits = BitReader::new(reader);
        let entropy = EntropyKind::from_tag(bits.read_bits(8)? as u8)?;
        let block_size = bits.read_bits(24)? as usize;

        if block_size == 0 || block_size > MAX_BLOCK_SIZE {
            return Err(OxiBlockError::invalid_header(format!(
                "stream block size {block_size} outside 1..={MAX_BLOCK_SIZE}"
            )));
        }

        debug!("Stream uses {} coder, {} byte blocks", entropy, block_size);

        Ok(Self {
            bits,
            codec: BlockCodec::default(),
            entropy,
            block_size,
            buffer: vec![0u8; block_size],
            finished: false,
        })
    }

    /// Entropy coder named by the stream header.
    pub fn entropy(&self) -> EntropyKind {
        self.entropy
    }

    /// Largest block in the stream.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Bits read so far, header included.
    pub fn bits_read(&self) -> u64 {
        self.bits.bits_read()
    }

    /// Header of the block most recently read.
    pub fn last_header(&self) -> Option<&BlockHeader> {
        self.codec.last_header()
    }

    /// Read and decode the next block. `None` after the end marker.
    pub fn read_block(&mut self) -> Result<Option<&[u8]>> {
        if self.finished {
            return Ok(None);
        }

        let len = decode_block(&mut self.codec, &mut self.bits, self.entropy, &mut self.buffer)?;

        if len == 0 {
            self.finished = true;
            return Ok(None);
        }

        Ok(Some(&self.buffer[..len]))
    }

    /// Return the underlying reader.
    pub fn into_inner(self) -> R {
        self.bits.into_inner()
    }
}

/// Compress `data` into a complete stream.
pub fn compress(data: &[u8], config: &CodecConfig) -> Result<Vec<u8>> {
    let mut compressor = BlockCompressor::new(Vec::new(), *config)?;
    compressor.write_all(data)?;
    compressor.finish()
}

/// Decompress a complete stream.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decompressor = BlockDecompressor::new(Cursor::new(data))?;
    let mut output = Vec::new();

    while let Some(block) = decompressor.read_block()? {
        output.extend_from_slice(block);
    }

    Ok(output)
}
