//! Block codec: one block in, one self-describing block out.
//!
//! Forward path for a block of `L` bytes:
//!
//! 1. `L == 0`: the single byte `0x80` (end marker).
//! 2. `L < 16`: stored, `0x80 | L` then the raw bytes.
//! 3. Otherwise: optional RLT, BWT, MTFT, then ZLT. When the ZLT does not
//!    shrink the block the post-MTFT bytes are kept and the no-ZLT flag set.
//!
//! The header uses the narrowest field width holding both the compressed
//! length and the BWT primary index.

use crate::config::CodecConfig;
use crate::header::{BlockHeader, MAX_HEADER_SIZE};
use log::debug;
use oxiblock_core::error::{OxiBlockError, Result};
use oxiblock_core::traits::{ByteFunction, EntropyDecoder, EntropyEncoder, Progress};
use oxiblock_transform::{Pipeline, Rlt, Zlt};
use std::io;

/// Default block size in bytes.
pub const DEFAULT_BLOCK_SIZE: usize = 65530;

/// Largest block the 3-byte header fields can describe.
pub const MAX_BLOCK_SIZE: usize = 0xFF_FFFF;

/// Blocks shorter than this are always stored.
pub const SMALL_BLOCK_SIZE: usize = 16;

/// Grow `buffer` to at least `len` bytes. Never shrinks.
fn ensure_capacity(buffer: &mut Vec<u8>, len: usize) {
    if buffer.len() < len {
        buffer.resize(len, 0);
    }
}

/// Encodes and decodes single blocks.
///
/// Owns scratch buffers that grow to the largest block seen, so one instance
/// should be reused across the blocks of a stream. Not for shared use; give
/// each thread its own codec.
#[derive(Debug)]
pub struct BlockCodec {
    config: CodecConfig,
    /// Block length for the next call (0 = the whole source).
    size: usize,
    pipeline: Pipeline,
    /// Block under transformation.
    work: Vec<u8>,
    /// Zero length transform output.
    coded: Vec<u8>,
    /// Header and payload staging for `encode` / `decode`.
    frame: Vec<u8>,
    last_header: Option<BlockHeader>,
}

impl Default for BlockCodec {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl BlockCodec {
    /// Create a codec. The block size starts at 0 (the whole source).
    pub fn new(config: CodecConfig) -> Self {
        Self {
            config,
            size: 0,
            pipeline: Pipeline::bwt_mtft(),
            work: Vec::new(),
            coded: Vec::new(),
            frame: Vec::new(),
            last_header: None,
        }
    }

    /// The codec configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Block length used by the next `forward` (0 = the whole source).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Set the block length used by the next `forward`.
    pub fn set_size(&mut self, size: usize) -> Result<()> {
        if size > MAX_BLOCK_SIZE {
            return Err(OxiBlockError::invalid_argument(format!(
                "block size {size} exceeds {MAX_BLOCK_SIZE}"
            )));
        }

        self.size = size;
        Ok(())
    }

    /// Header of the block most recently produced or consumed.
    pub fn last_header(&self) -> Option<&BlockHeader> {
        self.last_header.as_ref()
    }

    /// Largest output `forward` can produce for a block of `len` bytes.
    pub fn max_encoded_len(len: usize) -> usize {
        len + MAX_HEADER_SIZE
    }

    /// Encode one block from the start of `src` into `dst`.
    ///
    /// On `BufferTooSmall` the contents of `dst` are unspecified.
    pub fn forward(&mut self, src: &[u8], dst: &mut [u8]) -> Result<Progress> {
        let len = if self.size == 0 { src.len() } else { self.size };

        if len > MAX_BLOCK_SIZE {
            return Err(OxiBlockError::invalid_argument(format!(
                "block of {len} bytes exceeds {MAX_BLOCK_SIZE}"
            )));
        }

        if len > src.len() {
            return Err(OxiBlockError::invalid_argument(format!(
                "block size {len} exceeds the {} source bytes",
                src.len()
            )));
        }

        let src = &src[..len];

        if len < SMALL_BLOCK_SIZE {
            let header = BlockHeader::stored(len)?;
            let header_len = header.encoded_len();
            let total = header_len + len;

            if dst.len() < total {
                return Err(OxiBlockError::buffer_too_small(total, dst.len()));
            }

            header.write_to(dst)?;
            dst[header_len..total].copy_from_slice(src);
            self.last_header = Some(header);
            debug!("Stored block of {} bytes", len);
            return Ok(Progress::new(len, total));
        }

        // Run length transform, kept only when it shrinks the block
        ensure_capacity(&mut self.work, len);
        let mut block_len = len;
        let mut run_length_skipped = true;

        if self.config.run_length {
            let progress = Rlt::new().forward(src, &mut self.work[..len - 1])?;

            if progress.consumed == len {
                block_len = progress.produced;
                run_length_skipped = false;
            }
        }

        if run_length_skipped {
            self.work[..len].copy_from_slice(src);
        }

        let block = &mut self.work[..block_len];
        let primary_index = self.pipeline.forward(block)?.unwrap_or(0);

        // Zero length transform into scratch, bounded so that finishing
        // means the payload is smaller than the block
        ensure_capacity(&mut self.coded, block_len - 1);
        let mut zlt = Zlt::with_size(block_len);
        let progress = zlt.forward(block, &mut self.coded[..block_len - 1])?;
        let zlt_skipped = !zlt.is_finished() || progress.consumed != block_len;

        let payload: &[u8] = if zlt_skipped {
            &self.work[..block_len]
        } else {
            &self.coded[..progress.produced]
        };

        let header =
            BlockHeader::transformed(payload.len(), primary_index, run_length_skipped, zlt_skipped)?;
        let header_len = header.encoded_len();
        let total = header_len + payload.len();

        if dst.len() < total {
            return Err(OxiBlockError::buffer_too_small(total, dst.len()));
        }

        dst[header_len..total].copy_from_slice(payload);
        header.write_to(dst)?;
        self.last_header = Some(header);

        debug!(
            "Block of {} bytes -> {} bytes (mode {:#04x}, width {}, primary index {})",
            len,
            total,
            header.mode(),
            header.width(),
            primary_index
        );

        Ok(Progress::new(len, total))
    }

    /// Decode one block from the start of `src` into `dst`.
    pub fn inverse(&mut self, src: &[u8], dst: &mut [u8]) -> Result<Progress> {
        let (header, header_len) = BlockHeader::parse(src)?;
        let payload_len = header.payload_len();
        let total = header_len + payload_len;

        if src.len() < total {
            return Err(OxiBlockError::unexpected_eof(total - src.len()));
        }

        let payload = &src[header_len..total];
        self.last_header = Some(header);

        if header.is_stored() {
            if dst.len() < payload_len {
                return Err(OxiBlockError::buffer_too_small(payload_len, dst.len()));
            }

            dst[..payload_len].copy_from_slice(payload);
            return Ok(Progress::new(total, payload_len));
        }

        let block_len = if header.zlt_skipped() {
            ensure_capacity(&mut self.work, payload_len);
            self.work[..payload_len].copy_from_slice(payload);
            payload_len
        } else {
            self.inverse_zlt(payload, dst.len())?
        };

        let primary_index = header.primary_index();
        if primary_index as usize >= block_len {
            return Err(OxiBlockError::corrupted(
                header_len as u64,
                format!("primary index {primary_index} outside block of {block_len} bytes"),
            ));
        }

        let block = &mut self.work[..block_len];
        self.pipeline.inverse(block, Some(primary_index))?;

        let produced = if header.run_length_skipped() {
            if dst.len() < block_len {
                return Err(OxiBlockError::buffer_too_small(block_len, dst.len()));
            }

            dst[..block_len].copy_from_slice(block);
            block_len
        } else {
            let needed = Rlt::decoded_len(block)?;

            if dst.len() < needed {
                return Err(OxiBlockError::buffer_too_small(needed, dst.len()));
            }

            Rlt::new().inverse(block, &mut dst[..needed])?.produced
        };

        debug!(
            "Block of {} bytes <- {} bytes (mode {:#04x})",
            produced,
            total,
            header.mode()
        );

        Ok(Progress::new(total, produced))
    }

    /// Undo the zero length transform of `payload` into `self.work`,
    /// returning the decoded length.
    fn inverse_zlt(&mut self, payload: &[u8], hint: usize) -> Result<usize> {
        let mut capacity = hint.max(payload.len()).clamp(1, MAX_BLOCK_SIZE);
        ensure_capacity(&mut self.work, capacity);

        let mut zlt = Zlt::with_size(payload.len());
        let mut consumed = 0;
        let mut produced = 0;

        loop {
            let progress = zlt.inverse(&payload[consumed..], &mut self.work[produced..capacity])?;
            consumed += progress.consumed;
            produced += progress.produced;

            if zlt.is_finished() {
                return Ok(produced);
            }

            if produced < capacity {
                return Err(OxiBlockError::corrupted(
                    consumed as u64,
                    "zero length payload ends inside a code",
                ));
            }

            if capacity == MAX_BLOCK_SIZE {
                return Err(OxiBlockError::corrupted(
                    consumed as u64,
                    format!("zero length payload expands beyond {MAX_BLOCK_SIZE} bytes"),
                ));
            }

            capacity = (capacity * 2).min(MAX_BLOCK_SIZE);
            ensure_capacity(&mut self.work, capacity);
        }
    }

    /// Encode one block and write it onto the encoder's bit channel: the
    /// header fields first, then the entropy coded payload.
    ///
    /// Returns the size of the block in bytes before entropy coding.
    pub fn encode<E: EntropyEncoder>(&mut self, src: &[u8], encoder: &mut E) -> Result<usize> {
        let len = if self.size == 0 { src.len() } else { self.size };
        let mut frame = std::mem::take(&mut self.frame);
        ensure_capacity(&mut frame, Self::max_encoded_len(len.min(MAX_BLOCK_SIZE)));

        let result = self.forward(src, &mut frame).and_then(|progress| {
            let (header, header_len) = BlockHeader::parse(&frame[..progress.produced])?;
            header.write_bits(encoder.bit_stream())?;

            let payload = &frame[header_len..progress.produced];
            if encoder.encode(payload)? != payload.len() {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "entropy coder wrote a short block",
                )
                .into());
            }

            encoder.finish()?;
            Ok(progress.produced)
        });

        self.frame = frame;
        result
    }

    /// Read one block from the decoder's bit channel and decode it into `dst`.
    ///
    /// Returns the number of bytes written to `dst`; 0 means the end marker
    /// was read.
    pub fn decode<D: EntropyDecoder>(&mut self, dst: &mut [u8], decoder: &mut D) -> Result<usize> {
        let header = BlockHeader::read_bits(decoder.bit_stream())?;

        if header.is_end_marker() {
            self.last_header = Some(header);
            return Ok(0);
        }

        let header_len = header.encoded_len();
        let total = header_len + header.payload_len();
        let mut frame = std::mem::take(&mut self.frame);
        ensure_capacity(&mut frame, total);
        header.write_to(&mut frame)?;

        let result = decoder
            .decode(&mut frame[header_len..total])
            .and_then(|decoded| {
                if decoded != header.payload_len() {
                    return Err(OxiBlockError::corrupted(
                        decoded as u64,
                        format!(
                            "entropy decoded {decoded} of {} payload bytes",
                            header.payload_len()
                        ),
                    ));
                }

                self.inverse(&frame[..total], dst)
            })
            .map(|progress| progress.produced);

        self.frame = frame;
        result
    }
}
