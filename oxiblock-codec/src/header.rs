//! Block header layout.
//!
//! ```text
//! mode (1 byte)
//!   0x80 set:   stored block, low 7 bits = literal length (0 = end marker)
//!   0x80 clear: low nibble = field width in bytes (1-3)
//!               0x20 = run length transform skipped
//!               0x40 = zero length transform skipped
//! compressed length (width bytes, MSB first)   transformed blocks only
//! primary index     (width bytes, MSB first)   transformed blocks only
//! ```

use oxiblock_core::bitstream::{BitReader, BitWriter};
use oxiblock_core::error::{OxiBlockError, Result};
use std::io::{Read, Write};

/// Stored block flag.
pub const COPY_BLOCK_MASK: u8 = 0x80;

/// Literal length of a stored block.
pub const COPY_LENGTH_MASK: u8 = 0x7F;

/// Run length transform skipped.
pub const NO_RLT_MASK: u8 = 0x20;

/// Zero length transform skipped.
pub const NO_ZLT_MASK: u8 = 0x40;

/// Field width of a transformed block.
pub const SIZE_MASK: u8 = 0x0F;

/// Mode bit with no meaning; must be clear.
const RESERVED_MASK: u8 = 0x10;

/// Largest header: mode plus two 3-byte fields.
pub const MAX_HEADER_SIZE: usize = 7;

/// Decoded block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    mode: u8,
    compressed_length: usize,
    primary_index: u32,
}

impl BlockHeader {
    /// The zero-length stored block that ends a stream.
    pub const END_MARKER: Self = Self {
        mode: COPY_BLOCK_MASK,
        compressed_length: 0,
        primary_index: 0,
    };

    /// Header of a stored block of `length` bytes (at most 127).
    pub fn stored(length: usize) -> Result<Self> {
        if length > COPY_LENGTH_MASK as usize {
            return Err(OxiBlockError::invalid_argument(format!(
                "stored block of {length} bytes exceeds {COPY_LENGTH_MASK}"
            )));
        }

        Ok(Self {
            mode: COPY_BLOCK_MASK | length as u8,
            compressed_length: length,
            primary_index: 0,
        })
    }

    /// Header of a transformed block, using the narrowest field width that
    /// holds both values.
    pub fn transformed(
        compressed_length: usize,
        primary_index: u32,
        run_length_skipped: bool,
        zlt_skipped: bool,
    ) -> Result<Self> {
        if compressed_length == 0 {
            return Err(OxiBlockError::invalid_argument(
                "transformed block with an empty payload",
            ));
        }

        let width = width_for(compressed_length.max(primary_index as usize))?;
        let mut mode = width;

        if run_length_skipped {
            mode |= NO_RLT_MASK;
        }

        if zlt_skipped {
            mode |= NO_ZLT_MASK;
        }

        Ok(Self {
            mode,
            compressed_length,
            primary_index,
        })
    }

    /// Build a header from its mode byte and field values, validating the mode.
    fn from_parts(mode: u8, compressed_length: usize, primary_index: u32) -> Result<Self> {
        let header = Self {
            mode,
            compressed_length,
            primary_index,
        };

        if header.is_stored() {
            return Ok(header);
        }

        if mode & RESERVED_MASK != 0 {
            return Err(OxiBlockError::invalid_header(format!(
                "reserved bit set in mode {mode:#04x}"
            )));
        }

        if compressed_length == 0 {
            return Err(OxiBlockError::invalid_header(
                "transformed block declares an empty payload",
            ));
        }

        Ok(header)
    }

    /// The mode byte.
    pub fn mode(&self) -> u8 {
        self.mode
    }

    /// Whether the block is stored verbatim.
    pub fn is_stored(&self) -> bool {
        self.mode & COPY_BLOCK_MASK != 0
    }

    /// Whether this is the zero-length stored block.
    pub fn is_end_marker(&self) -> bool {
        self.mode == COPY_BLOCK_MASK
    }

    /// Whether the run length transform was skipped.
    pub fn run_length_skipped(&self) -> bool {
        !self.is_stored() && self.mode & NO_RLT_MASK != 0
    }

    /// Whether the zero length transform was skipped.
    pub fn zlt_skipped(&self) -> bool {
        !self.is_stored() && self.mode & NO_ZLT_MASK != 0
    }

    /// Field width in bytes (0 for stored blocks).
    pub fn width(&self) -> usize {
        if self.is_stored() {
            0
        } else {
            (self.mode & SIZE_MASK) as usize
        }
    }

    /// Number of payload bytes following the header.
    pub fn payload_len(&self) -> usize {
        self.compressed_length
    }

    /// BWT primary index (0 for stored blocks).
    pub fn primary_index(&self) -> u32 {
        self.primary_index
    }

    /// Size of the header in bytes.
    pub fn encoded_len(&self) -> usize {
        1 + 2 * self.width()
    }

    /// Write the header to the start of `dst`, returning its size.
    pub fn write_to(&self, dst: &mut [u8]) -> Result<usize> {
        let len = self.encoded_len();

        if dst.len() < len {
            return Err(OxiBlockError::buffer_too_small(len, dst.len()));
        }

        dst[0] = self.mode;
        let width = self.width();
        write_field(&mut dst[1..1 + width], self.compressed_length as u64);
        write_field(&mut dst[1 + width..len], u64::from(self.primary_index));
        Ok(len)
    }

    /// Parse a header from the start of `src`, returning it with its size.
    pub fn parse(src: &[u8]) -> Result<(Self, usize)> {
        let Some(&mode) = src.first() else {
            return Err(OxiBlockError::unexpected_eof(1));
        };

        if mode & COPY_BLOCK_MASK != 0 {
            let length = (mode & COPY_LENGTH_MASK) as usize;
            return Ok((Self::from_parts(mode, length, 0)?, 1));
        }

        let width = check_width(mode)?;
        let len = 1 + 2 * width;

        if src.len() < len {
            return Err(OxiBlockError::invalid_header(format!(
                "header needs {len} bytes, block has {}",
                src.len()
            )));
        }

        let compressed_length = read_field(&src[1..1 + width]) as usize;
        let primary_index = read_field(&src[1 + width..len]) as u32;
        Ok((Self::from_parts(mode, compressed_length, primary_index)?, len))
    }

    /// Write the header fields onto a bit channel: the mode as 8 bits, then
    /// both fields as `8 * width` bits.
    pub fn write_bits<W: Write>(&self, bits: &mut BitWriter<W>) -> Result<()> {
        bits.write_bits(u64::from(self.mode), 8)?;

        let width = self.width() as u32;
        if width > 0 {
            bits.write_bits(self.compressed_length as u64, 8 * width)?;
            bits.write_bits(u64::from(self.primary_index), 8 * width)?;
        }

        Ok(())
    }

    /// Read header fields written by [`write_bits`](Self::write_bits).
    pub fn read_bits<R: Read>(bits: &mut BitReader<R>) -> Result<Self> {
        let mode = bits.read_bits(8)? as u8;

        if mode & COPY_BLOCK_MASK != 0 {
            return Self::from_parts(mode, (mode & COPY_LENGTH_MASK) as usize, 0);
        }

        let width = check_width(mode)? as u32;
        let compressed_length = bits.read_bits(8 * width)? as usize;
        let primary_index = bits.read_bits(8 * width)? as u32;
        Self::from_parts(mode, compressed_length, primary_index)
    }
}

/// Narrowest field width (1-3 bytes) that holds `value`.
pub fn width_for(value: usize) -> Result<u8> {
    match value {
        0..=0xFF => Ok(1),
        0x100..=0xFFFF => Ok(2),
        0x1_0000..=0xFF_FFFF => Ok(3),
        _ => Err(OxiBlockError::invalid_argument(format!(
            "header field value {value} exceeds 3 bytes"
        ))),
    }
}

fn check_width(mode: u8) -> Result<usize> {
    match (mode & SIZE_MASK) as usize {
        width @ 1..=3 => Ok(width),
        width => Err(OxiBlockError::invalid_header(format!(
            "field width {width} outside 1..=3 in mode {mode:#04x}"
        ))),
    }
}

fn write_field(dst: &mut [u8], value: u64) {
    let bytes = value.to_be_bytes();
    dst.copy_from_slice(&bytes[8 - dst.len()..]);
}

fn read_field(src: &[u8]) -> u64 {
    src.iter().fold(0, |acc, &b| (acc << 8) | u64::from(b))
}
