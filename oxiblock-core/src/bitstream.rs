//! Bit-level I/O for the block codec and entropy coders.
//!
//! This module provides `BitReader` and `BitWriter`, buffered bit streams over
//! any `Read` / `Write` implementation.
//!
//! # Bit Ordering
//!
//! Bits are packed MSB-first (Most Significant Bit first): the first bit
//! written lands in bit 7 of the first byte. Multi-bit values are written
//! most significant bit first as well, so `write_bits(0xABCD, 16)` produces
//! the bytes `AB CD`.
//!
//! # Closing
//!
//! [`BitWriter::close`] completes a partial byte with zero bits and then pads
//! the stream with `0xFF` bytes until the number of bits written is a multiple
//! of 64. Readers that fetch trailing data in 64-bit units can rely on the
//! total length being a multiple of 8 bytes.
//!
//! # Example
//!
//! ```
//! use oxiblock_core::bitstream::{BitReader, BitWriter};
//! use std::io::Cursor;
//!
//! let mut output = Vec::new();
//! {
//!     let mut writer = BitWriter::new(&mut output);
//!     writer.write_bits(0b101, 3).unwrap();
//!     writer.write_bits(0b11001, 5).unwrap();
//!     writer.close().unwrap();
//! }
//! assert_eq!(output.len(), 8);
//! assert_eq!(output[0], 0b1011_1001);
//!
//! let mut reader = BitReader::new(Cursor::new(&output));
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(5).unwrap(), 0b11001);
//! ```

use crate::error::{OxiBlockError, Result};
use std::io::{ErrorKind, Read, Write};

/// Default size of the internal byte buffer.
pub const DEFAULT_BUFFER_SIZE: usize = 16384;

/// Smallest buffer accepted by `with_buffer_size`: one 64-bit word.
pub const MIN_BUFFER_SIZE: usize = 8;

/// Mask selecting the `count` low-order bits (`count` in 1..=8).
#[inline]
fn low_bits(count: u32) -> u64 {
    (1u64 << count) - 1
}

/// A buffered MSB-first bit writer.
///
/// Complete bytes accumulate in a fixed-size buffer that is handed to the
/// underlying writer whenever it fills up, on [`flush`](Self::flush) and on
/// [`close`](Self::close).
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    /// Underlying writer.
    writer: W,
    /// Fixed-size byte buffer.
    buffer: Vec<u8>,
    /// Index of the byte currently being filled.
    position: usize,
    /// Bits already used in the current byte (0-7).
    bit_count: u32,
    /// Total bits written.
    written: u64,
    closed: bool,
}

impl<W: Write> BitWriter<W> {
    /// Create a new `BitWriter` with the default buffer size.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buffer: vec![0; DEFAULT_BUFFER_SIZE],
            position: 0,
            bit_count: 0,
            written: 0,
            closed: false,
        }
    }

    /// Create a new `BitWriter` with a buffer of `buffer_size` bytes.
    pub fn with_buffer_size(writer: W, buffer_size: usize) -> Result<Self> {
        if buffer_size < MIN_BUFFER_SIZE {
            return Err(OxiBlockError::invalid_argument(format!(
                "bit stream buffer size {buffer_size} is below {MIN_BUFFER_SIZE}"
            )));
        }

        Ok(Self {
            writer,
            buffer: vec![0; buffer_size],
            position: 0,
            bit_count: 0,
            written: 0,
            closed: false,
        })
    }

    /// Get a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Close the stream and return the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.close()?;
        Ok(self.writer)
    }

    /// Get the total number of bits written so far.
    ///
    /// After [`close`](Self::close) this includes the padding bits.
    pub fn bits_written(&self) -> u64 {
        self.written
    }

    /// Check whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Write a single bit (the least significant bit of `bit`).
    #[inline]
    pub fn write_bit(&mut self, bit: u32) -> Result<()> {
        self.write_bits(u64::from(bit & 1), 1).map(|_| ())
    }

    /// Write the `length` low-order bits of `value`, most significant first.
    ///
    /// # Arguments
    ///
    /// * `value` - The bits to write
    /// * `length` - Number of bits to write (0-64)
    ///
    /// # Returns
    ///
    /// The number of bits written.
    pub fn write_bits(&mut self, value: u64, length: u32) -> Result<u32> {
        if self.closed {
            return Err(OxiBlockError::StreamClosed);
        }

        if length > 64 {
            return Err(OxiBlockError::invalid_argument(format!(
                "invalid bit length {length} (must be in [0..64])"
            )));
        }

        let mut remaining = length;

        while remaining > 0 {
            let free = 8 - self.bit_count;
            let n = remaining.min(free);
            remaining -= n;
            let bits = ((value >> remaining) & low_bits(n)) as u8;
            self.buffer[self.position] |= bits << (free - n);
            self.bit_count += n;

            if self.bit_count == 8 {
                self.bit_count = 0;
                self.advance()?;
            }
        }

        self.written += u64::from(length);
        Ok(length)
    }

    /// Move to the next byte slot, flushing when the buffer is full.
    #[inline]
    fn advance(&mut self) -> Result<()> {
        self.position += 1;

        if self.position == self.buffer.len() {
            self.drain_complete_bytes()?;
        }

        Ok(())
    }

    /// Hand every complete byte to the writer, keeping a partial byte.
    fn drain_complete_bytes(&mut self) -> Result<()> {
        if self.position == 0 {
            return Ok(());
        }

        self.writer.write_all(&self.buffer[..self.position])?;

        let partial = if self.bit_count > 0 && self.position < self.buffer.len() {
            self.buffer[self.position]
        } else {
            0
        };

        let end = self.position.min(self.buffer.len() - 1);
        self.buffer[..=end].fill(0);
        self.buffer[0] = partial;
        self.position = 0;
        Ok(())
    }

    /// Write all complete bytes to the underlying writer and flush it.
    ///
    /// A partial byte stays buffered until more bits complete it or the
    /// stream is closed.
    pub fn flush(&mut self) -> Result<()> {
        if self.closed {
            return Err(OxiBlockError::StreamClosed);
        }

        self.drain_complete_bytes()?;
        self.writer.flush()?;
        Ok(())
    }

    /// Pad and flush the stream, then refuse any further write.
    ///
    /// A partial byte is completed with zero bits, then `0xFF` bytes are
    /// appended until the total bit count is a multiple of 64. Calling
    /// `close` more than once is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        if self.bit_count > 0 {
            self.written += u64::from(8 - self.bit_count);
            self.bit_count = 0;
            self.advance()?;
        }

        while self.written & 63 != 0 {
            self.buffer[self.position] = 0xFF;
            self.written += 8;
            self.advance()?;
        }

        self.drain_complete_bytes()?;
        self.writer.flush()?;
        self.closed = true;
        Ok(())
    }
}

/// A buffered MSB-first bit reader.
///
/// Bytes are pulled from the underlying reader into a fixed-size buffer,
/// which is refilled once every buffered bit has been consumed.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    /// Underlying reader.
    reader: R,
    /// Fixed-size byte buffer.
    buffer: Vec<u8>,
    /// Index of the byte currently being read.
    position: usize,
    /// Number of valid bytes in the buffer.
    limit: usize,
    /// Bits already consumed from the current byte (0-7).
    bit_count: u32,
    /// Total bits read.
    read: u64,
    closed: bool,
}

impl<R: Read> BitReader<R> {
    /// Create a new `BitReader` with the default buffer size.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: vec![0; DEFAULT_BUFFER_SIZE],
            position: 0,
            limit: 0,
            bit_count: 0,
            read: 0,
            closed: false,
        }
    }

    /// Create a new `BitReader` with a buffer of `buffer_size` bytes.
    pub fn with_buffer_size(reader: R, buffer_size: usize) -> Result<Self> {
        if buffer_size < MIN_BUFFER_SIZE {
            return Err(OxiBlockError::invalid_argument(format!(
                "bit stream buffer size {buffer_size} is below {MIN_BUFFER_SIZE}"
            )));
        }

        Ok(Self {
            reader,
            buffer: vec![0; buffer_size],
            position: 0,
            limit: 0,
            bit_count: 0,
            read: 0,
            closed: false,
        })
    }

    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Consume this `BitReader` and return the underlying reader.
    ///
    /// Bytes already buffered but not yet read are lost.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Get the total number of bits read so far.
    pub fn bits_read(&self) -> u64 {
        self.read
    }

    /// Check whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Refill the buffer from the underlying reader.
    fn refill(&mut self) -> Result<()> {
        if self.closed {
            return Err(OxiBlockError::StreamClosed);
        }

        loop {
            match self.reader.read(&mut self.buffer) {
                Ok(0) => return Err(OxiBlockError::end_of_stream(self.read)),
                Ok(n) => {
                    self.position = 0;
                    self.limit = n;
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Read a single bit (returns 0 or 1).
    #[inline]
    pub fn read_bit(&mut self) -> Result<u32> {
        self.read_bits(1).map(|bit| bit as u32)
    }

    /// Read `length` bits, most significant first.
    ///
    /// # Arguments
    ///
    /// * `length` - Number of bits to read (1-64)
    pub fn read_bits(&mut self, length: u32) -> Result<u64> {
        if self.closed {
            return Err(OxiBlockError::StreamClosed);
        }

        if length == 0 || length > 64 {
            return Err(OxiBlockError::invalid_argument(format!(
                "invalid bit length {length} (must be in [1..64])"
            )));
        }

        let mut remaining = length;
        let mut result = 0u64;

        while remaining > 0 {
            if self.position >= self.limit {
                self.refill()?;
            }

            let available = 8 - self.bit_count;
            let n = remaining.min(available);
            let byte = u64::from(self.buffer[self.position]);
            let bits = (byte >> (available - n)) & low_bits(n);
            // n <= 8 and the result holds at most 64 - n bits at this point
            result = (result << n) | bits;
            remaining -= n;
            self.bit_count += n;
            self.read += u64::from(n);

            if self.bit_count == 8 {
                self.bit_count = 0;
                self.position += 1;
            }
        }

        Ok(result)
    }

    /// Check whether at least one more bit can be read.
    ///
    /// May refill the buffer, but never consumes a bit.
    pub fn has_more_to_read(&mut self) -> bool {
        if self.closed {
            return false;
        }

        if self.position < self.limit {
            return true;
        }

        self.refill().is_ok()
    }

    /// Close the stream. Every later read fails with `StreamClosed`.
    pub fn close(&mut self) {
        self.closed = true;
        self.position = 0;
        self.limit = 0;
        self.bit_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    fn loopback(write: impl FnOnce(&mut BitWriter<&mut Vec<u8>>)) -> Vec<u8> {
        let mut output = Vec::new();
        {
            let mut writer = BitWriter::new(&mut output);
            write(&mut writer);
            writer.close().unwrap();
        }
        output
    }

    #[test]
    fn test_bit_sequence_roundtrip() {
        let output = loopback(|w| {
            w.write_bits(0b101, 3).unwrap();
            w.write_bits(0b11001, 5).unwrap();
        });

        let mut reader = BitReader::new(Cursor::new(&output));
        let bits: Vec<u32> = (0..8).map(|_| reader.read_bit().unwrap()).collect();
        assert_eq!(bits, vec![1, 0, 1, 1, 1, 0, 0, 1]);
    }

    #[test]
    fn test_sixteen_bit_loopback() {
        let output = loopback(|w| {
            assert_eq!(w.write_bits(0xABCD, 16).unwrap(), 16);
        });
        assert_eq!(&output[..2], &[0xAB, 0xCD]);

        let mut reader = BitReader::new(Cursor::new(&output));
        assert_eq!(reader.read_bits(16).unwrap(), 0xABCD);
    }

    #[test]
    fn test_write_bit_uses_lsb() {
        let output = loopback(|w| {
            for bit in [3, 0, 1, 2, 5, 4, 7, 9] {
                w.write_bit(bit).unwrap();
            }
        });
        assert_eq!(output[0], 0b1010_1011);
    }

    #[test]
    fn test_close_pads_to_64_bits() {
        let mut output = Vec::new();
        let mut writer = BitWriter::new(&mut output);
        writer.write_bits(0b101, 3).unwrap();
        writer.close().unwrap();
        assert_eq!(writer.bits_written(), 64);
        drop(writer);

        assert_eq!(output.len(), 8);
        assert_eq!(output[0], 0b1010_0000);
        assert!(output[1..].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_close_empty_stream_writes_nothing() {
        let mut output = Vec::new();
        let mut writer = BitWriter::new(&mut output);
        writer.close().unwrap();
        assert_eq!(writer.bits_written(), 0);
        drop(writer);
        assert!(output.is_empty());
    }

    #[test]
    fn test_close_aligned_stream_adds_no_padding() {
        let output = loopback(|w| {
            w.write_bits(0x0123_4567_89AB_CDEF, 64).unwrap();
        });
        assert_eq!(output, vec![0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF]);
    }

    #[test]
    fn test_close_is_idempotent_and_final() {
        let mut output = Vec::new();
        let mut writer = BitWriter::new(&mut output);
        writer.write_bits(0xFF, 8).unwrap();
        writer.close().unwrap();
        writer.close().unwrap();
        assert!(writer.is_closed());
        assert!(matches!(
            writer.write_bits(1, 1),
            Err(OxiBlockError::StreamClosed)
        ));
        assert!(matches!(writer.write_bit(1), Err(OxiBlockError::StreamClosed)));
        assert!(matches!(writer.flush(), Err(OxiBlockError::StreamClosed)));
    }

    #[test]
    fn test_write_invalid_length() {
        let mut output = Vec::new();
        let mut writer = BitWriter::new(&mut output);
        assert!(matches!(
            writer.write_bits(0, 65),
            Err(OxiBlockError::InvalidArgument { .. })
        ));
        assert_eq!(writer.write_bits(0xFFFF, 0).unwrap(), 0);
        assert_eq!(writer.bits_written(), 0);
    }

    #[test]
    fn test_read_invalid_length() {
        let mut reader = BitReader::new(Cursor::new(vec![0u8; 16]));
        assert!(matches!(
            reader.read_bits(0),
            Err(OxiBlockError::InvalidArgument { .. })
        ));
        assert!(matches!(
            reader.read_bits(65),
            Err(OxiBlockError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_read_past_end() {
        let mut reader = BitReader::new(Cursor::new(vec![0xAA]));
        assert_eq!(reader.read_bits(4).unwrap(), 0xA);
        let err = reader.read_bits(8).unwrap_err();
        assert!(err.is_end_of_stream());
    }

    #[test]
    fn test_reader_close() {
        let mut reader = BitReader::new(Cursor::new(vec![0xAA, 0xBB]));
        assert_eq!(reader.read_bits(8).unwrap(), 0xAA);
        reader.close();
        reader.close();
        assert!(!reader.has_more_to_read());
        assert!(matches!(reader.read_bit(), Err(OxiBlockError::StreamClosed)));
    }

    #[test]
    fn test_has_more_to_read_does_not_consume() {
        let mut reader = BitReader::new(Cursor::new(vec![0x5A]));
        assert!(reader.has_more_to_read());
        assert!(reader.has_more_to_read());
        assert_eq!(reader.read_bits(8).unwrap(), 0x5A);
        assert!(!reader.has_more_to_read());
        assert_eq!(reader.bits_read(), 8);
    }

    #[test]
    fn test_small_buffers_cross_refills() {
        let mut output = Vec::new();
        {
            let mut writer = BitWriter::with_buffer_size(&mut output, MIN_BUFFER_SIZE).unwrap();
            for i in 0..100u64 {
                writer.write_bits(i, 7).unwrap();
                writer.write_bits(i * 0x0101_0101, 33).unwrap();
            }
            writer.close().unwrap();
            assert_eq!(writer.bits_written() % 64, 0);
        }
        assert_eq!(output.len() % 8, 0);

        let mut reader = BitReader::with_buffer_size(Cursor::new(&output), 9).unwrap();
        for i in 0..100u64 {
            assert_eq!(reader.read_bits(7).unwrap(), i & 0x7F);
            assert_eq!(reader.read_bits(33).unwrap(), (i * 0x0101_0101) & 0x1_FFFF_FFFF);
        }
    }

    #[test]
    fn test_full_width_values() {
        let values = [0u64, 1, u64::MAX, 0x8000_0000_0000_0001, 0xDEAD_BEEF_CAFE_BABE];
        let output = loopback(|w| {
            w.write_bit(1).unwrap();
            for &v in &values {
                w.write_bits(v, 64).unwrap();
            }
        });

        let mut reader = BitReader::new(Cursor::new(&output));
        assert_eq!(reader.read_bit().unwrap(), 1);
        for &v in &values {
            assert_eq!(reader.read_bits(64).unwrap(), v);
        }
    }

    #[test]
    fn test_flush_keeps_partial_byte() {
        let mut output = Vec::new();
        {
            let mut writer = BitWriter::new(&mut output);
            writer.write_bits(0xAB, 8).unwrap();
            writer.write_bits(0b11, 2).unwrap();
            writer.flush().unwrap();
            writer.write_bits(0b000111, 6).unwrap();
            writer.close().unwrap();
        }
        assert_eq!(&output[..2], &[0xAB, 0b1100_0111]);
    }

    #[test]
    fn test_invalid_buffer_size() {
        assert!(BitWriter::with_buffer_size(Vec::new(), 0).is_err());
        assert!(BitReader::with_buffer_size(Cursor::new(Vec::new()), 0).is_err());
        assert!(matches!(
            BitWriter::with_buffer_size(Vec::new(), MIN_BUFFER_SIZE - 1),
            Err(OxiBlockError::InvalidArgument { .. })
        ));
        assert!(BitReader::with_buffer_size(Cursor::new(Vec::new()), MIN_BUFFER_SIZE - 1).is_err());
        assert!(BitWriter::with_buffer_size(Vec::new(), MIN_BUFFER_SIZE).is_ok());
        assert!(BitReader::with_buffer_size(Cursor::new(Vec::new()), MIN_BUFFER_SIZE).is_ok());
    }

    #[test]
    fn test_shared_writer_serializes_calls() {
        let writer = Arc::new(Mutex::new(BitWriter::new(Vec::new())));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let writer = Arc::clone(&writer);
                std::thread::spawn(move || {
                    for _ in 0..16 {
                        writer.lock().unwrap().write_bits(0xA5, 8).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let writer = Arc::try_unwrap(writer).unwrap().into_inner().unwrap();
        let output = writer.into_inner().unwrap();
        assert_eq!(output.len(), 64);
        assert!(output.iter().all(|&b| b == 0xA5));
    }
}
