//! Zero Length Transform.
//!
//! A reversible byte transform closely related to run-length encoding, but
//! only runs of zero bytes are coded. It is tuned for the output of BWT + MTFT,
//! which is dominated by zeros.
//!
//! # Encoding
//!
//! - A run of `r` zeros is written as the binary digits of `r + 1` with the
//!   leading 1 dropped, most significant digit first, one byte (0 or 1) per
//!   digit. Example: 3 zeros -> `r + 1 = 0b100` -> bytes `00 00`.
//! - A literal `v` in `1..=0xFD` is written as `v + 1`.
//! - Literals `0xFE` and `0xFF` are escaped as `FF 00` and `FF 01`.
//!
//! Run digits never exceed 1 and literals are always at least 2, so the two
//! never collide.
//!
//! # Resuming
//!
//! A [`Zlt`] carries its run state between calls, so a logical stream can be
//! fed in chunks. When built with [`Zlt::with_size`], a zero run reaching the
//! end of a chunk stays pending until a non-zero byte or the logical end
//! terminates it, and a full destination leaves the remaining run digits
//! pending. Concatenating the outputs of successive calls yields exactly the
//! output of a single call over the whole stream.

use oxiblock_core::error::{OxiBlockError, Result};
use oxiblock_core::traits::{ByteFunction, Progress};

/// Escape byte for the literals `0xFE` and `0xFF`.
const ESCAPE: u8 = 0xFF;

/// Largest run code accepted on decode before the shift would overflow.
const MAX_RUN_CODE: u64 = u64::MAX >> 2;

/// Zero Length Transform with carried run state.
#[derive(Debug, Clone, Default)]
pub struct Zlt {
    /// Logical stream length in bytes (0 = unbounded, each source slice ends it).
    size: usize,
    /// Source bytes consumed so far.
    processed: usize,
    /// Forward: zeros seen but not yet fully coded. Inverse: zeros left to output.
    run_length: u64,
    /// Forward: run digits of `run_length + 1` still to be written.
    pending_digits: u32,
}

impl Zlt {
    /// Create an unbounded transform: every call treats the end of its
    /// source slice as the end of the stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transform for a logical stream of `size` bytes, which may be
    /// fed over several calls. A size of zero is the same as [`Zlt::new`].
    pub fn with_size(size: usize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// The logical stream length (0 = unbounded).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Source bytes consumed over all calls.
    pub fn processed(&self) -> usize {
        self.processed
    }

    /// True while a run is carried over to the next call.
    pub fn has_pending(&self) -> bool {
        self.run_length > 0 || self.pending_digits > 0
    }

    /// True once the whole logical stream has been consumed and nothing is
    /// left pending.
    pub fn is_finished(&self) -> bool {
        !self.has_pending() && (self.size == 0 || self.processed == self.size)
    }

    /// Number of bytes of a `len`-byte source slice that belong to the stream.
    fn chunk_end(&self, len: usize) -> usize {
        if self.size == 0 {
            len
        } else {
            len.min(self.size - self.processed)
        }
    }

    /// Whether consuming `end` more bytes reaches the end of the stream.
    fn reaches_end(&self, end: usize) -> bool {
        self.size == 0 || self.processed + end == self.size
    }

    /// Begin coding the accumulated run: one digit per bit of `run + 1`
    /// below its leading 1.
    fn start_run_code(&mut self) {
        let code = self.run_length + 1;
        self.pending_digits = 63 - code.leading_zeros();
    }

    /// Write as many pending run digits as fit from `dst[pos..]`.
    fn emit_run_digits(&mut self, dst: &mut [u8], mut pos: usize) -> usize {
        let code = self.run_length + 1;

        while self.pending_digits > 0 && pos < dst.len() {
            self.pending_digits -= 1;
            dst[pos] = ((code >> self.pending_digits) & 1) as u8;
            pos += 1;
        }

        if self.pending_digits == 0 {
            self.run_length = 0;
        }

        pos
    }
}

impl ByteFunction for Zlt {
    /// Code `src` into `dst`.
    ///
    /// Never fails on a short destination: the returned [`Progress`] tells how
    /// much was consumed and produced, and any interrupted run is carried.
    fn forward(&mut self, src: &[u8], dst: &mut [u8]) -> Result<Progress> {
        let end = self.chunk_end(src.len());
        let mut src_idx = 0;
        let mut dst_idx = 0;

        if self.pending_digits > 0 {
            dst_idx = self.emit_run_digits(dst, dst_idx);

            if self.pending_digits > 0 {
                return Ok(Progress::new(0, dst_idx));
            }
        }

        while src_idx < end {
            let val = src[src_idx];

            if val == 0 {
                self.run_length += 1;
                src_idx += 1;
                continue;
            }

            if self.run_length > 0 {
                self.start_run_code();
                dst_idx = self.emit_run_digits(dst, dst_idx);

                if self.pending_digits > 0 {
                    break;
                }
            }

            if val >= 0xFE {
                if dst_idx + 2 > dst.len() {
                    break;
                }

                dst[dst_idx] = ESCAPE;
                dst[dst_idx + 1] = val - 0xFE;
                dst_idx += 2;
            } else {
                if dst_idx >= dst.len() {
                    break;
                }

                dst[dst_idx] = val + 1;
                dst_idx += 1;
            }

            src_idx += 1;
        }

        // The end of the stream terminates a trailing run
        if src_idx == end
            && self.run_length > 0
            && self.pending_digits == 0
            && self.reaches_end(end)
        {
            self.start_run_code();
            dst_idx = self.emit_run_digits(dst, dst_idx);
        }

        self.processed += src_idx;
        Ok(Progress::new(src_idx, dst_idx))
    }

    /// Decode `src` into `dst`.
    ///
    /// Zeros that do not fit `dst` are carried to the next call. A run code cut
    /// by the end of `src` before the end of the stream is left unconsumed so
    /// that the next call, given more input, decodes it whole.
    fn inverse(&mut self, src: &[u8], dst: &mut [u8]) -> Result<Progress> {
        let end = self.chunk_end(src.len());
        let at_end = self.reaches_end(end);
        let mut src_idx = 0;
        let mut dst_idx = 0;

        loop {
            if self.run_length > 0 {
                let room = (dst.len() - dst_idx) as u64;
                let n = self.run_length.min(room) as usize;
                dst[dst_idx..dst_idx + n].fill(0);
                dst_idx += n;
                self.run_length -= n as u64;

                if self.run_length > 0 {
                    break;
                }
            }

            if src_idx >= end || dst_idx >= dst.len() {
                break;
            }

            let val = src[src_idx];

            if val <= 1 {
                // Rebuild the run length digit by digit over the implicit leading 1
                let mut code = 1u64;
                let mut idx = src_idx;

                while idx < end && src[idx] <= 1 {
                    if code > MAX_RUN_CODE {
                        return Err(OxiBlockError::corrupted(
                            (self.processed + idx) as u64,
                            "zero run length overflow",
                        ));
                    }

                    code = (code << 1) | u64::from(src[idx]);
                    idx += 1;
                }

                if idx == end && !at_end {
                    break;
                }

                src_idx = idx;
                self.run_length = code - 1;
                continue;
            }

            if val == ESCAPE {
                if src_idx + 1 >= end {
                    if at_end {
                        return Err(OxiBlockError::corrupted(
                            (self.processed + src_idx) as u64,
                            "escape byte without its low bit",
                        ));
                    }
                    break;
                }

                dst[dst_idx] = 0xFE + (src[src_idx + 1] & 1);
                src_idx += 2;
            } else {
                dst[dst_idx] = val - 1;
                src_idx += 1;
            }

            dst_idx += 1;
        }

        self.processed += src_idx;
        Ok(Progress::new(src_idx, dst_idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(data: &[u8]) -> Vec<u8> {
        let mut dst = vec![0u8; data.len() * 2 + 8];
        let progress = Zlt::new().forward(data, &mut dst).unwrap();
        assert_eq!(progress.consumed, data.len());
        dst.truncate(progress.produced);
        dst
    }

    fn decode(data: &[u8], capacity: usize) -> Vec<u8> {
        let mut dst = vec![0u8; capacity];
        let mut zlt = Zlt::new();
        let progress = zlt.inverse(data, &mut dst).unwrap();
        assert_eq!(progress.consumed, data.len());
        assert!(zlt.is_finished());
        dst.truncate(progress.produced);
        dst
    }

    #[test]
    fn test_forward_layout() {
        let encoded = encode(&[0, 0, 0, 5, 0xFE, 0xFF, 0]);
        // 3 zeros -> 0b100 -> [0, 0]; 5 -> 6; escapes; 1 zero -> 0b10 -> [0]
        assert_eq!(encoded, vec![0, 0, 6, 0xFF, 0, 0xFF, 1, 0]);
    }

    #[test]
    fn test_inverse_layout() {
        let decoded = decode(&[0, 0, 6, 0xFF, 0, 0xFF, 1, 0], 16);
        assert_eq!(decoded, vec![0, 0, 0, 5, 0xFE, 0xFF, 0]);
    }

    #[test]
    fn test_run_lengths_roundtrip() {
        for run in 1..=600usize {
            let mut data = vec![7u8];
            data.extend(std::iter::repeat_n(0u8, run));
            data.push(9);

            let encoded = encode(&data);
            let digits = (usize::BITS - 1 - (run + 1).leading_zeros()) as usize;
            assert_eq!(encoded.len(), 2 + digits, "run {run}");
            assert_eq!(decode(&encoded, data.len()), data, "run {run}");
        }
    }

    #[test]
    fn test_all_byte_values() {
        let data: Vec<u8> = (0..=255u8).chain((0..=255u8).rev()).collect();
        let encoded = encode(&data);
        assert_eq!(decode(&encoded, data.len()), data);
    }

    #[test]
    fn test_empty() {
        assert!(encode(&[]).is_empty());
        assert!(decode(&[], 4).is_empty());
    }

    #[test]
    fn test_only_zeros() {
        let data = vec![0u8; 1000];
        let encoded = encode(&data);
        // 1001 = 0b1111101001 -> nine digits
        assert_eq!(encoded, vec![1, 1, 1, 1, 0, 1, 0, 0, 1]);
        assert_eq!(decode(&encoded, 1000), data);
    }

    #[test]
    fn test_forward_short_destination_stops_gracefully() {
        let data = [0xFFu8; 10];
        let mut dst = [0u8; 5];
        let progress = Zlt::new().forward(&data, &mut dst).unwrap();
        // Two escapes fit, the third does not start
        assert_eq!(progress, Progress::new(2, 4));
    }

    #[test]
    fn test_forward_carries_run_digits_across_destinations() {
        let mut data = vec![0u8; 1000];
        data.push(42);
        let whole = encode(&data);

        let mut zlt = Zlt::with_size(data.len());
        let mut out = Vec::new();
        let mut src = &data[..];
        let mut dst = [0u8; 3];

        while !zlt.is_finished() {
            let progress = zlt.forward(src, &mut dst).unwrap();
            out.extend_from_slice(&dst[..progress.produced]);
            src = &src[progress.consumed..];
        }

        assert!(src.is_empty());
        assert_eq!(out, whole);
    }

    #[test]
    fn test_forward_sized_holds_run_at_chunk_end() {
        let data = [0u8, 0, 0, 0, 0, 0, 3];
        let mut zlt = Zlt::with_size(data.len());
        let mut dst = [0u8; 16];

        let first = zlt.forward(&data[..3], &mut dst).unwrap();
        assert_eq!(first, Progress::new(3, 0));
        assert!(zlt.has_pending());

        let second = zlt.forward(&data[3..], &mut dst).unwrap();
        assert_eq!(second.consumed, 4);
        assert_eq!(&dst[..second.produced], &encode(&data)[..]);
        assert!(zlt.is_finished());
    }

    #[test]
    fn test_inverse_carries_zeros_across_destinations() {
        let encoded = encode(&[0u8; 100]);
        let mut zlt = Zlt::with_size(encoded.len());
        let mut dst = [0xAAu8; 30];
        let mut total = 0;
        let mut src = &encoded[..];

        while !zlt.is_finished() {
            let progress = zlt.inverse(src, &mut dst).unwrap();
            assert!(dst[..progress.produced].iter().all(|&b| b == 0));
            total += progress.produced;
            src = &src[progress.consumed..];
        }

        assert_eq!(total, 100);
    }

    #[test]
    fn test_inverse_stops_before_partial_run_code() {
        let mut data = vec![0u8; 37];
        data.push(1);
        let encoded = encode(&data);
        assert!(encoded.len() > 3);

        let mut zlt = Zlt::with_size(encoded.len());
        let mut dst = vec![0u8; 64];

        // Only part of the run code is available: nothing can be decided yet
        let first = zlt.inverse(&encoded[..2], &mut dst).unwrap();
        assert_eq!(first, Progress::new(0, 0));

        let second = zlt.inverse(&encoded, &mut dst).unwrap();
        assert_eq!(second.consumed, encoded.len());
        assert_eq!(&dst[..second.produced], &data[..]);
    }

    #[test]
    fn test_inverse_truncated_escape_is_corrupt() {
        let mut dst = [0u8; 4];
        let err = Zlt::new().inverse(&[5, 0xFF], &mut dst).unwrap_err();
        assert!(matches!(err, OxiBlockError::CorruptedData { offset: 1, .. }));
    }

    #[test]
    fn test_inverse_escape_split_across_chunks() {
        let mut zlt = Zlt::with_size(3);
        let mut dst = [0u8; 4];

        let first = zlt.inverse(&[5, 0xFF], &mut dst).unwrap();
        assert_eq!(first, Progress::new(1, 1));
        assert_eq!(dst[0], 4);

        let second = zlt.inverse(&[0xFF, 1], &mut dst).unwrap();
        assert_eq!(second, Progress::new(2, 1));
        assert_eq!(dst[0], 0xFF);
        assert!(zlt.is_finished());
    }

    #[test]
    fn test_size_limits_consumption() {
        let mut zlt = Zlt::with_size(2);
        let mut dst = [0u8; 8];
        let progress = zlt.forward(&[1, 2, 3, 4], &mut dst).unwrap();
        assert_eq!(progress, Progress::new(2, 2));
        assert_eq!(&dst[..2], &[2, 3]);
        assert!(zlt.is_finished());
        assert_eq!(zlt.processed(), 2);
    }
}
