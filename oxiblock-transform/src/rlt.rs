//! Run Length Transform.
//!
//! Runs of 4 or more identical bytes are coded as the first 4 bytes followed
//! by a count byte holding the number of additional repeats (0-255). Shorter
//! runs are copied as-is. The block codec can apply it ahead of the BWT, which
//! sorts long runs poorly.

use oxiblock_core::error::{OxiBlockError, Result};
use oxiblock_core::traits::{ByteFunction, Progress};

/// Run length at which the count byte is emitted.
const RUN_THRESHOLD: usize = 4;

/// Longest run covered by one group (threshold plus a full count byte).
const MAX_RUN: usize = RUN_THRESHOLD + 255;

/// Run Length Transform over whole blocks.
///
/// Unlike [`Zlt`](crate::Zlt) it carries no state: each call is given a
/// complete block.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rlt;

impl Rlt {
    /// Create a new run length transform.
    pub fn new() -> Self {
        Self
    }

    /// Number of bytes [`inverse`](ByteFunction::inverse) produces for `src`.
    pub fn decoded_len(src: &[u8]) -> Result<usize> {
        let mut src_idx = 0;
        let mut total = 0;

        while src_idx < src.len() {
            let byte = src[src_idx];
            let mut run = 1;

            while run < RUN_THRESHOLD && src_idx + run < src.len() && src[src_idx + run] == byte {
                run += 1;
            }

            if run == RUN_THRESHOLD {
                let count_idx = src_idx + RUN_THRESHOLD;

                let Some(&count) = src.get(count_idx) else {
                    return Err(OxiBlockError::corrupted(
                        count_idx as u64,
                        "run of 4 without a count byte",
                    ));
                };

                total += RUN_THRESHOLD + count as usize;
                src_idx += RUN_THRESHOLD + 1;
            } else {
                total += run;
                src_idx += run;
            }
        }

        Ok(total)
    }
}

impl ByteFunction for Rlt {
    /// Code `src` into `dst`.
    ///
    /// Stops before the first run group that does not fit `dst`; the caller
    /// sees the short `consumed` count and can fall back to the raw block.
    fn forward(&mut self, src: &[u8], dst: &mut [u8]) -> Result<Progress> {
        let mut src_idx = 0;
        let mut dst_idx = 0;

        while src_idx < src.len() {
            let byte = src[src_idx];
            let mut run = 1;

            while src_idx + run < src.len() && src[src_idx + run] == byte && run < MAX_RUN {
                run += 1;
            }

            if run >= RUN_THRESHOLD {
                if dst_idx + RUN_THRESHOLD + 1 > dst.len() {
                    break;
                }

                dst[dst_idx..dst_idx + RUN_THRESHOLD].fill(byte);
                dst[dst_idx + RUN_THRESHOLD] = (run - RUN_THRESHOLD) as u8;
                dst_idx += RUN_THRESHOLD + 1;
            } else {
                if dst_idx + run > dst.len() {
                    break;
                }

                dst[dst_idx..dst_idx + run].fill(byte);
                dst_idx += run;
            }

            src_idx += run;
        }

        Ok(Progress::new(src_idx, dst_idx))
    }

    /// Decode `src` into `dst`.
    ///
    /// Stops before the first run group that does not fit `dst`. A run of 4
    /// missing its count byte is corrupt.
    fn inverse(&mut self, src: &[u8], dst: &mut [u8]) -> Result<Progress> {
        let mut src_idx = 0;
        let mut dst_idx = 0;

        while src_idx < src.len() {
            let byte = src[src_idx];
            let mut run = 1;

            while run < RUN_THRESHOLD && src_idx + run < src.len() && src[src_idx + run] == byte {
                run += 1;
            }

            let (consumed, length) = if run == RUN_THRESHOLD {
                let count_idx = src_idx + RUN_THRESHOLD;

                if count_idx >= src.len() {
                    return Err(OxiBlockError::corrupted(
                        count_idx as u64,
                        "run of 4 without a count byte",
                    ));
                }

                (RUN_THRESHOLD + 1, RUN_THRESHOLD + src[count_idx] as usize)
            } else {
                (run, run)
            };

            if dst_idx + length > dst.len() {
                break;
            }

            dst[dst_idx..dst_idx + length].fill(byte);
            dst_idx += length;
            src_idx += consumed;
        }

        Ok(Progress::new(src_idx, dst_idx))
    }
}
