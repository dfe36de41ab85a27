//! Burrows-Wheeler Transform.
//!
//! The BWT is a reversible permutation that groups bytes sharing a context,
//! making the block much more compressible by MTFT + ZLT. Rotations are sorted
//! by prefix doubling, so highly repetitive blocks (all zeros, short periods)
//! stay O(n log² n) instead of degrading to quadratic comparisons.

use log::trace;
use oxiblock_core::error::{OxiBlockError, Result};
use oxiblock_core::traits::ByteTransform;

/// Burrows-Wheeler Transform with reusable scratch buffers.
#[derive(Debug, Clone, Default)]
pub struct Bwt {
    size: usize,
    primary_index: u32,
    /// Copy of the input block.
    buffer: Vec<u8>,
    /// Sorted rotation start positions (forward) or the next-row vector (inverse).
    indices: Vec<u32>,
    ranks: Vec<u32>,
    scratch: Vec<u32>,
}

impl Bwt {
    /// Create a new transform. The block size defaults to the whole slice.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort the rotations of `self.buffer` into `self.indices`.
    fn sort_rotations(&mut self) {
        let data = &self.buffer;
        let n = data.len();

        self.indices.clear();
        self.indices.extend(0..n as u32);
        self.ranks.clear();
        self.ranks.extend(data.iter().map(|&b| u32::from(b)));
        self.scratch.clear();
        self.scratch.resize(n, 0);

        let mut k = 1usize;
        let mut rounds = 0;

        loop {
            let ranks = &self.ranks;
            let key = |i: u32| {
                let i = i as usize;
                (ranks[i], ranks[(i + k) % n])
            };

            // Ties are broken by position so the permutation is deterministic
            self.indices
                .sort_unstable_by_key(|&i| (key(i), i));

            self.scratch[self.indices[0] as usize] = 0;
            for j in 1..n {
                let prev = self.indices[j - 1];
                let cur = self.indices[j];
                let bump = u32::from(key(cur) != key(prev));
                self.scratch[cur as usize] = self.scratch[prev as usize] + bump;
            }

            std::mem::swap(&mut self.ranks, &mut self.scratch);
            rounds += 1;

            let distinct = self.ranks[self.indices[n - 1] as usize] as usize == n - 1;

            // Ranks now cover 2k bytes of every rotation
            if distinct || 2 * k >= n {
                break;
            }

            k *= 2;
        }

        trace!("BWT sorted {} rotations in {} rounds", n, rounds);
    }
}

impl ByteTransform for Bwt {
    fn set_size(&mut self, size: usize) -> Result<()> {
        if size > u32::MAX as usize {
            return Err(OxiBlockError::invalid_argument(format!(
                "BWT block size {size} exceeds {}",
                u32::MAX
            )));
        }

        self.size = size;
        Ok(())
    }

    fn size(&self) -> usize {
        self.size
    }

    /// Replace the block with the last column of its sorted rotations and
    /// record the row holding the original block as the primary index.
    fn forward(&mut self, block: &mut [u8]) -> Result<()> {
        let block = self.active(block)?;
        let n = block.len();
        self.primary_index = 0;

        if n < 2 {
            return Ok(());
        }

        self.buffer.clear();
        self.buffer.extend_from_slice(block);
        self.sort_rotations();

        for (row, &start) in self.indices.iter().enumerate() {
            let start = start as usize;

            if start == 0 {
                self.primary_index = row as u32;
            }

            block[row] = self.buffer[(start + n - 1) % n];
        }

        Ok(())
    }

    /// Rebuild the original block from the last column and the primary index.
    fn inverse(&mut self, block: &mut [u8]) -> Result<()> {
        let block = self.active(block)?;
        let n = block.len();

        if n == 0 {
            return Ok(());
        }

        if self.primary_index as usize >= n {
            return Err(OxiBlockError::corrupted(
                0,
                format!(
                    "BWT primary index {} out of range for block of {} bytes",
                    self.primary_index, n
                ),
            ));
        }

        self.buffer.clear();
        self.buffer.extend_from_slice(block);

        // Starting row of each byte value in the sorted first column
        let mut counts = [0usize; 256];
        for &byte in block.iter() {
            counts[byte as usize] += 1;
        }

        let mut positions = [0usize; 256];
        let mut total = 0;
        for (position, &count) in positions.iter_mut().zip(counts.iter()) {
            *position = total;
            total += count;
        }

        // Next-row vector: the row that follows each row in the original order
        self.indices.clear();
        self.indices.resize(n, 0);
        for (i, &byte) in self.buffer.iter().enumerate() {
            self.indices[positions[byte as usize]] = i as u32;
            positions[byte as usize] += 1;
        }

        let mut idx = self.indices[self.primary_index as usize] as usize;
        for slot in block.iter_mut() {
            *slot = self.buffer[idx];
            idx = self.indices[idx] as usize;
        }

        Ok(())
    }

    fn primary_index(&self) -> Option<u32> {
        Some(self.primary_index)
    }

    fn set_primary_index(&mut self, index: u32) -> Result<()> {
        self.primary_index = index;
        Ok(())
    }
}
