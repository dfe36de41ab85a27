//! Move-To-Front Transform.
//!
//! MTFT replaces each byte with its position in a recency list, then moves
//! that byte to the front of the list. After a BWT, clustered bytes become
//! long stretches of zeros for the ZLT to collapse.

use oxiblock_core::error::Result;
use oxiblock_core::traits::ByteTransform;

/// Move-To-Front Transform over a 256-symbol list.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mtft {
    size: usize,
}

impl Mtft {
    /// Create a new transform. The block size defaults to the whole slice.
    pub fn new() -> Self {
        Self::default()
    }
}

fn initial_list() -> [u8; 256] {
    let mut list = [0u8; 256];
    for (i, slot) in list.iter_mut().enumerate() {
        *slot = i as u8;
    }
    list
}

impl ByteTransform for Mtft {
    fn set_size(&mut self, size: usize) -> Result<()> {
        self.size = size;
        Ok(())
    }

    fn size(&self) -> usize {
        self.size
    }

    fn forward(&mut self, block: &mut [u8]) -> Result<()> {
        let block = self.active(block)?;
        let mut list = initial_list();

        for slot in block.iter_mut() {
            let byte = *slot;

            // Every byte value is present in the list
            let pos = list.iter().position(|&b| b == byte).unwrap_or(0);
            *slot = pos as u8;

            if pos > 0 {
                list.copy_within(0..pos, 1);
                list[0] = byte;
            }
        }

        Ok(())
    }

    fn inverse(&mut self, block: &mut [u8]) -> Result<()> {
        let block = self.active(block)?;
        let mut list = initial_list();

        for slot in block.iter_mut() {
            let pos = *slot as usize;
            let byte = list[pos];
            *slot = byte;

            if pos > 0 {
                list.copy_within(0..pos, 1);
                list[0] = byte;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform(data: &[u8]) -> Vec<u8> {
        let mut block = data.to_vec();
        Mtft::new().forward(&mut block).unwrap();
        block
    }

    fn inverse_transform(data: &[u8]) -> Vec<u8> {
        let mut block = data.to_vec();
        Mtft::new().inverse(&mut block).unwrap();
        block
    }

    #[test]
    fn test_mtf_empty() {
        assert!(transform(b"").is_empty());
    }

    #[test]
    fn test_mtf_single() {
        // 'a' starts at position 97
        assert_eq!(transform(b"a"), vec![b'a']);
    }

    #[test]
    fn test_mtf_repeated() {
        assert_eq!(transform(b"aaaa"), vec![b'a', 0, 0, 0]);
    }

    #[test]
    fn test_mtf_alternating() {
        // After "ab", 'a' sits at position 1 and so on
        assert_eq!(transform(b"abab"), vec![b'a', b'b', 1, 1]);
    }

    #[test]
    fn test_mtf_roundtrip() {
        let test_cases = [
            b"hello".as_slice(),
            b"banana",
            b"abracadabra",
            b"the quick brown fox",
            &[0xFF, 0x00, 0xFF, 0xFE, 0x01],
        ];

        for data in test_cases {
            let transformed = transform(data);
            let recovered = inverse_transform(&transformed);
            assert_eq!(recovered, data, "Failed for: {:?}", data);
        }
    }

    #[test]
    fn test_mtf_all_values() {
        let data: Vec<u8> = (0..=255u8).rev().chain(0..=255u8).collect();
        assert_eq!(inverse_transform(&transform(&data)), data);
    }

    #[test]
    fn test_mtf_produces_low_values() {
        let data = b"bbbbbaaaacccc";
        let transformed = transform(data);

        let zeros = transformed.iter().filter(|&&b| b == 0).count();
        assert!(
            zeros > data.len() / 2,
            "MTF should produce many zeros for runs"
        );
    }

    #[test]
    fn test_mtf_respects_size() {
        let mut block = *b"aaXY";
        let mut mtft = Mtft::new();
        mtft.set_size(2).unwrap();
        mtft.forward(&mut block).unwrap();
        assert_eq!(&block, &[b'a', 0, b'X', b'Y']);
    }
}
