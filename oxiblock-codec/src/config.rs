//! Codec configuration.

use crate::block::{DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE};
use oxiblock_core::error::{OxiBlockError, Result};
use std::fmt;
use std::str::FromStr;

/// Entropy coder applied to block payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntropyKind {
    /// Payload bytes are written verbatim, 8 bits each.
    #[default]
    Null,
    /// Order-0 Exp-Golomb codes, short for small byte values.
    ExpGolomb,
}

impl EntropyKind {
    /// Tag byte identifying the coder at the start of a stream.
    pub fn tag(self) -> u8 {
        match self {
            Self::Null => b'N',
            Self::ExpGolomb => b'G',
        }
    }

    /// Look up the coder named by a stream tag byte.
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            b'N' => Ok(Self::Null),
            b'G' => Ok(Self::ExpGolomb),
            _ => Err(OxiBlockError::unsupported_entropy(tag)),
        }
    }

    /// Human readable name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::ExpGolomb => "exp-golomb",
        }
    }
}

impl fmt::Display for EntropyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntropyKind {
    type Err = OxiBlockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "null" | "none" => Ok(Self::Null),
            "exp-golomb" | "expgolomb" | "golomb" => Ok(Self::ExpGolomb),
            other => Err(OxiBlockError::invalid_argument(format!(
                "unknown entropy coder '{other}'"
            ))),
        }
    }
}

/// Block codec configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Maximum number of input bytes per block.
    pub block_size: usize,
    /// Entropy coder for block payloads.
    pub entropy: EntropyKind,
    /// Try the run length transform ahead of the BWT.
    /// Off by default, so blocks carry the no-RLT flag.
    pub run_length: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            entropy: EntropyKind::Null,
            run_length: false,
        }
    }
}

impl CodecConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the block size.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Set the entropy coder.
    pub fn with_entropy(mut self, entropy: EntropyKind) -> Self {
        self.entropy = entropy;
        self
    }

    /// Enable or disable the run length transform.
    pub fn with_run_length(mut self, enabled: bool) -> Self {
        self.run_length = enabled;
        self
    }

    /// Check that the block size is usable for stream compression.
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(OxiBlockError::invalid_argument(format!(
                "block size {} outside 1..={}",
                self.block_size, MAX_BLOCK_SIZE
            )));
        }

        Ok(())
    }
}
