//! Error types for OxiBlock operations.
//!
//! A single error enum covers the bit stream layer, the byte transforms and
//! the block codec. Callers can tell "no more data" ([`OxiBlockError::EndOfStream`])
//! apart from a damaged block ([`OxiBlockError::InvalidHeader`],
//! [`OxiBlockError::CorruptedData`]) or a closed stream.

use std::io;
use thiserror::Error;

/// The main error type for OxiBlock operations.
#[derive(Debug, Error)]
pub enum OxiBlockError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A size, length or offset parameter is out of range.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected parameter.
        message: String,
    },

    /// Destination buffer too small for the operation.
    #[error("Buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall {
        /// Number of bytes needed.
        needed: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// Operation attempted on a closed bit stream.
    #[error("Stream closed")]
    StreamClosed,

    /// The source ran out before the requested bits were available.
    #[error("End of stream reached after {bits_read} bits")]
    EndOfStream {
        /// Bits successfully read before the source was exhausted.
        bits_read: u64,
    },

    /// Block header inconsistent with the data that follows it.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// Block payload shorter than its header declares.
    #[error("Unexpected end of block: expected {expected} more bytes")]
    UnexpectedEof {
        /// Number of bytes that were expected but not available.
        expected: usize,
    },

    /// Corrupted data in a block payload.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Byte offset where corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// Stream tag names an entropy coder this build does not know.
    #[error("Unsupported entropy coder tag: {tag:#04x}")]
    UnsupportedEntropy {
        /// The tag byte found in the stream.
        tag: u8,
    },
}

/// Result type alias for OxiBlock operations.
pub type Result<T> = std::result::Result<T, OxiBlockError>;

impl OxiBlockError {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a buffer too small error.
    pub fn buffer_too_small(needed: usize, available: usize) -> Self {
        Self::BufferTooSmall { needed, available }
    }

    /// Create an end of stream error.
    pub fn end_of_stream(bits_read: u64) -> Self {
        Self::EndOfStream { bits_read }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(expected: usize) -> Self {
        Self::UnexpectedEof { expected }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Create an unsupported entropy coder error.
    pub fn unsupported_entropy(tag: u8) -> Self {
        Self::UnsupportedEntropy { tag }
    }

    /// True when the error only means the source is exhausted.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::EndOfStream { .. })
    }
}
