//! Entropy coders for block payloads.
//!
//! Both coders borrow the stream's bit channel for the duration of a block,
//! so the block header and the coded payload share one [`BitWriter`] /
//! [`BitReader`](oxiblock_core::BitReader).
//!
//! [`BitWriter`]: oxiblock_core::BitWriter

mod exp_golomb;
mod null;

pub use exp_golomb::{ExpGolombDecoder, ExpGolombEncoder};
pub use null::{NullDecoder, NullEncoder};
