//! Block transforms for OxiBlock.
//!
//! A block travels through these stages before entropy coding:
//! 1. Run Length Transform ([`Rlt`]) - optional, shortens long byte runs
//! 2. Burrows-Wheeler Transform ([`Bwt`]) - block sorting, records a primary index
//! 3. Move-To-Front Transform ([`Mtft`]) - turns clustered bytes into zeros
//! 4. Zero Length Transform ([`Zlt`]) - codes zero runs as binary digits
//!
//! [`Bwt`] and [`Mtft`] work in place and implement
//! [`ByteTransform`](oxiblock_core::ByteTransform); they are usually driven
//! through a [`Pipeline`]. [`Zlt`] and [`Rlt`] change the block length and
//! implement [`ByteFunction`](oxiblock_core::ByteFunction).
//!
//! ## Example
//!
//! ```rust
//! use oxiblock_core::prelude::*;
//! use oxiblock_transform::{Pipeline, Zlt};
//!
//! let data = b"abracadabra abracadabra".to_vec();
//! let mut block = data.clone();
//! let index = Pipeline::bwt_mtft().forward(&mut block).unwrap();
//!
//! let mut coded = vec![0u8; block.len() * 2];
//! let progress = Zlt::new().forward(&block, &mut coded).unwrap();
//! assert_eq!(progress.consumed, block.len());
//!
//! let mut decoded = vec![0u8; block.len()];
//! Zlt::new().inverse(&coded[..progress.produced], &mut decoded).unwrap();
//! Pipeline::bwt_mtft().inverse(&mut decoded, index).unwrap();
//! assert_eq!(decoded, data);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Burrows-Wheeler Transform implementation.
pub mod bwt;
mod mtf;
mod pipeline;
mod rlt;
mod zlt;

pub use bwt::Bwt;
pub use mtf::Mtft;
pub use pipeline::Pipeline;
pub use rlt::Rlt;
pub use zlt::Zlt;
