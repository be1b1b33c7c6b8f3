//! # BCM Codec
//!
//! The BCM compression pipeline: Burrows-Wheeler transform over fixed-size
//! blocks, then a context-mixing binary model driven through a carry-less
//! range coder, with a CRC-32 of the original bytes sealing the stream.
//!
//! ## Stream format
//!
//! ```text
//! "BCM!"                         4 raw magic bytes
//! ┌ per block ─────────────────┐
//! │ length N      32 direct bits│  all inside one coder stream,
//! │ primary index 32 direct bits│  no byte alignment between fields
//! │ N coded bytes (BWT output)  │
//! └─────────────────────────────┘
//! sentinel N = 0    32 direct bits
//! CRC-32            32 direct bits
//! flush tail        4 bytes
//! ```
//!
//! The first block's length fixes the decoder's buffer capacity for the rest
//! of the stream; decoding is strictly sequential from start to end.
//!
//! ## Usage
//!
//! ```
//! use bcm_codec::{Level, compress_bytes, decompress_bytes};
//!
//! let data = b"how much wood would a woodchuck chuck";
//! let compressed = compress_bytes(data, Level::default()).unwrap();
//! let restored = decompress_bytes(&compressed).unwrap();
//! assert_eq!(restored, data);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decoder;
pub mod encoder;
pub mod model;
pub mod range_coder;

// Re-exports
pub use decoder::{BcmDecoder, decompress};
pub use encoder::{BcmEncoder, compress};
pub use model::Model;
pub use range_coder::{RangeDecoder, RangeEncoder};

use bcm_core::error::Result;
use std::io::Cursor;

/// Stream magic bytes ("BCM!").
pub const BCM_MAGIC: [u8; 4] = [0x42, 0x43, 0x4D, 0x21];

/// Largest admissible block length (level 9).
pub const MAX_BLOCK_SIZE: usize = 0x7FFF_FFFF;

/// Threshold from which the decoder switches to the two-array inverse BWT.
pub(crate) const LARGE_BLOCK: usize = 1 << 24;

/// Compression level (1-9) selecting the block size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level(u8);

impl Level {
    /// Create a new level (clamped to 1-9).
    pub fn new(level: u8) -> Self {
        Self(level.clamp(1, 9))
    }

    /// Get the level value.
    pub fn level(&self) -> u8 {
        self.0
    }

    /// Get the block size for this level.
    pub fn block_size(&self) -> usize {
        match self.0 {
            1 => 1 << 20,          // 1 MB
            2 => 1 << 22,          // 4 MB
            3 => 1 << 23,          // 8 MB
            4 => (1 << 24) - 1,    // ~16 MB (default)
            5 => 1 << 25,          // 32 MB
            6 => 1 << 26,          // 64 MB
            7 => 1 << 27,          // 128 MB
            8 => 1 << 28,          // 256 MB
            _ => MAX_BLOCK_SIZE,   // ~2 GB
        }
    }

    /// Block size to use for an input of known length.
    ///
    /// A single short block is cheaper than a full-size buffer, so a known,
    /// positive input length below the level's block size takes over.
    pub fn block_size_for(&self, input_len: u64) -> usize {
        let block_size = self.block_size();
        if input_len > 0 && input_len < block_size as u64 {
            input_len as usize
        } else {
            block_size
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Self(4)
    }
}

/// Compress a slice to a `Vec` at the given level.
///
/// Convenience wrapper around [`compress`] for in-memory data.
pub fn compress_bytes(data: &[u8], level: Level) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    compress(
        Cursor::new(data),
        &mut out,
        level.block_size_for(data.len() as u64),
    )?;
    Ok(out)
}

/// Decompress a slice to a `Vec`.
///
/// Convenience wrapper around [`decompress`] for in-memory data.
pub fn decompress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    decompress(Cursor::new(data), &mut out)?;
    Ok(out)
}
