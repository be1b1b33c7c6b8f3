//! # BCM Core
//!
//! Core components for the BCM compressor.
//!
//! This crate provides the building blocks shared by the codec and the CLI:
//!
//! - [`byteio`]: buffered single-byte readers and writers, the only I/O
//!   primitives the range coder uses
//! - [`crc`]: running CRC-32 (IEEE) over the uncompressed stream
//! - [`error`]: error types
//!
//! ## Architecture
//!
//! BCM is a layered pipeline:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: CLI                                                 │
//! │     argument parsing, filenames, prompts, progress      │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     frame layer, CM model, range coder (bcm-codec)      │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Block transform                                     │
//! │     forward/inverse BWT (bcm-bwt)                       │
//! ├─────────────────────────────────────────────────────────┤
//! │ L0: Core (this crate)                                   │
//! │     ByteReader/ByteWriter, Crc32, errors                │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use bcm_core::crc::Crc32;
//!
//! let crc = Crc32::compute(b"Hello, World!");
//! assert_eq!(crc, 0xEC4AC3D0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod byteio;
pub mod crc;
pub mod error;

// Re-exports for convenience
pub use byteio::{ByteReader, ByteWriter};
pub use crc::Crc32;
pub use error::{BcmError, Result};
