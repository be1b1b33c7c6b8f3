//! Error types for BCM operations.
//!
//! Every error here is fatal to the compression or decompression call that
//! raised it: the coder is not self-synchronising, so no partial recovery is
//! attempted.

use std::io;
use thiserror::Error;

/// The main error type for BCM operations.
#[derive(Debug, Error)]
pub enum BcmError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file to decompress does not start with the `BCM!` magic.
    #[error("Invalid magic number: expected {expected:02x?}, found {found:02x?}")]
    InvalidMagic {
        /// Expected magic bytes.
        expected: Vec<u8>,
        /// Actual bytes found.
        found: Vec<u8>,
    },

    /// Corrupted data detected during decompression.
    #[error("Corrupt input: {message}")]
    CorruptedData {
        /// Description of the corruption.
        message: String,
    },

    /// Trailing CRC does not match the reconstructed stream.
    #[error("CRC mismatch: expected {expected:#010x}, computed {computed:#010x}")]
    CrcMismatch {
        /// CRC value stored in the compressed stream.
        expected: u32,
        /// CRC computed over the reconstructed bytes.
        computed: u32,
    },

    /// Unexpected end of the compressed stream.
    #[error("Unexpected end of stream: expected {expected} more bytes")]
    UnexpectedEof {
        /// Number of bytes that were expected but not available.
        expected: usize,
    },
}

/// Result type alias for BCM operations.
pub type Result<T> = std::result::Result<T, BcmError>;

impl BcmError {
    /// Create an invalid magic error.
    pub fn invalid_magic(expected: impl Into<Vec<u8>>, found: impl Into<Vec<u8>>) -> Self {
        Self::InvalidMagic {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a corrupted data error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::CorruptedData {
            message: message.into(),
        }
    }

    /// Create a CRC mismatch error.
    pub fn crc_mismatch(expected: u32, computed: u32) -> Self {
        Self::CrcMismatch { expected, computed }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(expected: usize) -> Self {
        Self::UnexpectedEof { expected }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BcmError::invalid_magic(b"BCM!".to_vec(), vec![0x1F, 0x8B, 0x08, 0x00]);
        assert!(err.to_string().contains("Invalid magic"));

        let err = BcmError::crc_mismatch(0x12345678, 0xDEADBEEF);
        assert!(err.to_string().contains("CRC mismatch"));

        let err = BcmError::corrupted("block length 99 exceeds capacity 10");
        assert!(err.to_string().contains("Corrupt input"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: BcmError = io_err.into();
        assert!(matches!(err, BcmError::Io(_)));
    }
}
