//! Error types for archive indexing and extraction.
//!
//! A missing entry is not an error: lookups report it as `Ok(None)` so callers
//! can tell "no such resource" apart from a broken archive or a failed read.

use thiserror::Error;

/// Errors that can occur while indexing or extracting a ZIP archive.
#[derive(Debug, Error)]
pub enum Error {
    /// Signature mismatch or a malformed fixed-size structure.
    #[error("invalid ZIP format: {0}")]
    InvalidFormat(String),

    /// I/O failure from the underlying reader.
    #[error("read error: {0}")]
    Read(#[from] std::io::Error),

    /// The source ended before the declared number of bytes could be read.
    #[error("short read at offset {offset}: expected {expected} bytes, got {actual}")]
    ShortRead {
        offset: u64,
        expected: usize,
        actual: usize,
    },

    /// Method code other than stored (0) or deflate (8).
    #[error("unsupported compression method: {0}")]
    UnsupportedCompressionMethod(u16),

    /// The deflate decoder failed or did not terminate.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// Extracted bytes do not match the central directory's CRC-32 or size.
    #[error("checksum mismatch for {path}: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch {
        path: String,
        expected: u32,
        actual: u32,
    },
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidFormat(msg.into())
    }

    /// Whether this error came from reading the source rather than from its contents.
    pub fn is_read_error(&self) -> bool {
        matches!(self, Error::Read(_) | Error::ShortRead { .. })
    }
}

/// Result type for archive operations.
pub type Result<T> = std::result::Result<T, Error>;
