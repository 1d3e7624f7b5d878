//! Error types for DDS decoding.

use thiserror::Error;

use crate::header::FourCC;

/// Errors that can occur when decoding DDS files.
///
/// All decode failures are deterministic properties of the input; none are
/// transient or worth retrying.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid DDS magic.
    #[error("invalid DDS magic: expected 'DDS ', got {0:?}")]
    InvalidMagic([u8; 4]),

    /// Pixel format does not carry a FourCC code.
    #[error("unsupported pixel format: FourCC flag not set (flags {flags:#x})")]
    MissingFourCc { flags: u32 },

    /// FourCC code is not one of the decodable compression formats.
    #[error("unsupported DDS compression: {0}")]
    UnsupportedFourCc(FourCC),

    /// Fewer bytes available than a header or mipmap level requires.
    #[error("truncated DDS data: needed {needed} bytes but only {available} available")]
    TruncatedInput { needed: usize, available: usize },
}

/// Result type for DDS operations.
pub type Result<T> = std::result::Result<T, Error>;
