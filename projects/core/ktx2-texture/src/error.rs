//! Error types for container operations.

use crate::format::PixelFormat;
use thiserror::Error;

/// Result type for container operations
pub type TextureResult<T> = Result<T, TextureError>;

/// Errors that can occur while building or mutating a texture container.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TextureError {
    /// Storage allocation for the image data failed
    #[error("failed to allocate {bytes} bytes of image storage")]
    OutOfMemory { bytes: u64 },

    /// The requested geometry is not representable
    #[error("invalid texture geometry: {0}")]
    InvalidGeometry(&'static str),

    /// Storage was requested for a format with no fixed per-block size
    #[error("cannot allocate storage for unsized format {0:?}")]
    UnsizedFormat(PixelFormat),

    /// A level index of the wrong length was installed
    #[error("level index must have {expected} entries, got {actual}")]
    LevelIndexMismatch { expected: usize, actual: usize },
}
