//! Error types for transcode operations.

use crate::engine::EngineError;
use ktx2_texture::TextureError;
use thiserror::Error;

/// Result type for transcode operations
pub type TranscodeResult<T> = Result<T, TranscodeError>;

/// Structural faults in the supercompression global data.
///
/// These indicate corrupt input data, not misuse of the API: the header,
/// descriptor array and sub-blocks do not fit together the way the container
/// declares they do.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GlobalDataError {
    /// Buffer ends before the fixed header does
    #[error("global data is {actual} bytes, shorter than its {required} byte header")]
    TooShortForHeader { required: usize, actual: usize },

    /// Endpoint, selector or table sub-block declared with zero length
    #[error("endpoint, selector or table sub-block has zero length")]
    EmptySubBlock,

    /// Declared sub-blocks run past the end of the buffer
    #[error("declared sub-blocks need {required} bytes but the global data has {actual}")]
    Overflow { required: u64, actual: u64 },

    /// No descriptor exists for an image the texture geometry requires
    #[error("global data has no descriptor for image {image}")]
    MissingImageDesc { image: u32 },

    /// Alpha is present but an image descriptor carries no alpha slice
    #[error("image {image} declares alpha but is missing its alpha slice")]
    MissingAlphaSlice { image: u32 },
}

/// Errors that can occur while transcoding a texture.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TranscodeError {
    /// The texture is neither BasisLZ supercompressed nor UASTC encoded
    #[error("texture is not in a transcodable format")]
    NotTranscodable,

    /// BasisLZ texture with no supercompression global data attached
    #[error("supercompression global data is missing or empty")]
    MissingGlobalData,

    /// The texture's image data has not been materialized
    #[error("texture has no image data to transcode")]
    MissingImageData,

    /// PVRTC targets require power-of-two base dimensions
    #[error("PVRTC targets require power-of-two base dimensions, got {width}x{height}")]
    NonPowerOfTwoPvrtc { width: u32, height: u32 },

    /// Raw target format value outside the supported enumeration
    #[error("unrecognized transcode target value {0}")]
    UnknownTargetFormat(u32),

    /// Decoding to the next power of two is not implemented
    #[error("decoding to the next power of two is not supported")]
    Pow2UpscaleUnsupported,

    /// A mip level's image data ends before its last image
    #[error("image data of level {level} ends before its last image")]
    TruncatedLevelData { level: u32 },

    /// Supercompression global data failed structural validation
    #[error("supercompression global data is corrupt: {0}")]
    GlobalData(#[from] GlobalDataError),

    /// The transcoding engine failed on an image
    #[error("image transcode failed: {0}")]
    Engine(#[from] EngineError),

    /// Container error, e.g. the destination allocation failed
    #[error("{0}")]
    Texture(#[from] TextureError),
}
