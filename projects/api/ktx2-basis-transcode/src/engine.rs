//! The transcoding engine boundary.
//!
//! The bit-level work of palette lookups and packing blocks into the target
//! format lives behind these traits. This crate drives the engine per image
//! and owns everything around it: validation, destination layout and the
//! metadata swap.

use crate::format::{TranscodeFlags, TranscodeFormat};
use crate::global_data::ImageDesc;
use thiserror::Error;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors reported by the transcoding engine.
///
/// These are propagated to the caller unchanged; the container and its global
/// data were structurally valid, but the engine could not produce an image.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// The target format was not compiled into the engine build
    #[error("transcode target {0:?} is not available in this engine build")]
    UnsupportedTarget(TranscodeFormat),

    /// The output slice cannot hold one transcoded image
    #[error("output buffer too small: required {required} bytes, got {actual}")]
    OutputTooSmall { required: usize, actual: usize },

    /// The compressed bitstream of an image failed to decode
    #[error("compressed bitstream decode failed for level {level} image {image}")]
    CorruptBitstream { level: u32, image: u32 },
}

/// Placement of one image within its mip level.
///
/// `blocks_x`/`blocks_y` are the codec block grid,
/// `ceil(dimension / block_size)` with the 4x4 block both source codecs use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRegion {
    pub level: u32,
    pub width: u32,
    pub height: u32,
    pub blocks_x: u32,
    pub blocks_y: u32,
}

/// Borrowed views of the shared ETC1S codebooks, handed to the engine once
/// per transcode operation.
#[derive(Debug, Clone, Copy)]
pub struct Etc1sPalettes<'a> {
    pub endpoint_count: u16,
    pub endpoints: &'a [u8],
    pub selector_count: u16,
    pub selectors: &'a [u8],
    /// Shared Huffman-style code tables.
    pub tables: &'a [u8],
}

/// Transcodes ETC1S images after the shared palettes have been decoded.
///
/// Obtained from [`TranscodeEngine::etc1s_transcoder`]; the palette decode
/// happens once there and is amortized across every image of the operation.
pub trait Etc1sImageTranscoder {
    /// Transcodes one ETC1S image into `output`.
    ///
    /// `output` runs from the image's write position to the end of the
    /// destination buffer; on success the engine has written exactly the
    /// image's size in the target format at its start. `level_data` is the
    /// raw byte span of the image's mip level; the descriptor's slice offsets
    /// are relative to it.
    fn transcode_image(
        &self,
        desc: &ImageDesc,
        target: TranscodeFormat,
        output: &mut [u8],
        region: &ImageRegion,
        level_data: &[u8],
        is_video: bool,
        alpha_to_opaque: bool,
    ) -> EngineResult<()>;
}

/// Transcodes UASTC images; stateless per call.
pub trait UastcImageTranscoder {
    /// Transcodes one UASTC image into `output`.
    ///
    /// `image_data` is exactly one image's inflated bytes. `output` follows
    /// the same capacity contract as
    /// [`Etc1sImageTranscoder::transcode_image`].
    fn transcode_image(
        &self,
        target: TranscodeFormat,
        output: &mut [u8],
        region: &ImageRegion,
        image_data: &[u8],
        has_alpha: bool,
        flags: TranscodeFlags,
    ) -> EngineResult<()>;
}

/// A transcoding engine implementation.
pub trait TranscodeEngine {
    /// Per-operation ETC1S transcoder, holding the decoded palettes.
    type Etc1s: Etc1sImageTranscoder;
    /// UASTC transcoder.
    type Uastc: UastcImageTranscoder;

    /// Runs the engine's one-time global initialization (shared code tables).
    ///
    /// Called before any image work. Implementations must make this
    /// idempotent and safe under concurrent first use, guarded with
    /// `std::sync::Once` or an atomic, never an unsynchronized flag.
    fn ensure_initialized(&self) -> EngineResult<()>;

    /// Decodes the shared endpoint/selector palettes and code tables once and
    /// returns the transcoder used for every ETC1S image of the operation.
    fn etc1s_transcoder(&self, palettes: &Etc1sPalettes<'_>) -> EngineResult<Self::Etc1s>;

    /// Returns the UASTC transcoder.
    fn uastc_transcoder(&self) -> EngineResult<Self::Uastc>;
}
