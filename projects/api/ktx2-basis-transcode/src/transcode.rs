//! The top-level transcode operation.

use crate::engine::TranscodeEngine;
use crate::error::{TranscodeError, TranscodeResult};
use crate::etc1s::transcode_etc1s;
use crate::format::{resolve_target_format, TranscodeFlags, TranscodeFormat};
use crate::uastc::transcode_uastc;
use ktx2_texture::{
    ColorModel, StorageAllocation, Supercompression, Texture, TextureCreateInfo, TransferFunction,
};

/// Transcodes a Basis Universal (ETC1S or UASTC) texture to `output_format`
/// in place.
///
/// On success the texture's format metadata, level index and data buffer are
/// replaced with the transcoded result and the supercompression scheme is
/// cleared; the texture is then ready for GPU upload. All transcoding writes
/// go to an internally created destination container, so **on failure the
/// texture is left unchanged**: the swap happens only after every image of
/// every level transcoded successfully.
///
/// The operation runs to completion on the calling thread. It is not
/// reentrant on one texture; the `&mut` borrow serializes callers.
///
/// # Errors
///
/// - [`TranscodeError::NotTranscodable`]: the texture is neither BasisLZ
///   supercompressed nor UASTC encoded.
/// - [`TranscodeError::MissingGlobalData`]: BasisLZ texture without attached
///   supercompression global data.
/// - [`TranscodeError::Pow2UpscaleUnsupported`]:
///   [`TranscodeFlags::PVRTC_DECODE_TO_NEXT_POW2`] was requested.
/// - [`TranscodeError::NonPowerOfTwoPvrtc`]: PVRTC target with
///   non-power-of-two base dimensions.
/// - [`TranscodeError::MissingImageData`]: the image data has not been
///   materialized (a pending deferred load must be completed first).
/// - [`TranscodeError::GlobalData`]: the global data failed structural
///   validation.
/// - [`TranscodeError::Engine`]: the engine failed on an image; the error is
///   propagated unchanged.
/// - [`TranscodeError::Texture`]: creating the destination failed, e.g. out
///   of memory.
pub fn transcode<E: TranscodeEngine>(
    texture: &mut Texture,
    engine: &E,
    output_format: TranscodeFormat,
    flags: TranscodeFlags,
) -> TranscodeResult<()> {
    let descriptor = *texture.descriptor();
    let scheme = texture.supercompression();
    if descriptor.color_model() != ColorModel::Uastc && scheme != Supercompression::BasisLz {
        return Err(TranscodeError::NotTranscodable);
    }
    if scheme == Supercompression::BasisLz
        && texture.global_data().map_or(true, |bytes| bytes.is_empty())
    {
        return Err(TranscodeError::MissingGlobalData);
    }

    let srgb = descriptor.transfer() == TransferFunction::Srgb;
    let has_alpha = descriptor.has_alpha();
    let target = resolve_target_format(
        output_format,
        has_alpha,
        srgb,
        flags,
        texture.base_width(),
        texture.base_height(),
    )?;

    // The destination: same shape, target format, storage allocated. Its
    // level index and image sizes are computed once here; the paths read them
    // back instead of recomputing.
    let mut prototype = Texture::create(
        &TextureCreateInfo {
            format: target.pixel_format(),
            base_width: texture.base_width(),
            base_height: texture.base_height(),
            base_depth: texture.base_depth(),
            level_count: texture.level_count(),
            layer_count: texture.layer_count(),
            face_count: texture.face_count(),
            is_array: texture.is_array(),
        },
        StorageAllocation::Allocate,
    )?;

    if texture.image_data().is_none() {
        return Err(TranscodeError::MissingImageData);
    }

    engine.ensure_initialized()?;

    if scheme == Supercompression::BasisLz {
        transcode_etc1s(texture, &mut prototype, engine, &target, has_alpha, flags)?;
    } else {
        transcode_uastc(texture, &mut prototype, engine, &target, has_alpha, flags)?;
    }

    texture.adopt_payload(prototype);
    Ok(())
}
