//! The UASTC transcode path: no shared tables, every image carries enough
//! information to transcode on its own.

use crate::engine::{TranscodeEngine, UastcImageTranscoder};
use crate::error::{TranscodeError, TranscodeResult};
use crate::format::{ResolvedTarget, TranscodeFlags};
use crate::levels::transcode_levels;
use ktx2_texture::Texture;

pub(crate) fn transcode_uastc<E: TranscodeEngine>(
    texture: &Texture,
    prototype: &mut Texture,
    engine: &E,
    target: &ResolvedTarget,
    has_alpha: bool,
    flags: TranscodeFlags,
) -> TranscodeResult<()> {
    let transcoder = engine.uastc_transcoder()?;
    let data = texture
        .image_data()
        .ok_or(TranscodeError::MissingImageData)?;
    let format = target.format();

    transcode_levels(texture, prototype, |geometry, image, out| {
        let level = geometry.region.level;
        // Every image of a level occupies the same inflated size in the
        // source; the input cursor advances image by image.
        let image_size_in = texture.image_size(level) as usize;
        let level_offset = texture
            .level_data_offset(level)
            .ok_or(TranscodeError::TruncatedLevelData { level })?;
        let start = level_offset as usize + image as usize * image_size_in;
        let image_bytes = data
            .get(start..start + image_size_in)
            .ok_or(TranscodeError::TruncatedLevelData { level })?;

        transcoder
            .transcode_image(format, out, &geometry.region, image_bytes, has_alpha, flags)
            .map_err(TranscodeError::from)
    })
}
