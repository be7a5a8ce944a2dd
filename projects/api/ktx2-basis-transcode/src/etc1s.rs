//! The ETC1S (BasisLZ) transcode path: shared palettes decoded once, then one
//! engine call per image driven by its slice descriptor.

use crate::engine::{Etc1sImageTranscoder, TranscodeEngine};
use crate::error::{GlobalDataError, TranscodeError, TranscodeResult};
use crate::format::{ResolvedTarget, TranscodeFlags};
use crate::global_data::{first_image_indices, GlobalData};
use crate::levels::transcode_levels;
use ktx2_texture::Texture;

pub(crate) fn transcode_etc1s<E: TranscodeEngine>(
    texture: &Texture,
    prototype: &mut Texture,
    engine: &E,
    target: &ResolvedTarget,
    has_alpha: bool,
    flags: TranscodeFlags,
) -> TranscodeResult<()> {
    let global_bytes = texture
        .global_data()
        .ok_or(TranscodeError::MissingGlobalData)?;

    // The final entry is the total image count, which bounds the descriptor
    // array inside the global data buffer.
    let first_images = first_image_indices(texture);
    let image_count = first_images[texture.level_count() as usize];
    let global = GlobalData::parse(global_bytes, image_count)?;

    let transcoder = engine.etc1s_transcoder(&global.palettes())?;

    let alpha_to_opaque =
        has_alpha && flags.contains(TranscodeFlags::TRANSCODE_ALPHA_TO_OPAQUE);
    let is_video = texture.is_video();
    let data = texture
        .image_data()
        .ok_or(TranscodeError::MissingImageData)?;
    let source_index = texture.level_index();
    let format = target.format();

    transcode_levels(texture, prototype, |geometry, image, out| {
        let level = geometry.region.level;
        let entry = source_index
            .get(level as usize)
            .ok_or(TranscodeError::TruncatedLevelData { level })?;
        let start = entry.byte_offset as usize;
        let level_bytes = data
            .get(start..start + entry.byte_length as usize)
            .ok_or(TranscodeError::TruncatedLevelData { level })?;

        let desc_index = first_images[level as usize] + image;
        let desc = global
            .image_desc(desc_index)
            .ok_or(GlobalDataError::MissingImageDesc { image: desc_index })?;
        if has_alpha && (desc.alpha_slice_byte_offset == 0 || desc.alpha_slice_byte_length == 0) {
            return Err(GlobalDataError::MissingAlphaSlice { image: desc_index }.into());
        }

        transcoder
            .transcode_image(
                &desc,
                format,
                out,
                &geometry.region,
                level_bytes,
                is_video,
                alpha_to_opaque,
            )
            .map_err(TranscodeError::from)
    })
}
