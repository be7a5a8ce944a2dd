//! Shared per-level iteration and destination index bookkeeping.
//!
//! Both transcode paths walk levels the same way and only differ in how one
//! image is transcoded; that difference comes in as a callback.

use crate::engine::ImageRegion;
use crate::error::{TranscodeError, TranscodeResult};
use alloc::vec;
use alloc::vec::Vec;
use ktx2_texture::{LevelIndexEntry, Texture};

/// Geometry of one mip level during the walk.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LevelImages {
    pub region: ImageRegion,
    pub image_count: u32,
}

#[inline]
fn align_up(value: u64, alignment: u64) -> u64 {
    value.div_ceil(alignment) * alignment
}

/// Walks mip levels from the smallest mip (highest index) down to the base
/// level, calling `transcode_image` once per image, and installs the
/// destination level index on `prototype`.
///
/// Levels land in the destination buffer in that same storage order. The
/// write cursor advances by the prototype's per-image size (fixed when the
/// prototype was created, never recomputed here), and each level's start is
/// padded to the prototype's required alignment, which matters once the
/// target is uncompressed.
///
/// The callback receives the level geometry, the image's index within the
/// level and the destination slice from the image's write position to the end
/// of the buffer. The first error aborts the walk: no level index is
/// installed and the prototype's partially written buffer must be discarded
/// by the caller.
pub(crate) fn transcode_levels<F>(
    source: &Texture,
    prototype: &mut Texture,
    mut transcode_image: F,
) -> TranscodeResult<()>
where
    F: FnMut(&LevelImages, u32, &mut [u8]) -> TranscodeResult<()>,
{
    let alignment = prototype.required_level_alignment() as u64;
    let level_count = source.level_count();
    let (block_width, block_height) = source.descriptor().block_dims();
    let image_sizes_out: Vec<u64> = (0..level_count)
        .map(|level| prototype.image_size(level))
        .collect();

    let mut entries = vec![LevelIndexEntry::default(); level_count as usize];
    let dest = prototype
        .image_data_mut()
        .ok_or(TranscodeError::MissingImageData)?;

    let mut level_offset_write = 0u64;
    for level in (0..level_count).rev() {
        level_offset_write = align_up(level_offset_write, alignment);

        let (width, height, _) = source.level_dimensions(level);
        let geometry = LevelImages {
            region: ImageRegion {
                level,
                width,
                height,
                blocks_x: width.div_ceil(block_width),
                blocks_y: height.div_ceil(block_height),
            },
            image_count: source.images_per_level(level),
        };

        let image_size_out = image_sizes_out[level as usize];
        let mut write_offset = level_offset_write;
        let mut level_size_out = 0u64;
        for image in 0..geometry.image_count {
            transcode_image(&geometry, image, &mut dest[write_offset as usize..])?;
            write_offset += image_size_out;
            level_size_out += image_size_out;
        }

        entries[level as usize] = LevelIndexEntry {
            byte_offset: level_offset_write,
            byte_length: level_size_out,
            uncompressed_byte_length: level_size_out,
        };
        level_offset_write += level_size_out;
    }

    prototype.set_level_index(entries)?;
    Ok(())
}
