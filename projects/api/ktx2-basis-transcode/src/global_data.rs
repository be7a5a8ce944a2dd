//! BasisLZ supercompression global data: the shared-codebook header and the
//! per-image slice descriptors.
//!
//! Layout, little-endian throughout:
//!
//! ```text
//! +--------------------------+ 0
//! | global header (20 bytes) |
//! +--------------------------+ 20
//! | image descs (20 B each)  |  one per (level, layer, face, depth slice),
//! +--------------------------+  level 0 first
//! | endpoint palette         |
//! +--------------------------+
//! | selector palette         |
//! +--------------------------+
//! | code tables              |
//! +--------------------------+
//! ```
//!
//! The sub-block positions are anchor-derived (descs start where the header
//! ends, endpoints where the descs end, and so on), so the header only stores
//! lengths. Slice offsets inside an image descriptor are relative to the
//! start of that image's mip level data.

use crate::engine::Etc1sPalettes;
use crate::error::GlobalDataError;
use alloc::vec::Vec;
use endian_writer::{EndianReader, LittleEndianReader};
use ktx2_texture::Texture;

/// The fixed header at the start of the BasisLZ global data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasisLzGlobalHeader {
    pub endpoint_count: u16,
    pub selector_count: u16,
    pub endpoints_byte_length: u32,
    pub selectors_byte_length: u32,
    pub tables_byte_length: u32,
    pub global_flags: u32,
}

impl BasisLzGlobalHeader {
    /// Serialized header size.
    pub const SIZE_BYTES: usize = 20;
    /// Set when the texture's images carry alpha slices.
    pub const FLAG_HAS_ALPHA_SLICES: u32 = 1 << 0;
}

/// Slice placement of one image inside its mip level.
///
/// An image without alpha has a zero alpha slice offset and length; when the
/// texture declares alpha, a zero alpha slice is data corruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageDesc {
    pub image_flags: u32,
    pub rgb_slice_byte_offset: u32,
    pub rgb_slice_byte_length: u32,
    pub alpha_slice_byte_offset: u32,
    pub alpha_slice_byte_length: u32,
}

impl ImageDesc {
    /// Serialized descriptor size.
    pub const SIZE_BYTES: usize = 20;
    /// Set on video frames that depend on the previous frame.
    pub const FLAG_IS_P_FRAME: u32 = 1 << 1;
}

/// Parsed and structurally validated BasisLZ global data.
#[derive(Debug)]
pub struct GlobalData<'a> {
    header: BasisLzGlobalHeader,
    descs: Vec<ImageDesc>,
    bytes: &'a [u8],
}

impl<'a> GlobalData<'a> {
    /// Parses the global data of a texture with `image_count` images.
    ///
    /// This is a structural integrity check, not a semantic one: it verifies
    /// that the three sub-blocks are declared nonempty and that header,
    /// descriptor array and sub-blocks fit inside `bytes`. It runs before the
    /// engine touches the buffer; the palette decode itself happens once in
    /// the transcoder.
    pub fn parse(bytes: &'a [u8], image_count: u32) -> Result<Self, GlobalDataError> {
        if bytes.len() < BasisLzGlobalHeader::SIZE_BYTES {
            return Err(GlobalDataError::TooShortForHeader {
                required: BasisLzGlobalHeader::SIZE_BYTES,
                actual: bytes.len(),
            });
        }

        // SAFETY: We checked bytes.len() >= SIZE_BYTES (20), so offsets 0..16 + 4 are safe
        let mut reader = unsafe { LittleEndianReader::new(bytes.as_ptr()) };
        let header = unsafe {
            BasisLzGlobalHeader {
                endpoint_count: reader.read_u16_at(0),
                selector_count: reader.read_u16_at(2),
                endpoints_byte_length: reader.read_u32_at(4),
                selectors_byte_length: reader.read_u32_at(8),
                tables_byte_length: reader.read_u32_at(12),
                global_flags: reader.read_u32_at(16),
            }
        };

        if header.endpoints_byte_length == 0
            || header.selectors_byte_length == 0
            || header.tables_byte_length == 0
        {
            tracing::debug!("global data is missing endpoints, selectors or tables");
            return Err(GlobalDataError::EmptySubBlock);
        }

        let descs_end = BasisLzGlobalHeader::SIZE_BYTES as u64
            + image_count as u64 * ImageDesc::SIZE_BYTES as u64;
        let required = descs_end
            + header.endpoints_byte_length as u64
            + header.selectors_byte_length as u64
            + header.tables_byte_length as u64;
        if required > bytes.len() as u64 {
            return Err(GlobalDataError::Overflow {
                required,
                actual: bytes.len() as u64,
            });
        }

        let mut descs = Vec::with_capacity(image_count as usize);
        for image in 0..image_count {
            let base =
                BasisLzGlobalHeader::SIZE_BYTES as isize + (image as isize) * ImageDesc::SIZE_BYTES as isize;
            // SAFETY: The overflow check above guarantees the descriptor array
            // lies within bytes, so base + 16 + 4 is in bounds
            descs.push(unsafe {
                ImageDesc {
                    image_flags: reader.read_u32_at(base),
                    rgb_slice_byte_offset: reader.read_u32_at(base + 4),
                    rgb_slice_byte_length: reader.read_u32_at(base + 8),
                    alpha_slice_byte_offset: reader.read_u32_at(base + 12),
                    alpha_slice_byte_length: reader.read_u32_at(base + 16),
                }
            });
        }

        Ok(Self {
            header,
            descs,
            bytes,
        })
    }

    /// The fixed header.
    pub fn header(&self) -> &BasisLzGlobalHeader {
        &self.header
    }

    /// Whether the global data declares alpha slices.
    pub fn has_alpha_slices(&self) -> bool {
        self.header.global_flags & BasisLzGlobalHeader::FLAG_HAS_ALPHA_SLICES != 0
    }

    /// All image descriptors, level 0 first.
    pub fn image_descs(&self) -> &[ImageDesc] {
        &self.descs
    }

    /// The descriptor of image `index`, if the geometry covers it.
    pub fn image_desc(&self, index: u32) -> Option<ImageDesc> {
        self.descs.get(index as usize).copied()
    }

    /// Borrowed palette and table sub-slices for the engine's one-time decode.
    pub fn palettes(&self) -> Etc1sPalettes<'_> {
        let descs_end =
            BasisLzGlobalHeader::SIZE_BYTES + self.descs.len() * ImageDesc::SIZE_BYTES;
        let endpoints_end = descs_end + self.header.endpoints_byte_length as usize;
        let selectors_end = endpoints_end + self.header.selectors_byte_length as usize;
        let tables_end = selectors_end + self.header.tables_byte_length as usize;
        Etc1sPalettes {
            endpoint_count: self.header.endpoint_count,
            endpoints: &self.bytes[descs_end..endpoints_end],
            selector_count: self.header.selector_count,
            selectors: &self.bytes[endpoints_end..selectors_end],
            tables: &self.bytes[selectors_end..tables_end],
        }
    }
}

/// First image index of each level, plus the total image count as the final
/// entry.
///
/// Image descriptors are stored level 0 first, one per (layer, face, depth
/// slice); this prefix sum locates a level's slice of the descriptor array
/// when iterating levels in storage order (smallest mip first). Computed per
/// transcode call and discarded after.
pub fn first_image_indices(texture: &Texture) -> Vec<u32> {
    let level_count = texture.level_count() as usize;
    let layers_faces = texture.layer_count() * texture.face_count();
    let mut first = Vec::with_capacity(level_count + 1);
    first.push(0u32);
    for level in 0..level_count {
        // Faces and depth cannot both exceed 1; there are no 3D cube maps.
        let (_, _, depth) = texture.level_dimensions(level as u32);
        first.push(first[level] + layers_faces * depth);
    }
    first
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_prelude::*;
    use endian_writer::{EndianWriter, LittleEndianWriter};
    use ktx2_texture::{
        FormatDescriptor, PixelFormat, Supercompression, Texture, TextureCreateInfo,
        TransferFunction,
    };

    #[test]
    fn parse_accepts_consistent_global_data() {
        let descs = [ImageDesc {
            image_flags: 0,
            rgb_slice_byte_offset: 0,
            rgb_slice_byte_length: 8,
            alpha_slice_byte_offset: 8,
            alpha_slice_byte_length: 8,
        }];
        let bytes = encode_global_data(
            &descs,
            &[0xE0; 6],
            &[0x5E; 4],
            &[0x7A; 10],
            BasisLzGlobalHeader::FLAG_HAS_ALPHA_SLICES,
        );

        let global = GlobalData::parse(&bytes, 1).unwrap();
        assert_eq!(global.header().endpoint_count, 6);
        assert_eq!(global.header().selector_count, 4);
        assert_eq!(global.header().endpoints_byte_length, 6);
        assert!(global.has_alpha_slices());
        assert_eq!(global.image_desc(0).unwrap(), descs[0]);
        assert!(global.image_desc(1).is_none());

        let palettes = global.palettes();
        assert_eq!(palettes.endpoints, &[0xE0; 6]);
        assert_eq!(palettes.selectors, &[0x5E; 4]);
        assert_eq!(palettes.tables, &[0x7A; 10]);
    }

    #[test]
    fn parse_rejects_short_header() {
        let bytes = [0u8; BasisLzGlobalHeader::SIZE_BYTES - 1];
        assert_eq!(
            GlobalData::parse(&bytes, 0).unwrap_err(),
            GlobalDataError::TooShortForHeader {
                required: BasisLzGlobalHeader::SIZE_BYTES,
                actual: BasisLzGlobalHeader::SIZE_BYTES - 1,
            }
        );
    }

    #[rstest::rstest]
    #[case(4)] // endpoints_byte_length
    #[case(8)] // selectors_byte_length
    #[case(12)] // tables_byte_length
    fn parse_rejects_zero_length_sub_block(#[case] field_offset: isize) {
        let mut bytes = encode_global_data(&[], &[0xE0; 4], &[0x5E; 4], &[0x7A; 4], 0);
        let mut writer = unsafe { LittleEndianWriter::new(bytes.as_mut_ptr()) };
        unsafe { writer.write_u32_at(0, field_offset) };

        assert_eq!(
            GlobalData::parse(&bytes, 0).unwrap_err(),
            GlobalDataError::EmptySubBlock
        );
    }

    #[test]
    fn parse_rejects_sub_blocks_overflowing_the_buffer() {
        let mut bytes = encode_global_data(&[], &[0xE0; 4], &[0x5E; 4], &[0x7A; 4], 0);
        // Declare more table bytes than the buffer holds.
        let mut writer = unsafe { LittleEndianWriter::new(bytes.as_mut_ptr()) };
        unsafe { writer.write_u32_at(5, 12) };

        assert_eq!(
            GlobalData::parse(&bytes, 0).unwrap_err(),
            GlobalDataError::Overflow {
                required: (BasisLzGlobalHeader::SIZE_BYTES + 4 + 4 + 5) as u64,
                actual: bytes.len() as u64,
            }
        );
    }

    #[test]
    fn parse_counts_image_descs_against_the_buffer() {
        // Consistent for zero images, but one image's descriptor does not fit.
        let bytes = encode_global_data(&[], &[0xE0; 4], &[0x5E; 4], &[0x7A; 4], 0);
        assert!(GlobalData::parse(&bytes, 0).is_ok());
        assert!(matches!(
            GlobalData::parse(&bytes, 1),
            Err(GlobalDataError::Overflow { .. })
        ));
    }

    fn encoded_texture(
        width: u32,
        height: u32,
        depth: u32,
        levels: u32,
        layers: u32,
        faces: u32,
    ) -> Texture {
        let info = TextureCreateInfo {
            format: PixelFormat::Undefined,
            base_width: width,
            base_height: height,
            base_depth: depth,
            level_count: levels,
            layer_count: layers,
            face_count: faces,
            is_array: layers > 1,
        };
        Texture::new_encoded(
            &info,
            FormatDescriptor::etc1s(3, TransferFunction::Linear),
            Supercompression::BasisLz,
        )
        .unwrap()
    }

    #[test]
    fn first_image_indices_count_level_zero_first() {
        // 2 layers, 3 levels, flat: 2 images per level.
        let texture = encoded_texture(16, 16, 1, 3, 2, 1);
        assert_eq!(first_image_indices(&texture), [0, 2, 4, 6]);
    }

    #[test]
    fn first_image_indices_track_shrinking_depth() {
        // Depth 4 halves per level: 4 + 2 + 1 images.
        let texture = encoded_texture(8, 8, 4, 3, 1, 1);
        assert_eq!(first_image_indices(&texture), [0, 4, 6, 7]);
    }

    #[test]
    fn first_image_indices_include_cube_faces() {
        let texture = encoded_texture(8, 8, 1, 2, 1, 6);
        assert_eq!(first_image_indices(&texture), [0, 6, 12]);
    }
}
