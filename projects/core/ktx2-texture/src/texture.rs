//! The texture container: geometry, format descriptor and owned image storage.

use crate::error::{TextureError, TextureResult};
use crate::format::{FormatDescriptor, PixelFormat, Supercompression};
use crate::level_index::LevelIndexEntry;
use alloc::vec;
use alloc::vec::Vec;

/// Geometry and format for [`Texture::create`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureCreateInfo {
    pub format: PixelFormat,
    pub base_width: u32,
    pub base_height: u32,
    pub base_depth: u32,
    pub level_count: u32,
    pub layer_count: u32,
    pub face_count: u32,
    pub is_array: bool,
}

/// Whether [`Texture::create`] allocates the image data buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageAllocation {
    /// Allocate a zeroed buffer sized for the format and geometry.
    Allocate,
    /// Leave the container without image data (a loader fills it later).
    Deferred,
}

/// A texture container.
///
/// Owns its image data buffer and level index exclusively; both are replaced,
/// never aliased, when a transcode commits its result via
/// [`Texture::adopt_payload`].
///
/// Level data is stored smallest mip first: the entry for the highest level
/// index has the lowest byte offset, and each following level's offset is
/// padded to [`Texture::required_level_alignment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    base_width: u32,
    base_height: u32,
    base_depth: u32,
    level_count: u32,
    layer_count: u32,
    face_count: u32,
    is_array: bool,
    is_video: bool,
    format: PixelFormat,
    descriptor: FormatDescriptor,
    supercompression: Supercompression,
    is_compressed: bool,
    required_level_alignment: u32,
    global_data: Option<Vec<u8>>,
    data: Option<Vec<u8>>,
    level_index: Vec<LevelIndexEntry>,
}

#[inline]
fn align_up(value: u64, alignment: u64) -> u64 {
    value.div_ceil(alignment) * alignment
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

fn lcm(a: u64, b: u64) -> u64 {
    a / gcd(a, b) * b
}

fn validate_geometry(info: &TextureCreateInfo) -> TextureResult<()> {
    if info.base_width == 0 || info.base_height == 0 || info.base_depth == 0 {
        return Err(TextureError::InvalidGeometry("zero base dimension"));
    }
    if info.level_count == 0 {
        return Err(TextureError::InvalidGeometry("zero level count"));
    }
    if info.layer_count == 0 {
        return Err(TextureError::InvalidGeometry("zero layer count"));
    }
    if info.face_count != 1 && info.face_count != 6 {
        return Err(TextureError::InvalidGeometry("face count must be 1 or 6"));
    }
    // Cube maps are square and flat; there are no 3D cube maps.
    if info.face_count == 6 && (info.base_depth != 1 || info.base_width != info.base_height) {
        return Err(TextureError::InvalidGeometry(
            "cube maps require square faces and depth 1",
        ));
    }
    let max_dim = info.base_width.max(info.base_height).max(info.base_depth);
    let max_levels = 32 - max_dim.leading_zeros();
    if info.level_count > max_levels {
        return Err(TextureError::InvalidGeometry(
            "more levels than the base dimensions can hold",
        ));
    }
    Ok(())
}

impl Texture {
    /// Creates a texture in a concrete pixel format.
    ///
    /// This is the container factory used to build transcode destinations:
    /// the level index is laid out smallest mip first with each level's offset
    /// padded to the format's required alignment, and with
    /// [`StorageAllocation::Allocate`] a zeroed data buffer of exactly that
    /// size is allocated. Allocation is fallible; an allocator refusal
    /// surfaces as [`TextureError::OutOfMemory`] rather than aborting.
    pub fn create(info: &TextureCreateInfo, storage: StorageAllocation) -> TextureResult<Self> {
        validate_geometry(info)?;
        if info.format.block_byte_size() == 0 {
            return Err(TextureError::UnsizedFormat(info.format));
        }

        let descriptor = FormatDescriptor::for_pixel_format(info.format);
        let alignment = lcm(info.format.block_byte_size() as u64, 4) as u32;

        let mut texture = Self {
            base_width: info.base_width,
            base_height: info.base_height,
            base_depth: info.base_depth,
            level_count: info.level_count,
            layer_count: info.layer_count,
            face_count: info.face_count,
            is_array: info.is_array,
            is_video: false,
            format: info.format,
            descriptor,
            supercompression: Supercompression::None,
            is_compressed: info.format.is_compressed(),
            required_level_alignment: alignment,
            global_data: None,
            data: None,
            level_index: vec![LevelIndexEntry::default(); info.level_count as usize],
        };

        let mut offset = 0u64;
        for level in (0..texture.level_count).rev() {
            offset = align_up(offset, alignment as u64);
            let byte_length = texture.image_size(level) * texture.images_per_level(level) as u64;
            texture.level_index[level as usize] = LevelIndexEntry {
                byte_offset: offset,
                byte_length,
                uncompressed_byte_length: byte_length,
            };
            offset += byte_length;
        }

        if matches!(storage, StorageAllocation::Allocate) {
            let bytes = usize::try_from(offset)
                .map_err(|_| TextureError::OutOfMemory { bytes: offset })?;
            let mut data = Vec::new();
            data.try_reserve_exact(bytes)
                .map_err(|_| TextureError::OutOfMemory { bytes: offset })?;
            data.resize(bytes, 0);
            texture.data = Some(data);
        }
        Ok(texture)
    }

    /// Creates a container around an externally produced, still-encoded
    /// payload.
    ///
    /// This is what a file reader uses: the descriptor and supercompression
    /// scheme describe the encoded data, and the payload (level index, image
    /// data, global data) is installed afterwards through the setters. No
    /// storage is allocated here.
    pub fn new_encoded(
        info: &TextureCreateInfo,
        descriptor: FormatDescriptor,
        supercompression: Supercompression,
    ) -> TextureResult<Self> {
        validate_geometry(info)?;
        let alignment = match supercompression {
            Supercompression::None if descriptor.block_byte_size() > 0 => {
                lcm(descriptor.block_byte_size() as u64, 4) as u32
            }
            // Supercompressed level data has no alignment requirement.
            _ => 1,
        };
        Ok(Self {
            base_width: info.base_width,
            base_height: info.base_height,
            base_depth: info.base_depth,
            level_count: info.level_count,
            layer_count: info.layer_count,
            face_count: info.face_count,
            is_array: info.is_array,
            is_video: false,
            format: info.format,
            descriptor,
            supercompression,
            is_compressed: descriptor.block_dims() != (1, 1),
            required_level_alignment: alignment,
            global_data: None,
            data: None,
            level_index: vec![LevelIndexEntry::default(); info.level_count as usize],
        })
    }

    pub fn base_width(&self) -> u32 {
        self.base_width
    }

    pub fn base_height(&self) -> u32 {
        self.base_height
    }

    pub fn base_depth(&self) -> u32 {
        self.base_depth
    }

    pub fn level_count(&self) -> u32 {
        self.level_count
    }

    pub fn layer_count(&self) -> u32 {
        self.layer_count
    }

    pub fn face_count(&self) -> u32 {
        self.face_count
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    /// Whether the texture is a Basis video sequence (per-image frame flags apply).
    pub fn is_video(&self) -> bool {
        self.is_video
    }

    pub fn set_video(&mut self, is_video: bool) {
        self.is_video = is_video;
    }

    /// Concrete pixel format tag; [`PixelFormat::Undefined`] while the payload
    /// is still in a transcodable encoding.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn descriptor(&self) -> &FormatDescriptor {
        &self.descriptor
    }

    pub fn supercompression(&self) -> Supercompression {
        self.supercompression
    }

    pub fn set_supercompression(&mut self, scheme: Supercompression) {
        self.supercompression = scheme;
    }

    pub fn is_compressed(&self) -> bool {
        self.is_compressed
    }

    /// Alignment each level's byte offset must honor inside the data buffer.
    pub fn required_level_alignment(&self) -> u32 {
        self.required_level_alignment
    }

    /// Dimensions of mip `level`, each clamped to a minimum of 1.
    pub fn level_dimensions(&self, level: u32) -> (u32, u32, u32) {
        (
            (self.base_width >> level).max(1),
            (self.base_height >> level).max(1),
            (self.base_depth >> level).max(1),
        )
    }

    /// Number of images (layer x face x depth slice) at mip `level`.
    ///
    /// Faces and depth slices multiply directly; cube maps have depth 1, so
    /// the product never double counts.
    pub fn images_per_level(&self, level: u32) -> u32 {
        let (_, _, depth) = self.level_dimensions(level);
        self.layer_count * self.face_count * depth
    }

    /// Byte size of one image (a single face or depth slice) at mip `level`
    /// in the container's format.
    ///
    /// Transcode destinations are sized here once; the transcoders read this
    /// value back rather than recomputing it.
    pub fn image_size(&self, level: u32) -> u64 {
        let (width, height, _) = self.level_dimensions(level);
        let (block_width, block_height) = self.descriptor.block_dims();
        let blocks_x = width.div_ceil(block_width) as u64;
        let blocks_y = height.div_ceil(block_height) as u64;
        blocks_x * blocks_y * self.descriptor.block_byte_size() as u64
    }

    /// The level index, one entry per mip level.
    pub fn level_index(&self) -> &[LevelIndexEntry] {
        &self.level_index
    }

    /// Byte offset of mip `level` inside the data buffer, if the level exists.
    pub fn level_data_offset(&self, level: u32) -> Option<u64> {
        self.level_index
            .get(level as usize)
            .map(|entry| entry.byte_offset)
    }

    /// Installs a level index; its length must match the level count.
    pub fn set_level_index(&mut self, entries: Vec<LevelIndexEntry>) -> TextureResult<()> {
        if entries.len() != self.level_count as usize {
            return Err(TextureError::LevelIndexMismatch {
                expected: self.level_count as usize,
                actual: entries.len(),
            });
        }
        self.level_index = entries;
        Ok(())
    }

    /// The image data buffer, if materialized.
    pub fn image_data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Mutable access to the image data buffer, if materialized.
    pub fn image_data_mut(&mut self) -> Option<&mut [u8]> {
        self.data.as_deref_mut()
    }

    pub fn set_image_data(&mut self, data: Vec<u8>) {
        self.data = Some(data);
    }

    /// Supercompression global data (shared codebooks), if attached.
    pub fn global_data(&self) -> Option<&[u8]> {
        self.global_data.as_deref()
    }

    pub fn set_global_data(&mut self, data: Vec<u8>) {
        self.global_data = Some(data);
    }

    /// Replaces this texture's format metadata and payload with `donor`'s.
    ///
    /// Moves the donor's format tag, descriptor, compressed classification,
    /// required level alignment, level index and data buffer into `self` and
    /// clears the supercompression scheme; geometry is untouched (the donor is
    /// expected to share it). Consuming the donor by value makes the transfer
    /// single-owner by construction: the donor is disposed here, after its
    /// payload has moved out.
    pub fn adopt_payload(&mut self, donor: Texture) {
        self.format = donor.format;
        self.descriptor = donor.descriptor;
        self.is_compressed = donor.is_compressed;
        self.supercompression = Supercompression::None;
        self.required_level_alignment = donor.required_level_alignment;
        self.level_index = donor.level_index;
        self.data = donor.data;
        self.global_data = None;
    }
}
