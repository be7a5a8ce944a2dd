//! Test utilities: a mock transcoding engine with call tracking and factories
//! for encoded source textures.

extern crate std;

use crate::engine::{
    EngineError, EngineResult, Etc1sImageTranscoder, Etc1sPalettes, ImageRegion, TranscodeEngine,
    UastcImageTranscoder,
};
use crate::format::{TranscodeFlags, TranscodeFormat};
use crate::global_data::{BasisLzGlobalHeader, ImageDesc};
use alloc::vec;
use alloc::vec::Vec;
use endian_writer::{EndianWriter, LittleEndianWriter};
use ktx2_texture::{
    FormatDescriptor, LevelIndexEntry, PixelFormat, Supercompression, Texture, TextureCreateInfo,
    TransferFunction,
};
use std::sync::{Arc, Mutex};

/// Byte the mock engine writes at the start of every transcoded image.
pub const MOCK_FILL_BYTE: u8 = 0xCD;

/// Bytes one fabricated ETC1S image occupies in a source level (one 8-byte
/// color slice plus one 8-byte alpha slice position).
pub const MOCK_SLICE_PAIR_BYTES: u32 = 16;

/// One recorded ETC1S palette decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPalettes {
    pub endpoint_count: u16,
    pub selector_count: u16,
    pub endpoints: Vec<u8>,
    pub selectors: Vec<u8>,
    pub tables: Vec<u8>,
}

/// One recorded ETC1S image transcode call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEtc1sImage {
    pub desc: ImageDesc,
    pub target: TranscodeFormat,
    pub region: ImageRegion,
    pub level_data_len: usize,
    pub output_capacity: usize,
    pub is_video: bool,
    pub alpha_to_opaque: bool,
}

/// One recorded UASTC image transcode call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUastcImage {
    pub target: TranscodeFormat,
    pub region: ImageRegion,
    pub input_first_byte: u8,
    pub input_len: usize,
    pub output_capacity: usize,
    pub has_alpha: bool,
    pub flags: TranscodeFlags,
}

/// Everything the mock engine was asked to do.
#[derive(Debug, Clone, Default)]
pub struct MockEngineCalls {
    pub init_count: u32,
    pub etc1s_setups: Vec<RecordedPalettes>,
    pub uastc_setups: u32,
    pub etc1s_images: Vec<RecordedEtc1sImage>,
    pub uastc_images: Vec<RecordedUastcImage>,
}

impl MockEngineCalls {
    fn total_images(&self) -> usize {
        self.etc1s_images.len() + self.uastc_images.len()
    }
}

/// A mock transcoding engine that records every call.
///
/// Each successful image transcode writes [`MOCK_FILL_BYTE`] at the start of
/// the output slice and the image's run-wide ordinal in the byte after it, so
/// tests can verify destination placement. Failure injection aborts on the
/// n-th image across the whole run, after recording it.
#[derive(Debug, Clone)]
pub struct MockEngine {
    calls: Arc<Mutex<MockEngineCalls>>,
    fail_on_image: Option<usize>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(MockEngineCalls::default())),
            fail_on_image: None,
        }
    }

    /// An engine that fails on the image with run-wide ordinal `ordinal`.
    pub fn failing_on_image(ordinal: usize) -> Self {
        Self {
            calls: Arc::new(Mutex::new(MockEngineCalls::default())),
            fail_on_image: Some(ordinal),
        }
    }

    /// A snapshot of the recorded calls.
    pub fn calls(&self) -> MockEngineCalls {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn mark_output(output: &mut [u8], ordinal: usize) {
    output[0] = MOCK_FILL_BYTE;
    if output.len() > 1 {
        output[1] = ordinal as u8;
    }
}

/// ETC1S side of [`MockEngine`].
#[derive(Debug)]
pub struct MockEtc1sTranscoder {
    calls: Arc<Mutex<MockEngineCalls>>,
    fail_on_image: Option<usize>,
}

impl Etc1sImageTranscoder for MockEtc1sTranscoder {
    fn transcode_image(
        &self,
        desc: &ImageDesc,
        target: TranscodeFormat,
        output: &mut [u8],
        region: &ImageRegion,
        level_data: &[u8],
        is_video: bool,
        alpha_to_opaque: bool,
    ) -> EngineResult<()> {
        let mut calls = self.calls.lock().unwrap();
        let ordinal = calls.total_images();
        calls.etc1s_images.push(RecordedEtc1sImage {
            desc: *desc,
            target,
            region: *region,
            level_data_len: level_data.len(),
            output_capacity: output.len(),
            is_video,
            alpha_to_opaque,
        });
        if self.fail_on_image == Some(ordinal) {
            return Err(EngineError::CorruptBitstream {
                level: region.level,
                image: ordinal as u32,
            });
        }
        mark_output(output, ordinal);
        Ok(())
    }
}

/// UASTC side of [`MockEngine`].
#[derive(Debug)]
pub struct MockUastcTranscoder {
    calls: Arc<Mutex<MockEngineCalls>>,
    fail_on_image: Option<usize>,
}

impl UastcImageTranscoder for MockUastcTranscoder {
    fn transcode_image(
        &self,
        target: TranscodeFormat,
        output: &mut [u8],
        region: &ImageRegion,
        image_data: &[u8],
        has_alpha: bool,
        flags: TranscodeFlags,
    ) -> EngineResult<()> {
        let mut calls = self.calls.lock().unwrap();
        let ordinal = calls.total_images();
        calls.uastc_images.push(RecordedUastcImage {
            target,
            region: *region,
            input_first_byte: image_data.first().copied().unwrap_or(0),
            input_len: image_data.len(),
            output_capacity: output.len(),
            has_alpha,
            flags,
        });
        if self.fail_on_image == Some(ordinal) {
            return Err(EngineError::CorruptBitstream {
                level: region.level,
                image: ordinal as u32,
            });
        }
        mark_output(output, ordinal);
        Ok(())
    }
}

impl TranscodeEngine for MockEngine {
    type Etc1s = MockEtc1sTranscoder;
    type Uastc = MockUastcTranscoder;

    fn ensure_initialized(&self) -> EngineResult<()> {
        // The recorded count lets tests pin down at-most-once-per-operation
        // behavior; the underlying init itself is a no-op and trivially
        // idempotent.
        self.calls.lock().unwrap().init_count += 1;
        Ok(())
    }

    fn etc1s_transcoder(&self, palettes: &Etc1sPalettes<'_>) -> EngineResult<Self::Etc1s> {
        self.calls
            .lock()
            .unwrap()
            .etc1s_setups
            .push(RecordedPalettes {
                endpoint_count: palettes.endpoint_count,
                selector_count: palettes.selector_count,
                endpoints: palettes.endpoints.to_vec(),
                selectors: palettes.selectors.to_vec(),
                tables: palettes.tables.to_vec(),
            });
        Ok(MockEtc1sTranscoder {
            calls: Arc::clone(&self.calls),
            fail_on_image: self.fail_on_image,
        })
    }

    fn uastc_transcoder(&self) -> EngineResult<Self::Uastc> {
        self.calls.lock().unwrap().uastc_setups += 1;
        Ok(MockUastcTranscoder {
            calls: Arc::clone(&self.calls),
            fail_on_image: self.fail_on_image,
        })
    }
}

/// Serializes BasisLZ global data from its parts.
///
/// Palette entry counts are derived from the sub-block byte lengths, which is
/// enough for tests to tell the sub-slices apart.
pub fn encode_global_data(
    descs: &[ImageDesc],
    endpoints: &[u8],
    selectors: &[u8],
    tables: &[u8],
    global_flags: u32,
) -> Vec<u8> {
    let descs_end = BasisLzGlobalHeader::SIZE_BYTES + descs.len() * ImageDesc::SIZE_BYTES;
    let mut bytes = vec![0u8; descs_end + endpoints.len() + selectors.len() + tables.len()];

    // SAFETY: bytes was sized to hold the header and all descriptors
    let mut writer = unsafe { LittleEndianWriter::new(bytes.as_mut_ptr()) };
    unsafe {
        writer.write_u16_at(endpoints.len() as u16, 0);
        writer.write_u16_at(selectors.len() as u16, 2);
        writer.write_u32_at(endpoints.len() as u32, 4);
        writer.write_u32_at(selectors.len() as u32, 8);
        writer.write_u32_at(tables.len() as u32, 12);
        writer.write_u32_at(global_flags, 16);
        for (index, desc) in descs.iter().enumerate() {
            let base =
                (BasisLzGlobalHeader::SIZE_BYTES + index * ImageDesc::SIZE_BYTES) as isize;
            writer.write_u32_at(desc.image_flags, base);
            writer.write_u32_at(desc.rgb_slice_byte_offset, base + 4);
            writer.write_u32_at(desc.rgb_slice_byte_length, base + 8);
            writer.write_u32_at(desc.alpha_slice_byte_offset, base + 12);
            writer.write_u32_at(desc.alpha_slice_byte_length, base + 16);
        }
    }

    let mut cursor = descs_end;
    bytes[cursor..cursor + endpoints.len()].copy_from_slice(endpoints);
    cursor += endpoints.len();
    bytes[cursor..cursor + selectors.len()].copy_from_slice(selectors);
    cursor += selectors.len();
    bytes[cursor..cursor + tables.len()].copy_from_slice(tables);
    bytes
}

/// Image descriptors for every image of `texture`, level 0 first.
///
/// Each image gets an 8-byte color slice at the start of its
/// [`MOCK_SLICE_PAIR_BYTES`] span and, with `has_alpha`, an 8-byte alpha
/// slice after it. Offsets are relative to the image's level.
pub fn default_image_descs(texture: &Texture, has_alpha: bool) -> Vec<ImageDesc> {
    let mut descs = Vec::new();
    for level in 0..texture.level_count() {
        for image in 0..texture.images_per_level(level) {
            let base = image * MOCK_SLICE_PAIR_BYTES;
            descs.push(ImageDesc {
                image_flags: 0,
                rgb_slice_byte_offset: base,
                rgb_slice_byte_length: 8,
                alpha_slice_byte_offset: if has_alpha { base + 8 } else { 0 },
                alpha_slice_byte_length: if has_alpha { 8 } else { 0 },
            });
        }
    }
    descs
}

/// A BasisLZ (ETC1S) source texture with consistent level index, image data
/// and global data.
pub fn create_etc1s_texture(
    width: u32,
    height: u32,
    levels: u32,
    layers: u32,
    components: u32,
    transfer: TransferFunction,
) -> Texture {
    let info = TextureCreateInfo {
        format: PixelFormat::Undefined,
        base_width: width,
        base_height: height,
        base_depth: 1,
        level_count: levels,
        layer_count: layers,
        face_count: 1,
        is_array: layers > 1,
    };
    let descriptor = FormatDescriptor::etc1s(components, transfer);
    let has_alpha = descriptor.has_alpha();
    let mut texture =
        Texture::new_encoded(&info, descriptor, Supercompression::BasisLz).unwrap();

    let mut entries = vec![LevelIndexEntry::default(); levels as usize];
    let mut offset = 0u64;
    for level in (0..levels).rev() {
        let byte_length =
            texture.images_per_level(level) as u64 * MOCK_SLICE_PAIR_BYTES as u64;
        entries[level as usize] = LevelIndexEntry {
            byte_offset: offset,
            byte_length,
            // Supercompressed levels have no meaningful inflated size.
            uncompressed_byte_length: 0,
        };
        offset += byte_length;
    }
    texture.set_image_data(vec![0xB5; offset as usize]);
    texture.set_level_index(entries).unwrap();

    let descs = default_image_descs(&texture, has_alpha);
    let flags = if has_alpha {
        BasisLzGlobalHeader::FLAG_HAS_ALPHA_SLICES
    } else {
        0
    };
    texture.set_global_data(encode_global_data(
        &descs,
        &[0xE0; 6],
        &[0x5E; 4],
        &[0x7A; 10],
        flags,
    ));
    texture
}

/// A UASTC source texture with inflated image data laid out smallest mip
/// first; every data byte holds its own offset truncated to `u8`, so tests
/// can see which span reached the engine.
pub fn create_uastc_texture(
    width: u32,
    height: u32,
    levels: u32,
    components: u32,
    transfer: TransferFunction,
) -> Texture {
    let info = TextureCreateInfo {
        format: PixelFormat::Undefined,
        base_width: width,
        base_height: height,
        base_depth: 1,
        level_count: levels,
        layer_count: 1,
        face_count: 1,
        is_array: false,
    };
    let descriptor = FormatDescriptor::uastc(components, transfer);
    let mut texture =
        Texture::new_encoded(&info, descriptor, Supercompression::None).unwrap();

    let mut entries = vec![LevelIndexEntry::default(); levels as usize];
    let mut offset = 0u64;
    for level in (0..levels).rev() {
        let byte_length = texture.image_size(level) * texture.images_per_level(level) as u64;
        entries[level as usize] = LevelIndexEntry {
            byte_offset: offset,
            byte_length,
            uncompressed_byte_length: byte_length,
        };
        offset += byte_length;
    }
    texture.set_image_data((0..offset).map(|index| index as u8).collect());
    texture.set_level_index(entries).unwrap();
    texture
}
