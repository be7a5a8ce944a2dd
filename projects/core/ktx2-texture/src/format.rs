//! Pixel format tags and the container's format descriptor block.

/// Concrete GPU pixel format of a texture's image data.
///
/// Covers the formats a Basis Universal texture can be transcoded to, plus
/// [`Undefined`](PixelFormat::Undefined) for containers whose payload is still
/// in a transcodable (ETC1S / UASTC) encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PixelFormat {
    /// No concrete GPU format; the payload is still supercompressed / transcodable.
    Undefined = 0,
    Etc2Rgb8Unorm,
    Etc2Rgb8Srgb,
    Etc2Rgba8Unorm,
    Etc2Rgba8Srgb,
    EacR11Unorm,
    EacRg11Unorm,
    /// a.k.a. DXT1
    Bc1RgbUnorm,
    Bc1RgbSrgb,
    /// a.k.a. DXT4/5
    Bc3Unorm,
    Bc3Srgb,
    Bc4Unorm,
    Bc5Unorm,
    Bc7Unorm,
    Bc7Srgb,
    Pvrtc1_4bppUnorm,
    Pvrtc1_4bppSrgb,
    Pvrtc2_4bppUnorm,
    Pvrtc2_4bppSrgb,
    Astc4x4Unorm,
    Astc4x4Srgb,
    /// 16-bit packed RGB, no alpha.
    R5g6b5Unorm,
    /// 16-bit packed BGR, no alpha.
    B5g6r5Unorm,
    /// 16-bit packed RGBA.
    R4g4b4a4Unorm,
    R8g8b8a8Unorm,
    R8g8b8a8Srgb,
}

impl PixelFormat {
    /// Texel block dimensions (width, height). `(1, 1)` for uncompressed formats.
    pub const fn block_dims(self) -> (u32, u32) {
        match self {
            PixelFormat::Undefined
            | PixelFormat::R5g6b5Unorm
            | PixelFormat::B5g6r5Unorm
            | PixelFormat::R4g4b4a4Unorm
            | PixelFormat::R8g8b8a8Unorm
            | PixelFormat::R8g8b8a8Srgb => (1, 1),
            _ => (4, 4),
        }
    }

    /// Bytes per texel block (bytes per texel for uncompressed formats).
    ///
    /// `0` for [`PixelFormat::Undefined`], whose storage size cannot be
    /// derived from the format alone.
    pub const fn block_byte_size(self) -> u32 {
        match self {
            PixelFormat::Undefined => 0,
            PixelFormat::Etc2Rgb8Unorm
            | PixelFormat::Etc2Rgb8Srgb
            | PixelFormat::EacR11Unorm
            | PixelFormat::Bc1RgbUnorm
            | PixelFormat::Bc1RgbSrgb
            | PixelFormat::Bc4Unorm
            | PixelFormat::Pvrtc1_4bppUnorm
            | PixelFormat::Pvrtc1_4bppSrgb
            | PixelFormat::Pvrtc2_4bppUnorm
            | PixelFormat::Pvrtc2_4bppSrgb => 8,
            PixelFormat::Etc2Rgba8Unorm
            | PixelFormat::Etc2Rgba8Srgb
            | PixelFormat::EacRg11Unorm
            | PixelFormat::Bc3Unorm
            | PixelFormat::Bc3Srgb
            | PixelFormat::Bc5Unorm
            | PixelFormat::Bc7Unorm
            | PixelFormat::Bc7Srgb
            | PixelFormat::Astc4x4Unorm
            | PixelFormat::Astc4x4Srgb => 16,
            PixelFormat::R5g6b5Unorm
            | PixelFormat::B5g6r5Unorm
            | PixelFormat::R4g4b4a4Unorm => 2,
            PixelFormat::R8g8b8a8Unorm | PixelFormat::R8g8b8a8Srgb => 4,
        }
    }

    /// Whether the format is block compressed.
    pub const fn is_compressed(self) -> bool {
        self.block_dims().0 > 1
    }

    /// Whether the format carries sRGB-encoded color.
    pub const fn is_srgb(self) -> bool {
        matches!(
            self,
            PixelFormat::Etc2Rgb8Srgb
                | PixelFormat::Etc2Rgba8Srgb
                | PixelFormat::Bc1RgbSrgb
                | PixelFormat::Bc3Srgb
                | PixelFormat::Bc7Srgb
                | PixelFormat::Pvrtc1_4bppSrgb
                | PixelFormat::Pvrtc2_4bppSrgb
                | PixelFormat::Astc4x4Srgb
                | PixelFormat::R8g8b8a8Srgb
        )
    }

    /// Color channel count, alpha included.
    pub const fn component_count(self) -> u32 {
        match self {
            PixelFormat::Undefined => 0,
            PixelFormat::EacR11Unorm | PixelFormat::Bc4Unorm => 1,
            PixelFormat::EacRg11Unorm | PixelFormat::Bc5Unorm => 2,
            PixelFormat::Etc2Rgb8Unorm
            | PixelFormat::Etc2Rgb8Srgb
            | PixelFormat::Bc1RgbUnorm
            | PixelFormat::Bc1RgbSrgb
            | PixelFormat::R5g6b5Unorm
            | PixelFormat::B5g6r5Unorm => 3,
            _ => 4,
        }
    }
}

/// Color model of the descriptor block, mirroring the data format descriptor's
/// model field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorModel {
    /// Plain additive RGB(A), uncompressed.
    Rgb,
    Etc1s,
    Uastc,
    Etc2,
    Bc1,
    Bc3,
    Bc4,
    Bc5,
    Bc7,
    Pvrtc1,
    Pvrtc2,
    Astc,
}

/// Transfer function of the stored color values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferFunction {
    Linear,
    Srgb,
}

/// Supercompression applied to the container's image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Supercompression {
    /// No supercompression; the level data is in the tagged pixel format.
    None,
    /// Basis Universal LZ (ETC1S) with shared global codebooks.
    BasisLz,
    /// Zstandard-deflated payload.
    Zstd,
}

/// The container's color/format descriptor block.
///
/// Carries what the transcoder needs to interpret the payload: color model,
/// transfer function, channel count and texel block geometry. A block byte
/// size of `0` marks an unsized payload (ETC1S slices have no fixed per-block
/// storage size until transcoded).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatDescriptor {
    color_model: ColorModel,
    transfer: TransferFunction,
    components: u32,
    block_width: u32,
    block_height: u32,
    block_byte_size: u32,
}

impl FormatDescriptor {
    /// Descriptor for an ETC1S (BasisLZ) encoded payload.
    pub fn etc1s(components: u32, transfer: TransferFunction) -> Self {
        Self {
            color_model: ColorModel::Etc1s,
            transfer,
            components,
            block_width: 4,
            block_height: 4,
            block_byte_size: 0,
        }
    }

    /// Descriptor for a UASTC encoded payload (16 bytes per 4x4 block, inflated).
    pub fn uastc(components: u32, transfer: TransferFunction) -> Self {
        Self {
            color_model: ColorModel::Uastc,
            transfer,
            components,
            block_width: 4,
            block_height: 4,
            block_byte_size: 16,
        }
    }

    /// Descriptor for a concrete GPU pixel format.
    pub fn for_pixel_format(format: PixelFormat) -> Self {
        let (block_width, block_height) = format.block_dims();
        let color_model = match format {
            PixelFormat::Undefined
            | PixelFormat::R5g6b5Unorm
            | PixelFormat::B5g6r5Unorm
            | PixelFormat::R4g4b4a4Unorm
            | PixelFormat::R8g8b8a8Unorm
            | PixelFormat::R8g8b8a8Srgb => ColorModel::Rgb,
            PixelFormat::Etc2Rgb8Unorm
            | PixelFormat::Etc2Rgb8Srgb
            | PixelFormat::Etc2Rgba8Unorm
            | PixelFormat::Etc2Rgba8Srgb
            | PixelFormat::EacR11Unorm
            | PixelFormat::EacRg11Unorm => ColorModel::Etc2,
            PixelFormat::Bc1RgbUnorm | PixelFormat::Bc1RgbSrgb => ColorModel::Bc1,
            PixelFormat::Bc3Unorm | PixelFormat::Bc3Srgb => ColorModel::Bc3,
            PixelFormat::Bc4Unorm => ColorModel::Bc4,
            PixelFormat::Bc5Unorm => ColorModel::Bc5,
            PixelFormat::Bc7Unorm | PixelFormat::Bc7Srgb => ColorModel::Bc7,
            PixelFormat::Pvrtc1_4bppUnorm | PixelFormat::Pvrtc1_4bppSrgb => ColorModel::Pvrtc1,
            PixelFormat::Pvrtc2_4bppUnorm | PixelFormat::Pvrtc2_4bppSrgb => ColorModel::Pvrtc2,
            PixelFormat::Astc4x4Unorm | PixelFormat::Astc4x4Srgb => ColorModel::Astc,
        };
        Self {
            color_model,
            transfer: if format.is_srgb() {
                TransferFunction::Srgb
            } else {
                TransferFunction::Linear
            },
            components: format.component_count(),
            block_width,
            block_height,
            block_byte_size: format.block_byte_size(),
        }
    }

    /// Color model of the payload.
    pub fn color_model(&self) -> ColorModel {
        self.color_model
    }

    /// Transfer function of the stored color values.
    pub fn transfer(&self) -> TransferFunction {
        self.transfer
    }

    /// Color channel count, alpha included.
    pub fn component_count(&self) -> u32 {
        self.components
    }

    /// Texel block dimensions (width, height).
    pub fn block_dims(&self) -> (u32, u32) {
        (self.block_width, self.block_height)
    }

    /// Bytes per texel block; `0` for unsized (supercompressed) payloads.
    pub fn block_byte_size(&self) -> u32 {
        self.block_byte_size
    }

    /// Whether the payload carries an alpha channel.
    ///
    /// ETC1S payloads declare alpha through their channel count: 2 (RG used as
    /// luminance + alpha) or 4 components. UASTC payloads declare alpha by
    /// tagging the RGBA channel set, which this descriptor records as 4
    /// components.
    pub fn has_alpha(&self) -> bool {
        match self.color_model {
            ColorModel::Etc1s => self.components == 2 || self.components == 4,
            _ => self.components == 4,
        }
    }
}
