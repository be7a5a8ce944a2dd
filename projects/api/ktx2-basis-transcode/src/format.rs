//! Logical transcode targets, transcode flags and target format resolution.

use crate::error::{TranscodeError, TranscodeResult};
use core::ops::{BitOr, BitOrAssign};
use derive_enum_all_values::AllValues;
use ktx2_texture::PixelFormat;

/// A logical transcode target.
///
/// Most members name one concrete format family; [`Etc`](TranscodeFormat::Etc)
/// and [`Bc1OrBc3`](TranscodeFormat::Bc1OrBc3) are resolved to their opaque or
/// alpha-capable member by [`resolve_target_format`], as are the alpha-capable
/// PVRTC members when the source has no alpha.
///
/// Discriminants match the transcoder's wire values, so raw values read from
/// configuration or FFI convert through [`TryFrom<u32>`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, AllValues)]
#[repr(u32)]
pub enum TranscodeFormat {
    Etc1Rgb = 0,
    Etc2Rgba = 1,
    Bc1Rgb = 2,
    Bc3Rgba = 3,
    Bc4R = 4,
    Bc5Rg = 5,
    Bc7Rgba = 6,
    Pvrtc1_4Rgb = 8,
    Pvrtc1_4Rgba = 9,
    Astc4x4Rgba = 10,
    Rgba32 = 13,
    Rgb565 = 14,
    Bgr565 = 15,
    Rgba4444 = 16,
    Pvrtc2_4Rgb = 18,
    Pvrtc2_4Rgba = 19,
    EacR11 = 20,
    EacRg11 = 21,
    /// Selects [`Etc1Rgb`](Self::Etc1Rgb) or [`Etc2Rgba`](Self::Etc2Rgba) by alpha presence.
    Etc = 22,
    /// Selects [`Bc1Rgb`](Self::Bc1Rgb) or [`Bc3Rgba`](Self::Bc3Rgba) by alpha presence.
    Bc1OrBc3 = 23,
}

impl TranscodeFormat {
    /// Whether this member needs alpha-based resolution before use.
    pub const fn is_ambiguous(self) -> bool {
        matches!(
            self,
            TranscodeFormat::Etc
                | TranscodeFormat::Bc1OrBc3
                | TranscodeFormat::Pvrtc1_4Rgba
                | TranscodeFormat::Pvrtc2_4Rgba
        )
    }
}

impl TryFrom<u32> for TranscodeFormat {
    type Error = TranscodeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        for &format in TranscodeFormat::all_values() {
            if format as u32 == value {
                return Ok(format);
            }
        }
        Err(TranscodeError::UnknownTargetFormat(value))
    }
}

/// Flags modifying a transcode operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TranscodeFlags(u32);

impl TranscodeFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Upscale non-power-of-two textures for PVRTC targets. Not implemented;
    /// requesting it fails the transcode outright.
    pub const PVRTC_DECODE_TO_NEXT_POW2: Self = Self(1 << 1);
    /// When the source has alpha, transcode the alpha data into opaque target
    /// formats instead of the color data.
    pub const TRANSCODE_ALPHA_TO_OPAQUE: Self = Self(1 << 2);
    /// Favor quality over speed where the engine offers the choice.
    pub const HIGH_QUALITY: Self = Self(1 << 5);

    /// Raw bit value.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Builds flags from a raw bit value. Unknown bits are kept and handed to
    /// the engine untouched.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Whether all bits of `other` are set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for TranscodeFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for TranscodeFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// A fully resolved transcode target.
///
/// Produced by [`resolve_target_format`]; immutable once computed. The
/// format member is always concrete (never an auto-selecting one) and the
/// pixel format carries the color space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTarget {
    format: TranscodeFormat,
    pixel_format: PixelFormat,
}

impl ResolvedTarget {
    /// The concrete logical format handed to the engine.
    pub fn format(&self) -> TranscodeFormat {
        self.format
    }

    /// The pixel format tag the destination container is created with.
    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    /// Whether the target stores sRGB-encoded color.
    pub fn is_srgb(&self) -> bool {
        self.pixel_format.is_srgb()
    }

    /// Whether the target is block compressed.
    pub fn is_compressed(&self) -> bool {
        self.pixel_format.is_compressed()
    }

    /// Texel block dimensions of the target.
    pub fn block_dims(&self) -> (u32, u32) {
        self.pixel_format.block_dims()
    }
}

/// Resolves a logical transcode target against the source's properties.
///
/// A pure function of its inputs: auto-selecting members resolve by
/// `has_alpha`, and the concrete member maps to its sRGB pixel format variant
/// when `srgb` is set (formats without an sRGB variant keep their UNORM tag).
///
/// # Errors
///
/// - [`TranscodeError::Pow2UpscaleUnsupported`] when
///   [`TranscodeFlags::PVRTC_DECODE_TO_NEXT_POW2`] is requested.
/// - [`TranscodeError::NonPowerOfTwoPvrtc`] when the target is any PVRTC
///   variant and a base dimension is not a power of two. PVRTC block layout
///   requires power-of-two dimensions; this is a precondition, not a
///   transcoding error.
pub fn resolve_target_format(
    requested: TranscodeFormat,
    has_alpha: bool,
    srgb: bool,
    flags: TranscodeFlags,
    base_width: u32,
    base_height: u32,
) -> TranscodeResult<ResolvedTarget> {
    if flags.contains(TranscodeFlags::PVRTC_DECODE_TO_NEXT_POW2) {
        tracing::debug!("decoding to the next power of two is not supported");
        return Err(TranscodeError::Pow2UpscaleUnsupported);
    }

    let format = match requested {
        TranscodeFormat::Etc => {
            if has_alpha {
                TranscodeFormat::Etc2Rgba
            } else {
                TranscodeFormat::Etc1Rgb
            }
        }
        TranscodeFormat::Bc1OrBc3 => {
            if has_alpha {
                TranscodeFormat::Bc3Rgba
            } else {
                TranscodeFormat::Bc1Rgb
            }
        }
        // The engine does not write opaque alpha blocks.
        TranscodeFormat::Pvrtc1_4Rgba if !has_alpha => TranscodeFormat::Pvrtc1_4Rgb,
        TranscodeFormat::Pvrtc2_4Rgba if !has_alpha => TranscodeFormat::Pvrtc2_4Rgb,
        other => other,
    };

    if matches!(
        format,
        TranscodeFormat::Pvrtc1_4Rgb
            | TranscodeFormat::Pvrtc1_4Rgba
            | TranscodeFormat::Pvrtc2_4Rgb
            | TranscodeFormat::Pvrtc2_4Rgba
    ) && (!base_width.is_power_of_two() || !base_height.is_power_of_two())
    {
        tracing::debug!(
            base_width,
            base_height,
            "PVRTC targets require power-of-two base dimensions"
        );
        return Err(TranscodeError::NonPowerOfTwoPvrtc {
            width: base_width,
            height: base_height,
        });
    }

    let pixel_format = match format {
        TranscodeFormat::Etc1Rgb => {
            // ETC1 is a strict subset of ETC2, which is what GPUs expose.
            if srgb {
                PixelFormat::Etc2Rgb8Srgb
            } else {
                PixelFormat::Etc2Rgb8Unorm
            }
        }
        TranscodeFormat::Etc2Rgba => {
            if srgb {
                PixelFormat::Etc2Rgba8Srgb
            } else {
                PixelFormat::Etc2Rgba8Unorm
            }
        }
        TranscodeFormat::EacR11 => PixelFormat::EacR11Unorm,
        TranscodeFormat::EacRg11 => PixelFormat::EacRg11Unorm,
        TranscodeFormat::Bc1Rgb => {
            // Transcoding does not produce BC1 punch-through alpha.
            if srgb {
                PixelFormat::Bc1RgbSrgb
            } else {
                PixelFormat::Bc1RgbUnorm
            }
        }
        TranscodeFormat::Bc3Rgba => {
            if srgb {
                PixelFormat::Bc3Srgb
            } else {
                PixelFormat::Bc3Unorm
            }
        }
        TranscodeFormat::Bc4R => PixelFormat::Bc4Unorm,
        TranscodeFormat::Bc5Rg => PixelFormat::Bc5Unorm,
        TranscodeFormat::Bc7Rgba => {
            if srgb {
                PixelFormat::Bc7Srgb
            } else {
                PixelFormat::Bc7Unorm
            }
        }
        TranscodeFormat::Pvrtc1_4Rgb | TranscodeFormat::Pvrtc1_4Rgba => {
            if srgb {
                PixelFormat::Pvrtc1_4bppSrgb
            } else {
                PixelFormat::Pvrtc1_4bppUnorm
            }
        }
        TranscodeFormat::Pvrtc2_4Rgb | TranscodeFormat::Pvrtc2_4Rgba => {
            if srgb {
                PixelFormat::Pvrtc2_4bppSrgb
            } else {
                PixelFormat::Pvrtc2_4bppUnorm
            }
        }
        TranscodeFormat::Astc4x4Rgba => {
            if srgb {
                PixelFormat::Astc4x4Srgb
            } else {
                PixelFormat::Astc4x4Unorm
            }
        }
        TranscodeFormat::Rgb565 => PixelFormat::R5g6b5Unorm,
        TranscodeFormat::Bgr565 => PixelFormat::B5g6r5Unorm,
        TranscodeFormat::Rgba4444 => PixelFormat::R4g4b4a4Unorm,
        TranscodeFormat::Rgba32 => {
            if srgb {
                PixelFormat::R8g8b8a8Srgb
            } else {
                PixelFormat::R8g8b8a8Unorm
            }
        }
        // Auto-selecting members were replaced above.
        TranscodeFormat::Etc | TranscodeFormat::Bc1OrBc3 => {
            return Err(TranscodeError::UnknownTargetFormat(format as u32))
        }
    };

    Ok(ResolvedTarget {
        format,
        pixel_format,
    })
}
