#![doc = include_str!("../README.MD")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod error;
pub mod format;
pub mod level_index;
pub mod texture;

pub use error::{TextureError, TextureResult};
pub use format::{ColorModel, FormatDescriptor, PixelFormat, Supercompression, TransferFunction};
pub use level_index::LevelIndexEntry;
pub use texture::{StorageAllocation, Texture, TextureCreateInfo};
