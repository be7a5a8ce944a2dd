#![doc = include_str!("../README.MD")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

// Core modules
pub mod engine;
pub mod error;
pub mod format;
pub mod global_data;
pub mod transcode;

mod etc1s;
mod levels;
mod uastc;

// Re-export key APIs
pub use engine::{
    EngineError, EngineResult, Etc1sImageTranscoder, Etc1sPalettes, ImageRegion, TranscodeEngine,
    UastcImageTranscoder,
};
pub use error::{GlobalDataError, TranscodeError, TranscodeResult};
pub use format::{resolve_target_format, ResolvedTarget, TranscodeFlags, TranscodeFormat};
pub use global_data::{first_image_indices, BasisLzGlobalHeader, GlobalData, ImageDesc};
pub use transcode::transcode;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod test_prelude;
