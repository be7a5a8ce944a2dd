//! The per-mip-level index: byte placement of each level inside the data buffer.

use alloc::vec::Vec;
use endian_writer::{EndianReader, EndianWriter, LittleEndianReader, LittleEndianWriter};

/// Byte placement of one mip level inside the container's data buffer.
///
/// Levels are stored smallest mip first: the highest level index sits at the
/// lowest byte offset. Once a texture holds data in its tagged pixel format
/// (no supercompression), `byte_length == uncompressed_byte_length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelIndexEntry {
    /// Offset of the level's first byte from the start of the data buffer.
    pub byte_offset: u64,
    /// Stored byte length of the level.
    pub byte_length: u64,
    /// Byte length of the level after any supercompression is undone.
    pub uncompressed_byte_length: u64,
}

impl LevelIndexEntry {
    /// Serialized size of one entry in the container's level index.
    pub const SIZE_BYTES: usize = 24;

    /// Reads one entry from the start of `data`.
    ///
    /// Returns [`None`] if `data` is shorter than [`Self::SIZE_BYTES`].
    #[inline]
    pub fn read_from(data: &[u8]) -> Option<Self> {
        if data.len() < Self::SIZE_BYTES {
            return None;
        }

        // SAFETY: We checked data.len() >= SIZE_BYTES (24), so offsets 0..16 + 8 are safe
        let mut reader = unsafe { LittleEndianReader::new(data.as_ptr()) };
        Some(Self {
            byte_offset: unsafe { reader.read_u64_at(0) },
            byte_length: unsafe { reader.read_u64_at(8) },
            uncompressed_byte_length: unsafe { reader.read_u64_at(16) },
        })
    }

    /// Writes this entry to the start of `out`.
    ///
    /// Returns [`None`] if `out` is shorter than [`Self::SIZE_BYTES`].
    #[inline]
    pub fn write_into(&self, out: &mut [u8]) -> Option<()> {
        if out.len() < Self::SIZE_BYTES {
            return None;
        }

        // SAFETY: We checked out.len() >= SIZE_BYTES (24), so offsets 0..16 + 8 are safe
        let mut writer = unsafe { LittleEndianWriter::new(out.as_mut_ptr()) };
        unsafe {
            writer.write_u64_at(self.byte_offset, 0);
            writer.write_u64_at(self.byte_length, 8);
            writer.write_u64_at(self.uncompressed_byte_length, 16);
        }
        Some(())
    }
}

/// Reads a level index of `count` entries from the start of `data`.
///
/// Returns [`None`] if `data` is too short.
pub fn read_level_index(data: &[u8], count: usize) -> Option<Vec<LevelIndexEntry>> {
    if data.len() < count * LevelIndexEntry::SIZE_BYTES {
        return None;
    }
    let mut entries = Vec::with_capacity(count);
    for level in 0..count {
        entries.push(LevelIndexEntry::read_from(
            &data[level * LevelIndexEntry::SIZE_BYTES..],
        )?);
    }
    Some(entries)
}

/// Writes all of `entries` to the start of `out`.
///
/// Returns [`None`] if `out` is too short.
pub fn write_level_index(entries: &[LevelIndexEntry], out: &mut [u8]) -> Option<()> {
    if out.len() < entries.len() * LevelIndexEntry::SIZE_BYTES {
        return None;
    }
    for (level, entry) in entries.iter().enumerate() {
        entry.write_into(&mut out[level * LevelIndexEntry::SIZE_BYTES..])?;
    }
    Some(())
}
