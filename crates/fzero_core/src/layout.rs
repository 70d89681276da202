//! Fixed byte map of the SRAM image.

use crate::checksum::CHECKSUM_SIZE;
use crate::league::{RECORDS_PER_TRACK, TRACKS_PER_LEAGUE};
use crate::record::RECORD_SIZE;

pub const SIGNATURE: &[u8; 5] = b"FZERO";
pub const SIGNATURE_SIZE: usize = SIGNATURE.len();
pub const LEAGUE_COUNT: usize = 3;
pub const LEAGUE_SIZE: usize = RECORD_SIZE * RECORDS_PER_TRACK * TRACKS_PER_LEAGUE + CHECKSUM_SIZE;
pub const UNLOCKS_SIZE: usize = 1;
/// Bytes the game actually uses.
pub const DATA_SIZE: usize = SIGNATURE_SIZE * 2 + LEAGUE_SIZE * LEAGUE_COUNT + UNLOCKS_SIZE;
/// Size of the whole battery-backed memory.
pub const SRAM_SIZE: usize = 2048;

pub const HEADER_OFFSET: usize = 0;
pub const LEAGUES_OFFSET: usize = HEADER_OFFSET + SIGNATURE_SIZE;
pub const UNLOCKS_OFFSET: usize = LEAGUES_OFFSET + LEAGUE_SIZE * LEAGUE_COUNT;
pub const FOOTER_OFFSET: usize = UNLOCKS_OFFSET + UNLOCKS_SIZE;

const _: () = assert!(DATA_SIZE == 512);
const _: () = assert!(FOOTER_OFFSET + SIGNATURE_SIZE == DATA_SIZE);

pub fn league_offset(index: usize) -> usize {
    LEAGUES_OFFSET + index * LEAGUE_SIZE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn at(start: usize, len: usize) -> Self {
        Self {
            start,
            end: start + len,
        }
    }

    pub fn slice<'a>(&self, data: &'a [u8]) -> Option<&'a [u8]> {
        data.get(self.start..self.end)
    }

    /// The part of the range that `data` actually holds, possibly empty.
    pub fn clamped<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        let end = self.end.min(data.len());
        &data[self.start.min(end)..end]
    }
}
