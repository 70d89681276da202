use std::fmt;

use serde::{Deserialize, Serialize};

pub const CHECKSUM_SIZE: usize = 2;

/// Additive 16-bit checksum, stored little-endian after each league table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Checksum(pub u16);

impl Checksum {
    /// Sum of all bytes, wrapping at 2^16.
    pub fn from_data(data: &[u8]) -> Self {
        Self(data.iter().fold(0u16, |acc, &b| acc.wrapping_add(u16::from(b))))
    }

    pub fn parse(bytes: [u8; CHECKSUM_SIZE]) -> Self {
        Self(u16::from_le_bytes(bytes))
    }

    pub fn encode(&self) -> [u8; CHECKSUM_SIZE] {
        self.0.to_le_bytes()
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for Checksum {
    // Stored byte order, as a hex editor shows it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [lo, hi] = self.encode();
        write!(f, "{lo:02X}{hi:02X}")
    }
}
