use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bits::{pack, unpack};
use crate::core_api::CoreError;
use crate::diagnostics::{Diagnostics, Issue, SignatureKind};
use crate::layout::{
    ByteRange, DATA_SIZE, FOOTER_OFFSET, HEADER_OFFSET, LEAGUE_COUNT, LEAGUE_SIZE, SIGNATURE,
    SIGNATURE_SIZE, SRAM_SIZE, UNLOCKS_OFFSET, UNLOCKS_SIZE, league_offset,
};
use crate::league::{League, LeagueId};

/// Fill byte for the unused tail of the image when none was read.
pub const DEFAULT_PADDING: u8 = 0xFF;

// The unlock byte holds 4 flag bits (3 leagues + 1 reserved) and a mirror.
const UNLOCK_HALF_BITS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DecodeOptions {
    /// Treat league checksum mismatches as errors instead of warnings.
    pub strict_checksums: bool,
}

/// A decoded SRAM image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Save {
    pub(crate) leagues: [League; LEAGUE_COUNT],
    pub(crate) unlocks: [bool; LEAGUE_COUNT],
    pub(crate) padding: u8,
}

impl Default for Save {
    fn default() -> Self {
        Self {
            leagues: LeagueId::ALL.map(|id| League::blank(id.as_str())),
            unlocks: [false; LEAGUE_COUNT],
            padding: DEFAULT_PADDING,
        }
    }
}

impl Save {
    pub fn new(leagues: [League; LEAGUE_COUNT], unlocks: [bool; LEAGUE_COUNT]) -> Self {
        Self {
            leagues,
            unlocks,
            padding: DEFAULT_PADDING,
        }
    }

    pub fn leagues(&self) -> &[League] {
        &self.leagues
    }

    pub fn league(&self, id: LeagueId) -> &League {
        &self.leagues[id.index()]
    }

    pub fn league_mut(&mut self, id: LeagueId) -> &mut League {
        &mut self.leagues[id.index()]
    }

    /// Master difficulty unlock flags, in league order.
    pub fn unlocks(&self) -> [bool; LEAGUE_COUNT] {
        self.unlocks
    }

    pub fn is_unlocked(&self, id: LeagueId) -> bool {
        self.unlocks[id.index()]
    }

    pub fn set_unlocked(&mut self, id: LeagueId, unlocked: bool) {
        self.unlocks[id.index()] = unlocked;
    }

    pub fn unlocked_leagues(&self) -> Vec<LeagueId> {
        LeagueId::ALL
            .into_iter()
            .filter(|id| self.is_unlocked(*id))
            .collect()
    }

    pub fn padding(&self) -> u8 {
        self.padding
    }

    pub fn set_padding(&mut self, padding: u8) {
        self.padding = padding;
    }

    /// Reads at most one full image from `reader` and decodes it.
    pub fn read_from<R: Read>(reader: R) -> Result<Self, CoreError> {
        let mut bytes = Vec::with_capacity(SRAM_SIZE);
        reader.take(SRAM_SIZE as u64).read_to_end(&mut bytes)?;
        Self::decode(&bytes)
    }

    pub fn decode(data: &[u8]) -> Result<Self, CoreError> {
        Self::decode_with(data, &DecodeOptions::default(), &mut Diagnostics::new())
    }

    /// Decodes an image, collecting recoverable problems in `diagnostics`.
    ///
    /// A short image is decoded as far as it goes. Only empty input or, with
    /// `strict_checksums`, a bad league checksum fails outright.
    pub fn decode_with(
        data: &[u8],
        options: &DecodeOptions,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self, CoreError> {
        if data.is_empty() {
            return Err(CoreError::parse("save image is empty"));
        }
        if data.len() < DATA_SIZE {
            warn!(
                "Save image truncated: need {DATA_SIZE} bytes, got {}",
                data.len()
            );
            diagnostics.push(Issue::Truncated {
                section: "Save image".to_string(),
                needed: DATA_SIZE,
                found: data.len(),
            });
        }

        check_signature(data, HEADER_OFFSET, SignatureKind::Header, diagnostics);
        let leagues = [
            decode_league(data, LeagueId::Knight, options, diagnostics)?,
            decode_league(data, LeagueId::Queen, options, diagnostics)?,
            decode_league(data, LeagueId::King, options, diagnostics)?,
        ];
        let unlocks = match data.get(UNLOCKS_OFFSET) {
            Some(&raw) => parse_unlocks(raw, diagnostics),
            None => {
                warn!("Master unlocks missing at 0x{UNLOCKS_OFFSET:04X}");
                diagnostics.push(Issue::Truncated {
                    section: "Master unlocks".to_string(),
                    needed: UNLOCKS_SIZE,
                    found: 0,
                });
                [false; LEAGUE_COUNT]
            }
        };
        check_signature(data, FOOTER_OFFSET, SignatureKind::Footer, diagnostics);
        let padding = data.get(DATA_SIZE).copied().unwrap_or(DEFAULT_PADDING);

        Ok(Self {
            leagues,
            unlocks,
            padding,
        })
    }

    /// Full 2048-byte image. League checksums are always recomputed.
    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(SRAM_SIZE);
        data.extend_from_slice(SIGNATURE);
        for league in &self.leagues {
            data.extend_from_slice(&league.encode());
        }
        data.push(pack_unlocks(&self.unlocks));
        data.extend_from_slice(SIGNATURE);
        debug_assert_eq!(data.len(), DATA_SIZE);
        data.resize(SRAM_SIZE, self.padding);
        data
    }
}

fn decode_league(
    data: &[u8],
    id: LeagueId,
    options: &DecodeOptions,
    diagnostics: &mut Diagnostics,
) -> Result<League, CoreError> {
    debug!("Parsing {id} League");
    let bytes = ByteRange::at(league_offset(id.index()), LEAGUE_SIZE).clamped(data);
    League::decode_with(bytes, id.as_str(), options.strict_checksums, diagnostics)
}

fn check_signature(
    data: &[u8],
    offset: usize,
    kind: SignatureKind,
    diagnostics: &mut Diagnostics,
) -> bool {
    let found = ByteRange::at(offset, SIGNATURE_SIZE).clamped(data);
    if found == SIGNATURE {
        debug!("{} signature at 0x{offset:04X} OK", kind.as_str());
        return true;
    }

    warn!(
        "{} signature mismatch at 0x{offset:04X}: {:?}, expected {:?}",
        kind.as_str(),
        String::from_utf8_lossy(found),
        String::from_utf8_lossy(SIGNATURE)
    );
    diagnostics.push(Issue::SignatureMismatch {
        kind,
        offset,
        found: found.to_vec(),
    });
    false
}

/// Bits 0..=2 are the league flags, bit 3 is reserved and zero, and bits
/// 4..=7 must repeat bits 0..=3 exactly. Anything else unlocks nothing.
fn parse_unlocks(raw: u8, diagnostics: &mut Diagnostics) -> [bool; LEAGUE_COUNT] {
    let bits = unpack(&[raw], &[1; UNLOCK_HALF_BITS * 2]);
    let (flags, mirror) = bits.split_at(UNLOCK_HALF_BITS);

    if flags == mirror && flags[LEAGUE_COUNT..].iter().all(|&bit| bit == 0) {
        let unlocks = std::array::from_fn(|i| flags[i] == 1);
        debug!("Master unlocks OK [{raw:02X}]: {unlocks:?}");
        unlocks
    } else {
        warn!("Invalid Master unlocks data: [{raw:02X}]");
        diagnostics.push(Issue::InvalidUnlocks { raw });
        [false; LEAGUE_COUNT]
    }
}

fn pack_unlocks(unlocks: &[bool; LEAGUE_COUNT]) -> u8 {
    let half: Vec<(u64, u32)> = (0..UNLOCK_HALF_BITS)
        .map(|i| (u64::from(unlocks.get(i).copied().unwrap_or(false)), 1))
        .collect();
    pack(&[half.as_slice(), half.as_slice()].concat())[0]
}
