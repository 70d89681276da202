use std::io::Read;

use crate::diagnostics::{Diagnostics, Issue};
use crate::league::{League, LeagueId};
use crate::merge::merge;
use crate::record::Record;
use crate::save::{DecodeOptions, Save};

use super::error::{CoreError, CoreErrorCode};
use super::types::{LeagueEntry, RecordEntry, Snapshot, TrackEntry};

#[derive(Debug, Default, Clone, Copy)]
pub struct Engine {
    options: DecodeOptions,
}

/// A decoded image plus the problems found while decoding it.
#[derive(Debug, Clone)]
pub struct Session {
    save: Save,
    issues: Vec<Issue>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DecodeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    pub fn open_bytes<B: AsRef<[u8]>>(&self, bytes: B) -> Result<Session, CoreError> {
        let mut diagnostics = Diagnostics::new();
        let save = Save::decode_with(bytes.as_ref(), &self.options, &mut diagnostics).map_err(
            |e| {
                CoreError::new(
                    e.code,
                    format!("failed to parse F-Zero SRAM image: {}", e.message),
                )
            },
        )?;
        Ok(Session {
            save,
            issues: diagnostics.into_issues(),
        })
    }

    pub fn open_reader<R: Read>(&self, reader: R) -> Result<Session, CoreError> {
        let mut bytes = Vec::new();
        reader
            .take(crate::layout::SRAM_SIZE as u64)
            .read_to_end(&mut bytes)
            .map_err(|e| CoreError::new(CoreErrorCode::Io, format!("failed to read input: {e}")))?;
        self.open_bytes(bytes)
    }
}

impl Session {
    pub fn from_save(save: Save) -> Self {
        Self {
            save,
            issues: Vec::new(),
        }
    }

    pub fn save(&self) -> &Save {
        &self.save
    }

    pub fn into_save(self) -> Save {
        self.save
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            leagues: self
                .save
                .leagues()
                .iter()
                .enumerate()
                .map(|(index, league)| league_entry(league, self.save.unlocks()[index]))
                .collect(),
            unlocked: self.save.unlocked_leagues(),
            padding: self.save.padding(),
            issues: self.issues.iter().map(ToString::to_string).collect(),
        }
    }

    /// Merges the other sessions' saves into this one.
    pub fn merge_from(&mut self, others: &[&Session]) {
        let saves: Vec<&Save> = others.iter().map(|s| &s.save).collect();
        merge(&mut self.save, &saves);
    }

    pub fn set_unlocked(&mut self, league: LeagueId, unlocked: bool) {
        self.save.set_unlocked(league, unlocked);
    }

    pub fn set_record(
        &mut self,
        league: LeagueId,
        track: usize,
        slot: usize,
        record: Record,
    ) -> Result<(), CoreError> {
        self.save.league_mut(league).set_record(track, slot, record)
    }

    pub fn clear_track(&mut self, league: LeagueId, track: usize) -> Result<(), CoreError> {
        self.save.league_mut(league).clear_track(track)
    }

    /// Re-encoded 2048-byte image with fresh checksums.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.save.encode()
    }
}

fn league_entry(league: &League, master_unlocked: bool) -> LeagueEntry {
    LeagueEntry {
        name: league.name().to_string(),
        checksum: league.checksum().to_string(),
        master_unlocked,
        tracks: league
            .track_records()
            .into_iter()
            .enumerate()
            .map(|(index, track)| TrackEntry {
                index,
                name: track.name,
                races: track
                    .races
                    .iter()
                    .enumerate()
                    .map(|(slot, record)| record_entry(slot, record))
                    .collect(),
                best_lap: record_entry(track.races.len(), track.best_lap),
            })
            .collect(),
    }
}

fn record_entry(slot: usize, record: &Record) -> RecordEntry {
    RecordEntry {
        slot,
        time: record.time.to_string(),
        total_cents: record.time.total_cents(),
        vehicle: record.vehicle,
        mode: record.mode,
        displayed: record.displayed,
    }
}
