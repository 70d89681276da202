use serde::{Deserialize, Serialize};

use crate::league::LeagueId;
use crate::record::{Mode, Vehicle};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordEntry {
    pub slot: usize,
    pub time: String,
    pub total_cents: u32,
    pub vehicle: Vehicle,
    pub mode: Mode,
    pub displayed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackEntry {
    pub index: usize,
    pub name: String,
    pub races: Vec<RecordEntry>,
    pub best_lap: RecordEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LeagueEntry {
    pub name: String,
    pub checksum: String,
    pub master_unlocked: bool,
    pub tracks: Vec<TrackEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub leagues: Vec<LeagueEntry>,
    pub unlocked: Vec<LeagueId>,
    pub padding: u8,
    pub issues: Vec<String>,
}
