use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::checksum::{CHECKSUM_SIZE, Checksum};
use crate::core_api::{CoreError, CoreErrorCode};
use crate::diagnostics::{Diagnostics, Issue};
use crate::layout::ByteRange;
use crate::record::{RECORD_SIZE, Record, hex};

pub const TRACKS_PER_LEAGUE: usize = 5;
/// 10 best races plus the best lap.
pub const RECORDS_PER_TRACK: usize = 11;
pub const RACES_PER_TRACK: usize = RECORDS_PER_TRACK - 1;
pub const RECORDS_PER_LEAGUE: usize = TRACKS_PER_LEAGUE * RECORDS_PER_TRACK;
pub const TABLE_SIZE: usize = RECORDS_PER_LEAGUE * RECORD_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeagueId {
    Knight,
    Queen,
    King,
}

impl LeagueId {
    /// Storage order in the image.
    pub const ALL: [LeagueId; 3] = [Self::Knight, Self::Queen, Self::King];

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Knight => "Knight",
            Self::Queen => "Queen",
            Self::King => "King",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == name)
    }

    pub fn index(&self) -> usize {
        match *self {
            Self::Knight => 0,
            Self::Queen => 1,
            Self::King => 2,
        }
    }

    pub fn track_names(&self) -> &'static [&'static str; TRACKS_PER_LEAGUE] {
        match *self {
            Self::Knight => &[
                "Mute City I",
                "Big Blue",
                "Sand Ocean",
                "Death Wind I",
                "Silence",
            ],
            Self::Queen => &[
                "Mute City II",
                "Port Town I",
                "Red Canyon I",
                "White Land I",
                "White Land II",
            ],
            Self::King => &[
                "Mute City III",
                "Death Wind II",
                "Port Town II",
                "Red Canyon II",
                "Fire Field",
            ],
        }
    }
}

impl fmt::Display for LeagueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One track's slice of a league table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRecords<'a> {
    pub name: String,
    pub races: &'a [Record],
    pub best_lap: &'a Record,
}

/// The record table of one league: 5 tracks of 10 races and a best lap,
/// stored track by track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LeagueFields")]
pub struct League {
    name: String,
    records: Vec<Record>,
}

// Deserialized leagues go through `League::new` so the record count holds.
#[derive(Deserialize)]
struct LeagueFields {
    name: String,
    records: Vec<Record>,
}

impl TryFrom<LeagueFields> for League {
    type Error = CoreError;

    fn try_from(fields: LeagueFields) -> Result<Self, Self::Error> {
        League::new(fields.name, fields.records)
    }
}

impl League {
    pub fn new(name: impl Into<String>, records: Vec<Record>) -> Result<Self, CoreError> {
        if records.len() != RECORDS_PER_LEAGUE {
            return Err(CoreError::invalid_input(format!(
                "league needs {RECORDS_PER_LEAGUE} records, got {}",
                records.len()
            )));
        }
        Ok(Self {
            name: name.into(),
            records,
        })
    }

    /// A league with every slot blank.
    pub fn blank(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: vec![Record::default(); RECORDS_PER_LEAGUE],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> Option<LeagueId> {
        LeagueId::from_name(&self.name)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn decode(data: &[u8], name: &str) -> Result<Self, CoreError> {
        Self::decode_with(data, name, false, &mut Diagnostics::new())
    }

    /// Decodes a league table followed by its checksum.
    ///
    /// A checksum mismatch is an error only when `strict_checksum` is set;
    /// otherwise it is logged and the decoded records are kept. Short input
    /// is decoded as far as it goes: missing records are blank and a missing
    /// checksum is only reported.
    pub fn decode_with(
        data: &[u8],
        name: &str,
        strict_checksum: bool,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self, CoreError> {
        let needed = TABLE_SIZE + CHECKSUM_SIZE;
        if data.len() < needed {
            warn!("{name} League truncated: need {needed} bytes, got {}", data.len());
            diagnostics.push(Issue::Truncated {
                section: format!("{name} League"),
                needed,
                found: data.len(),
            });
        }

        let mut records = Vec::with_capacity(RECORDS_PER_LEAGUE);
        for index in 0..RECORDS_PER_LEAGUE {
            let (track, slot) = (index / RECORDS_PER_TRACK, index % RECORDS_PER_TRACK);
            let chunk = ByteRange::at(index * RECORD_SIZE, RECORD_SIZE).clamped(data);
            let (record, err) = Record::decode_or_default(chunk);
            if let Some(err) = err {
                diagnostics.push(Issue::MalformedRecord {
                    league: name.to_string(),
                    track,
                    slot,
                    reason: err.message,
                });
            }
            debug!(
                "{:04X}: Track {track:2}, record {slot:2}: [{}] {record}",
                index * RECORD_SIZE,
                hex(chunk)
            );
            records.push(record);
        }

        let table = ByteRange::at(0, TABLE_SIZE).clamped(data);
        let computed = Checksum::from_data(table);
        match ByteRange::at(TABLE_SIZE, CHECKSUM_SIZE).slice(data) {
            Some(&[lo, hi]) => {
                let stored = Checksum::parse([lo, hi]);
                if stored == computed {
                    debug!("{name} League checksum OK [{stored}]");
                } else if strict_checksum {
                    return Err(CoreError::new(
                        CoreErrorCode::Checksum,
                        format!("{name} League checksum FAIL: {stored}, expected {computed}"),
                    ));
                } else {
                    warn!("{name} League checksum FAIL: {stored}, expected {computed}");
                    diagnostics.push(Issue::ChecksumMismatch {
                        league: name.to_string(),
                        stored,
                        computed,
                    });
                }
            }
            _ if strict_checksum => {
                return Err(CoreError::new(
                    CoreErrorCode::Checksum,
                    format!("{name} League checksum missing, expected {computed}"),
                ));
            }
            _ => debug!("{name} League checksum missing, not verified"),
        }

        Ok(Self {
            name: name.to_string(),
            records,
        })
    }

    fn encode_table(&self) -> Vec<u8> {
        self.records.iter().flat_map(Record::encode).collect()
    }

    /// Record table plus a freshly computed checksum.
    pub fn encode(&self) -> Vec<u8> {
        let mut data = self.encode_table();
        let checksum = Checksum::from_data(&data);
        data.extend_from_slice(&checksum.encode());
        data
    }

    /// Checksum that [`League::encode`] writes for the current records.
    pub fn checksum(&self) -> Checksum {
        Checksum::from_data(&self.encode_table())
    }

    /// Track display names; unknown leagues get `Track 1` .. `Track 5`.
    pub fn track_names(&self) -> Vec<String> {
        match self.id() {
            Some(id) => id.track_names().iter().map(|s| s.to_string()).collect(),
            None => (1..=TRACKS_PER_LEAGUE)
                .map(|n| format!("Track {n}"))
                .collect(),
        }
    }

    pub fn track_records(&self) -> Vec<TrackRecords<'_>> {
        self.track_names()
            .into_iter()
            .zip(self.records.chunks(RECORDS_PER_TRACK))
            .map(|(name, chunk)| TrackRecords {
                name,
                races: &chunk[..RACES_PER_TRACK],
                best_lap: &chunk[RACES_PER_TRACK],
            })
            .collect()
    }

    /// Replaces one track's records wholesale.
    pub fn replace_track(
        &mut self,
        track: usize,
        races: &[Record],
        best_lap: Record,
    ) -> Result<(), CoreError> {
        check_index("track", track, TRACKS_PER_LEAGUE)?;
        if races.len() != RACES_PER_TRACK {
            return Err(CoreError::invalid_input(format!(
                "track needs {RACES_PER_TRACK} race records, got {}",
                races.len()
            )));
        }
        let start = track * RECORDS_PER_TRACK;
        self.records[start..start + RACES_PER_TRACK].copy_from_slice(races);
        self.records[start + RACES_PER_TRACK] = best_lap;
        Ok(())
    }

    /// Sets one slot; slot `10` is the best lap.
    pub fn set_record(&mut self, track: usize, slot: usize, record: Record) -> Result<(), CoreError> {
        check_index("track", track, TRACKS_PER_LEAGUE)?;
        check_index("slot", slot, RECORDS_PER_TRACK)?;
        self.records[track * RECORDS_PER_TRACK + slot] = record;
        Ok(())
    }

    pub fn clear_track(&mut self, track: usize) -> Result<(), CoreError> {
        check_index("track", track, TRACKS_PER_LEAGUE)?;
        let start = track * RECORDS_PER_TRACK;
        self.records[start..start + RECORDS_PER_TRACK].fill(Record::default());
        Ok(())
    }
}

fn check_index(what: &str, index: usize, count: usize) -> Result<(), CoreError> {
    if index >= count {
        return Err(CoreError::invalid_input(format!(
            "invalid {what} {index}, expected 0..{}",
            count - 1
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Mode, Vehicle};
    use crate::time::Time;

    fn sample_league() -> League {
        let mut league = League::blank("Queen");
        league
            .set_record(
                1,
                0,
                Record::new(Time::new(1, 58, 12), Vehicle::GoldenFox, Mode::GrandPrix),
            )
            .unwrap();
        league
            .set_record(
                1,
                10,
                Record::new(Time::new(0, 21, 7), Vehicle::GoldenFox, Mode::Practice),
            )
            .unwrap();
        league
    }

    #[test]
    fn encode_appends_checksum_of_table() {
        let league = League::blank("Knight");
        let data = league.encode();
        assert_eq!(data.len(), TABLE_SIZE + CHECKSUM_SIZE);
        // 55 x (0x09 + 0x59 + 0x99) = 55 x 251
        assert_eq!(league.checksum().value(), 13_805);
        assert_eq!(&data[TABLE_SIZE..], &13_805u16.to_le_bytes());
    }

    #[test]
    fn decode_round_trips() {
        let league = sample_league();
        let mut diagnostics = Diagnostics::new();
        let decoded =
            League::decode_with(&league.encode(), "Queen", true, &mut diagnostics).unwrap();
        assert_eq!(decoded, league);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn checksum_mismatch_warns_by_default() {
        let league = sample_league();
        let mut data = league.encode();
        data[TABLE_SIZE] ^= 0x01;

        let mut diagnostics = Diagnostics::new();
        let decoded = League::decode_with(&data, "Queen", false, &mut diagnostics).unwrap();
        assert_eq!(decoded, league);
        assert!(matches!(
            diagnostics.issues(),
            [Issue::ChecksumMismatch { league, .. }] if league == "Queen"
        ));
    }

    #[test]
    fn checksum_mismatch_fails_in_strict_mode() {
        let mut data = sample_league().encode();
        data[TABLE_SIZE + 1] ^= 0x80;
        let err = League::decode_with(&data, "Queen", true, &mut Diagnostics::new()).unwrap_err();
        assert_eq!(err.code, CoreErrorCode::Checksum);
    }

    #[test]
    fn corrupted_record_is_detected_and_others_survive() {
        let league = sample_league();
        let mut data = league.encode();
        // seconds byte of track 1 slot 0 (Big Blue first race) becomes 0x5A
        let offset = RECORDS_PER_TRACK * RECORD_SIZE + 1;
        data[offset] = 0x5A;

        let mut diagnostics = Diagnostics::new();
        let decoded = League::decode_with(&data, "Queen", false, &mut diagnostics).unwrap();
        assert_eq!(diagnostics.issues().len(), 2);
        assert!(matches!(
            diagnostics.issues()[0],
            Issue::MalformedRecord { track: 1, slot: 0, .. }
        ));
        assert!(matches!(diagnostics.issues()[1], Issue::ChecksumMismatch { .. }));
        assert_eq!(decoded.records()[RECORDS_PER_TRACK], Record::default());
        assert_eq!(
            decoded.records()[RECORDS_PER_TRACK + 10],
            league.records()[RECORDS_PER_TRACK + 10]
        );
    }

    #[test]
    fn short_input_keeps_complete_records() {
        let league = sample_league();
        let data = league.encode();
        // Track 0 and track 1 up to its best lap, which is cut in half.
        let cut = (RECORDS_PER_TRACK + 10) * RECORD_SIZE + 1;

        let mut diagnostics = Diagnostics::new();
        let decoded = League::decode_with(&data[..cut], "Queen", false, &mut diagnostics).unwrap();
        assert_eq!(decoded.records().len(), RECORDS_PER_LEAGUE);
        assert_eq!(decoded.records()[RECORDS_PER_TRACK], league.records()[RECORDS_PER_TRACK]);
        assert_eq!(decoded.records()[RECORDS_PER_TRACK + 10], Record::default());

        let issues = diagnostics.issues();
        assert!(matches!(
            &issues[0],
            Issue::Truncated { needed: 167, found, .. } if *found == cut
        ));
        let malformed = issues
            .iter()
            .filter(|issue| matches!(issue, Issue::MalformedRecord { .. }))
            .count();
        assert_eq!(malformed, RECORDS_PER_LEAGUE - (RECORDS_PER_TRACK + 10));
        assert!(!issues.iter().any(|issue| matches!(issue, Issue::ChecksumMismatch { .. })));
    }

    #[test]
    fn missing_checksum_fails_in_strict_mode() {
        let data = League::blank("King").encode();
        let err = League::decode_with(&data[..TABLE_SIZE], "King", true, &mut Diagnostics::new())
            .unwrap_err();
        assert_eq!(err.code, CoreErrorCode::Checksum);
        assert!(League::decode(&data[..TABLE_SIZE], "King").is_ok());
    }

    #[test]
    fn track_records_split_races_and_lap() {
        let league = sample_league();
        let tracks = league.track_records();
        assert_eq!(tracks.len(), TRACKS_PER_LEAGUE);
        assert_eq!(tracks[1].name, "Port Town I");
        assert_eq!(tracks[1].races.len(), RACES_PER_TRACK);
        assert_eq!(tracks[1].races[0].time, Time::new(1, 58, 12));
        assert_eq!(tracks[1].best_lap.time, Time::new(0, 21, 7));
        assert_eq!(tracks[4].name, "White Land II");
    }

    #[test]
    fn unknown_league_gets_generic_track_names() {
        let league = League::blank("Ace");
        let names: Vec<String> = league.track_records().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec!["Track 1", "Track 2", "Track 3", "Track 4", "Track 5"]
        );
    }

    #[test]
    fn edits_are_bounds_checked() {
        let mut league = League::blank("King");
        assert!(league.set_record(5, 0, Record::default()).is_err());
        assert!(league.set_record(0, 11, Record::default()).is_err());
        assert!(league.clear_track(7).is_err());
        assert!(league.replace_track(0, &[Record::default(); 3], Record::default()).is_err());
        assert!(League::new("King", vec![Record::default(); 54]).is_err());
    }

    #[test]
    fn deserialize_checks_record_count() {
        let league = sample_league();
        let json = serde_json::to_value(&league).unwrap();
        let back: League = serde_json::from_value(json).unwrap();
        assert_eq!(back, league);

        let empty = serde_json::json!({ "name": "Knight", "records": [] });
        let err = serde_json::from_value::<League>(empty).unwrap_err();
        assert!(err.to_string().contains("55 records"));

        let mut short = serde_json::to_value(League::blank("Knight")).unwrap();
        short["records"].as_array_mut().unwrap().pop();
        assert!(serde_json::from_value::<League>(short).is_err());
    }

    #[test]
    fn clear_track_blanks_all_slots() {
        let mut league = sample_league();
        league.clear_track(1).unwrap();
        assert_eq!(league, League::blank("Queen"));
    }
}
