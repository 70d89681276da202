//! Combines several saves into one, keeping the best results per track.

use tracing::{debug, warn};

use crate::league::{League, RACES_PER_TRACK};
use crate::record::Record;
use crate::save::Save;

/// Merges every save in `others` into `primary`, in order, and returns it.
///
/// Per track, the race table keeps the 10 fastest of both sides and the best
/// lap keeps the faster entry; ties favour `primary`. Unlocks are OR-ed.
/// Leagues or tracks whose names differ are left untouched.
pub fn merge<'a>(primary: &'a mut Save, others: &[&Save]) -> &'a mut Save {
    for other in others {
        merge_one(primary, other);
    }
    primary
}

fn merge_one(primary: &mut Save, other: &Save) {
    for (league, theirs) in primary.leagues.iter_mut().zip(other.leagues.iter()) {
        if league.name() != theirs.name() {
            warn!(
                "League mismatch: {} vs {}, skipping merge",
                league.name(),
                theirs.name()
            );
            continue;
        }
        *league = merge_league(league, theirs);
    }

    for (unlock, theirs) in primary.unlocks.iter_mut().zip(other.unlocks) {
        *unlock |= theirs;
    }
}

fn merge_league(ours: &League, theirs: &League) -> League {
    let mut merged = ours.clone();
    for (index, (mine, other)) in ours
        .track_records()
        .into_iter()
        .zip(theirs.track_records())
        .enumerate()
    {
        if mine.name != other.name {
            warn!(
                "{} League track mismatch: {} vs {}, skipping merge",
                ours.name(),
                mine.name,
                other.name
            );
            continue;
        }

        let races = best_races(mine.races, other.races);
        let best_lap = if other.best_lap.time.total_cents() < mine.best_lap.time.total_cents() {
            *other.best_lap
        } else {
            *mine.best_lap
        };
        debug!("{} League, {}: merged", ours.name(), mine.name);

        // Both tables come from track_records, so lengths always match.
        if let Err(e) = merged.replace_track(index, &races, best_lap) {
            warn!("{} League, {}: {}", ours.name(), mine.name, e.message);
        }
    }
    merged
}

fn best_races(ours: &[Record], theirs: &[Record]) -> Vec<Record> {
    let mut races: Vec<Record> = ours.iter().chain(theirs).copied().collect();
    // Stable, and keyed on duration alone: on equal times our entries stay ahead.
    races.sort_by_key(|record| record.time.total_cents());
    races.truncate(RACES_PER_TRACK);
    races
}
