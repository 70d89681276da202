use std::fmt::Write as _;

use fzero_core::core_api::{LeagueEntry, RecordEntry, Session, TrackEntry};
use fzero_core::league::LeagueId;
use fzero_core::record::Record;
use serde_json::{Map as JsonMap, Value as JsonValue};

const BEST_LAP_LABEL: &str = "Lap";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRenderOptions {
    /// Also list blank (hidden) record slots.
    pub show_hidden: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonRenderOptions {
    pub show_hidden: bool,
}

pub fn render_text(session: &Session) -> String {
    render_text_with_options(session, TextRenderOptions::default())
}

/// Human-readable report: leagues, tracks and records, then unlocks and any
/// decode warnings.
pub fn render_text_with_options(session: &Session, options: TextRenderOptions) -> String {
    let save = session.save();
    let mut out = String::new();

    for league in save.leagues() {
        let _ = writeln!(out, "{} League", league.name());
        for track in league.track_records() {
            let _ = writeln!(out, "\t{}", track.name);
            for (slot, record) in track.races.iter().enumerate() {
                write_record(&mut out, &(slot + 1).to_string(), record, options);
            }
            write_record(&mut out, BEST_LAP_LABEL, track.best_lap, options);
        }
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "Master difficulty unlocked for leagues: {}",
        format_unlocked(&save.unlocked_leagues())
    );

    if !session.issues().is_empty() {
        out.push_str("\nWarnings:\n");
        for issue in session.issues() {
            let _ = writeln!(out, "  - {issue}");
        }
    }

    out
}

fn write_record(out: &mut String, label: &str, record: &Record, options: TextRenderOptions) {
    if !record.displayed && !options.show_hidden {
        return;
    }
    let _ = writeln!(out, "\t\t{label:>3}: {}", record.pretty());
}

pub fn render_json(session: &Session) -> JsonValue {
    render_json_with_options(session, JsonRenderOptions::default())
}

pub fn render_json_with_options(session: &Session, options: JsonRenderOptions) -> JsonValue {
    let snapshot = session.snapshot();
    let mut out = JsonMap::new();

    out.insert(
        "leagues".to_string(),
        JsonValue::Array(
            snapshot
                .leagues
                .iter()
                .map(|league| league_to_json(league, options))
                .collect(),
        ),
    );
    out.insert(
        "unlocked".to_string(),
        JsonValue::Array(
            snapshot
                .unlocked
                .iter()
                .map(|id| JsonValue::String(id.to_string()))
                .collect(),
        ),
    );
    out.insert(
        "issues".to_string(),
        JsonValue::Array(
            snapshot
                .issues
                .iter()
                .cloned()
                .map(JsonValue::String)
                .collect(),
        ),
    );

    JsonValue::Object(out)
}

fn league_to_json(league: &LeagueEntry, options: JsonRenderOptions) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert("name".to_string(), JsonValue::String(league.name.clone()));
    out.insert(
        "checksum".to_string(),
        JsonValue::String(league.checksum.clone()),
    );
    out.insert(
        "master_unlocked".to_string(),
        JsonValue::Bool(league.master_unlocked),
    );
    out.insert(
        "tracks".to_string(),
        JsonValue::Array(
            league
                .tracks
                .iter()
                .map(|track| track_to_json(track, options))
                .collect(),
        ),
    );
    JsonValue::Object(out)
}

fn track_to_json(track: &TrackEntry, options: JsonRenderOptions) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert("name".to_string(), JsonValue::String(track.name.clone()));
    out.insert(
        "races".to_string(),
        JsonValue::Array(
            track
                .races
                .iter()
                .filter(|entry| entry.displayed || options.show_hidden)
                .map(record_to_json)
                .collect(),
        ),
    );
    out.insert(
        "best_lap".to_string(),
        if track.best_lap.displayed || options.show_hidden {
            record_to_json(&track.best_lap)
        } else {
            JsonValue::Null
        },
    );
    JsonValue::Object(out)
}

fn record_to_json(entry: &RecordEntry) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert("slot".to_string(), JsonValue::from(entry.slot));
    out.insert("time".to_string(), JsonValue::String(entry.time.clone()));
    out.insert("total_cents".to_string(), JsonValue::from(entry.total_cents));
    out.insert(
        "vehicle".to_string(),
        JsonValue::String(entry.vehicle.to_string()),
    );
    out.insert("mode".to_string(), JsonValue::String(entry.mode.to_string()));
    out.insert("displayed".to_string(), JsonValue::Bool(entry.displayed));
    JsonValue::Object(out)
}

fn format_unlocked(unlocked: &[LeagueId]) -> String {
    unlocked
        .iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
