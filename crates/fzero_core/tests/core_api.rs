use std::fs;
use std::path::PathBuf;

use fzero_core::core_api::{CoreErrorCode, Engine, Session};
use fzero_core::diagnostics::Issue;
use fzero_core::league::LeagueId;
use fzero_core::record::{Mode, Record, Vehicle};
use fzero_core::save::{DecodeOptions, Save};
use fzero_core::time::Time;

fn sample_bytes() -> Vec<u8> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample.srm");
    fs::read(path).expect("fixture should be readable")
}

fn sample_session() -> Session {
    Engine::new()
        .open_bytes(sample_bytes())
        .expect("fixture should parse")
}

#[test]
fn open_bytes_reports_clean_fixture() {
    let session = sample_session();
    assert!(session.is_clean());
    assert_eq!(session.save().unlocked_leagues(), vec![LeagueId::Knight]);
}

#[test]
fn open_bytes_keeps_what_a_truncated_image_holds() {
    let session = Engine::new()
        .open_bytes(&sample_bytes()[..100])
        .expect("short image still decodes");
    assert!(!session.is_clean());
    assert!(matches!(
        session.issues().first(),
        Some(Issue::Truncated { needed: 512, found: 100, .. })
    ));

    let knight = session.save().league(LeagueId::Knight).track_records();
    assert_eq!(knight[0].races[0].time, Time::new(1, 55, 32));
    assert_eq!(knight[0].races[1].time, Time::new(1, 58, 1));
}

#[test]
fn open_bytes_rejects_empty_input() {
    let err = Engine::new().open_bytes(Vec::new()).unwrap_err();
    assert_eq!(err.code, CoreErrorCode::Parse);
    assert!(err.message.contains("empty"));
}

#[test]
fn strict_engine_rejects_bad_checksum() {
    let mut bytes = sample_bytes();
    bytes[5 + 165] ^= 0x01;

    let lenient = Engine::new().open_bytes(&bytes).expect("lenient decode");
    assert!(matches!(lenient.issues(), [Issue::ChecksumMismatch { .. }]));

    let strict = Engine::with_options(DecodeOptions {
        strict_checksums: true,
    });
    let err = strict.open_bytes(&bytes).unwrap_err();
    assert_eq!(err.code, CoreErrorCode::Checksum);
}

#[test]
fn open_reader_matches_open_bytes() {
    let bytes = sample_bytes();
    let from_reader = Engine::new().open_reader(bytes.as_slice()).unwrap();
    assert_eq!(from_reader.save(), sample_session().save());
}

#[test]
fn snapshot_describes_tracks() {
    let snapshot = sample_session().snapshot();
    assert_eq!(snapshot.leagues.len(), 3);

    let knight = &snapshot.leagues[0];
    assert_eq!(knight.name, "Knight");
    assert_eq!(knight.checksum, "E535");
    assert!(knight.master_unlocked);
    assert_eq!(knight.tracks.len(), 5);

    let mute_city = &knight.tracks[0];
    assert_eq!(mute_city.name, "Mute City I");
    assert_eq!(mute_city.races.len(), 10);
    assert_eq!(mute_city.races[0].time, "1:55.32");
    assert_eq!(mute_city.races[0].total_cents, 11_532);
    assert_eq!(mute_city.best_lap.slot, 10);
    assert_eq!(mute_city.best_lap.mode, Mode::Practice);

    assert_eq!(snapshot.unlocked, vec![LeagueId::Knight]);
    assert!(snapshot.issues.is_empty());
}

#[test]
fn snapshot_serializes_to_json() {
    let snapshot = sample_session().snapshot();
    let json = serde_json::to_value(&snapshot).expect("snapshot should serialize");
    assert_eq!(json["leagues"][2]["tracks"][4]["name"], "Fire Field");
    assert_eq!(json["leagues"][2]["tracks"][4]["races"][0]["vehicle"], "FireStingray");
    assert_eq!(json["unlocked"][0], "Knight");
}

#[test]
fn edits_flow_into_bytes() {
    let mut session = sample_session();
    session.set_unlocked(LeagueId::Queen, true);
    session
        .set_record(
            LeagueId::Queen,
            0,
            0,
            Record::new(Time::new(1, 40, 0), Vehicle::WildGoose, Mode::GrandPrix),
        )
        .unwrap();
    session.clear_track(LeagueId::Knight, 0).unwrap();

    let reopened = Engine::new().open_bytes(session.to_bytes()).unwrap();
    assert!(reopened.is_clean());
    assert_eq!(reopened.save(), session.save());
    assert!(reopened.save().is_unlocked(LeagueId::Queen));
    assert!(!reopened.save().league(LeagueId::Knight).records()[0].displayed);

    let err = session
        .set_record(LeagueId::King, 9, 0, Record::default())
        .unwrap_err();
    assert_eq!(err.code, CoreErrorCode::InvalidInput);
}

#[test]
fn merge_from_combines_sessions() {
    let mut primary = sample_session();

    let mut other = Save::default();
    other.set_unlocked(LeagueId::King, true);
    other
        .league_mut(LeagueId::Knight)
        .set_record(
            0,
            0,
            Record::new(Time::new(1, 50, 0), Vehicle::GoldenFox, Mode::GrandPrix),
        )
        .unwrap();
    let other = Session::from_save(other);

    primary.merge_from(&[&other]);

    let save = primary.save();
    assert_eq!(save.unlocks(), [true, false, true]);
    let races = save.league(LeagueId::Knight).track_records()[0].races.to_vec();
    assert_eq!(races[0].time, Time::new(1, 50, 0));
    assert_eq!(races[1].time, Time::new(1, 55, 32));
    assert_eq!(races[2].time, Time::new(1, 58, 1));
    assert!(!races[3].displayed);
}
