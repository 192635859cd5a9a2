use std::fs;
use std::path::PathBuf;

use oracle_lens::record::{LockVerdict, Outcome, SENTINEL, parse_season_json};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_season_fixture() {
    let snapshot = parse_season_json(&read_fixture("season_ari.json")).expect("fixture should parse");
    assert_eq!(snapshot.team.as_deref(), Some("ARI"));
    assert_eq!(snapshot.season, Some(2025));
    assert_eq!(snapshot.generated_at.as_deref(), Some("2025-10-14T09:30:00Z"));
    assert_eq!(snapshot.games.len(), 6);

    let first = &snapshot.games[0];
    assert_eq!(first.week, Some(1));
    assert_eq!(first.opponent.as_deref(), Some("DAL"));
    assert_eq!(first.result, Some(Outcome::Win));
    assert_eq!(first.oracle.pick, Some(Outcome::Win));
    assert_eq!(first.oracle.sample_count, 14);
    assert_eq!(first.oracle.reality_lock, Some(LockVerdict::Match));
    assert_eq!(first.expected_win_label(), "62%");
}

#[test]
fn percent_sources_compare_as_fractions() {
    let snapshot = parse_season_json(&read_fixture("season_ari.json")).expect("fixture should parse");
    let week2 = &snapshot.games[1];
    assert_eq!(week2.expected_win_label(), "55%");
    let exp = week2.usable_expected_win().expect("history present");
    assert!((exp - 0.55).abs() < 1e-9);
}

#[test]
fn missing_and_malformed_fields_degrade_to_sentinels() {
    let snapshot = parse_season_json(&read_fixture("season_ari.json")).expect("fixture should parse");

    let week3 = &snapshot.games[2];
    assert_eq!(week3.pick_label(), SENTINEL);
    assert_eq!(week3.expected_win_label(), SENTINEL);
    assert_eq!(week3.confidence_label(), SENTINEL);
    assert!(week3.usable_expected_win().is_none());

    let week4 = &snapshot.games[3];
    assert_eq!(week4.confidence_label(), "64");
    assert_eq!(week4.coherence_label(), SENTINEL);
    assert!(week4.oracle.pregame_story.is_none());
    assert!(week4.oracle.postgame_story.is_none());

    let week5 = &snapshot.games[4];
    assert_eq!(week5.result, None);
    assert_eq!(week5.result_label(), "TBD");
    assert_eq!(week5.score_label(), SENTINEL);

    let week6 = &snapshot.games[5];
    assert_eq!(week6.result_label(), SENTINEL);
    assert_eq!(week6.oracle.sample_count, 0);
}

#[test]
fn top_level_fields_win_over_summary() {
    let raw = r#"{"team":"KC","season":"2024","summary":{"team":"ARI","season":2025},"games":[]}"#;
    let snapshot = parse_season_json(raw).expect("should parse");
    assert_eq!(snapshot.team.as_deref(), Some("KC"));
    assert_eq!(snapshot.season, Some(2024));
    assert!(snapshot.games.is_empty());
}

#[test]
fn non_object_games_are_skipped() {
    let raw = r#"{"games":[1,"x",null,{"week":"2","opponent":"GB","oracle":"bad"}]}"#;
    let snapshot = parse_season_json(raw).expect("should parse");
    assert_eq!(snapshot.games.len(), 1);
    let game = &snapshot.games[0];
    assert_eq!(game.week, Some(2));
    assert_eq!(game.key().to_string(), "2_GB");
    assert_eq!(game.oracle.sample_count, 0);
}

#[test]
fn null_and_empty_documents_are_empty() {
    assert!(parse_season_json("null").expect("null should parse").games.is_empty());
    assert!(parse_season_json("  ").expect("blank should parse").games.is_empty());
    assert!(parse_season_json("{}").expect("object should parse").games.is_empty());
}

#[test]
fn invalid_documents_are_errors() {
    assert!(parse_season_json("{not json").is_err());
    assert!(parse_season_json("[1,2,3]").is_err());
}

#[test]
fn missing_week_uses_sentinel_key() {
    let raw = r#"{"games":[{"opponent":"NO"}]}"#;
    let snapshot = parse_season_json(raw).expect("should parse");
    let key = snapshot.games[0].key();
    assert_eq!(key.week, SENTINEL);
    assert!(snapshot.find(&key).is_some());
}

#[test]
fn bundled_sample_season_parses() {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("data");
    path.push("ari.json");
    let raw = fs::read_to_string(path).expect("sample season should ship with the crate");
    let snapshot = parse_season_json(&raw).expect("sample should parse");
    assert_eq!(snapshot.team.as_deref(), Some("ARI"));
    assert!(!snapshot.games.is_empty());
}
