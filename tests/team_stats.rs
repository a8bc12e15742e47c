use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;

use serde_json::{Value, json};

use h2h_predictor::dataset::TeamRecord;
use h2h_predictor::remote::{JsonSource, RemoteFailure};
use h2h_predictor::team_stats::{
    DerivedStatistics, aggregate, fetch_team_statistics, row_ids, team_statistics_url,
};

const BASE: &str = "https://provider.test/api/v1";

fn read_fixture(name: &str) -> Value {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    let raw = fs::read_to_string(path).expect("fixture file should be readable");
    serde_json::from_str(&raw).expect("fixture should be json")
}

struct OneShot {
    payload: Option<Value>,
    urls: RefCell<Vec<String>>,
}

impl JsonSource for OneShot {
    fn get_json(&self, url: &str) -> Result<Value, RemoteFailure> {
        self.urls.borrow_mut().push(url.to_string());
        self.payload.clone().ok_or_else(|| RemoteFailure {
            url: url.to_string(),
            attempts: 1,
        })
    }
}

#[test]
fn aggregates_overall_block() {
    let row = TeamRecord::from_pairs([("shots_against", "3.4"), ("cards_against", "1.9")]);
    let stats = aggregate(&read_fixture("team_statistics_palmeiras.json"), &row);
    assert_eq!(
        stats,
        DerivedStatistics {
            corners_over85: 75.0,
            corners_over95: 65.0,
            shots_for: 9.0,
            shots_against: Some(3.4),
            cards_for: 2.16,
            cards_against: Some(1.9),
            ht_goals_scored_pct: 70.0,
        }
    );
}

#[test]
fn aggregates_flat_block_with_alternate_keys() {
    let stats = aggregate(
        &read_fixture("team_statistics_flamengo.json"),
        &TeamRecord::default(),
    );
    assert_eq!(stats.corners_over85, 60.0);
    assert_eq!(stats.corners_over95, 50.0);
    assert_eq!(stats.shots_for, 7.0);
    assert_eq!(stats.cards_for, 2.0);
    assert_eq!(stats.ht_goals_scored_pct, 40.0);
    assert_eq!(stats.shots_against, Some(0.0));
    assert_eq!(stats.cards_against, Some(0.0));
}

#[test]
fn zero_matches_everywhere_gives_zero_fields() {
    let payload = json!({
        "statistics": {"overall": {
            "corners": {"total": 40, "matches": 0},
            "shotsOnTarget": {"total": 12, "matches": 0},
            "shotsOffTarget": {"total": 9, "matches": 0},
            "yellowCards": {"total": 5, "matches": 0},
            "redCards": {"total": 1, "matches": 0},
            "goalsScored": {"total": 0, "matches": 0}
        }}
    });
    let stats = aggregate(&payload, &TeamRecord::default());
    assert_eq!(stats.shots_for, 0.0);
    assert_eq!(stats.cards_for, 0.0);
    assert_eq!(stats.ht_goals_scored_pct, 0.0);
    // Zero corners per match lands in the lowest band.
    assert_eq!((stats.corners_over85, stats.corners_over95), (50.0, 42.0));
}

#[test]
fn malformed_payload_degrades_to_defaults() {
    for payload in [
        json!(null),
        json!([]),
        json!({"statistics": "n/a"}),
        json!({"statistics": {"overall": "n/a", "corners": {"total": 200, "matches": 20}}}),
        json!({"data": {"goalsScored": {"total": "x", "periods": {"first": "y"}}}}),
    ] {
        let stats = aggregate(&payload, &TeamRecord::default());
        assert_eq!(stats.shots_for, 0.0, "payload {payload}");
        assert_eq!(stats.ht_goals_scored_pct, 0.0, "payload {payload}");
    }

    // A non-object "overall" falls back to the enclosing object.
    let stats = aggregate(
        &json!({"statistics": {"overall": "n/a", "corners": {"total": 200, "matches": 20}}}),
        &TeamRecord::default(),
    );
    assert_eq!(stats.corners_over85, 75.0);
}

#[test]
fn missing_ids_short_circuit_without_a_request() {
    let source = OneShot {
        payload: Some(read_fixture("team_statistics_palmeiras.json")),
        urls: RefCell::default(),
    };
    let row = TeamRecord::from_pairs([("team", "Palmeiras"), ("sofascore_team_id", "1963")]);
    assert!(fetch_team_statistics(&source, BASE, &row).is_none());

    let bad = TeamRecord::from_pairs([("sofascore_team_id", "abc"), ("sofascore_season_id", "1")]);
    assert!(row_ids(&bad).is_none());
    assert!(fetch_team_statistics(&source, BASE, &bad).is_none());
    assert!(source.urls.borrow().is_empty());
}

#[test]
fn fetch_uses_fallback_id_columns_and_provider_url() {
    let source = OneShot {
        payload: Some(read_fixture("team_statistics_palmeiras.json")),
        urls: RefCell::default(),
    };
    let row = TeamRecord::from_pairs([("team_id", " 1963 "), ("season_id", "58766")]);
    let ids = row_ids(&row).expect("ids");
    let stats = fetch_team_statistics(&source, BASE, &row).expect("stats");
    assert_eq!(stats.corners_over85, 75.0);
    assert_eq!(
        source.urls.borrow().as_slice(),
        &[team_statistics_url(BASE, ids)]
    );
    assert_eq!(
        team_statistics_url(BASE, ids),
        "https://provider.test/api/v1/team/1963/statistics/season/58766"
    );
}

#[test]
fn failed_or_empty_fetch_yields_nothing() {
    let row = TeamRecord::from_pairs([("sofascore_team_id", "1"), ("sofascore_season_id", "2")]);
    let down = OneShot {
        payload: None,
        urls: RefCell::default(),
    };
    assert!(fetch_team_statistics(&down, BASE, &row).is_none());

    let empty = OneShot {
        payload: Some(json!({})),
        urls: RefCell::default(),
    };
    assert!(fetch_team_statistics(&empty, BASE, &row).is_none());
}

#[test]
fn derived_fields_render_for_dataset_cells() {
    let stats = aggregate(
        &read_fixture("team_statistics_palmeiras.json"),
        &TeamRecord::default(),
    );
    let fields = stats.to_fields();
    assert_eq!(fields[0], ("corners_over85", "75.0".to_string()));
    assert_eq!(fields[2], ("shots_for", "9.0".to_string()));
    assert_eq!(fields[4], ("cards_for", "2.16".to_string()));
    assert_eq!(fields[6], ("ht_goals_scored_pct", "70.0".to_string()));
}

#[test]
fn non_numeric_against_cells_are_left_alone() {
    let row = TeamRecord::from_pairs([("shots_against", "n/a"), ("cards_against", "3")]);
    let stats = aggregate(&read_fixture("team_statistics_palmeiras.json"), &row);
    assert_eq!(stats.shots_against, None);
    assert_eq!(stats.cards_against, Some(3.0));

    let fields = stats.to_fields();
    assert!(fields.iter().all(|(name, _)| *name != "shots_against"));
    assert!(fields.contains(&("cards_against", "3.0".to_string())));
}
