use std::fs;

use h2h_predictor::dataset::{TeamRecord, import_league, list_leagues};
use h2h_predictor::match_builder::{
    AnalysisError, Recommendation, analyze_league_match, build_match,
};

fn league_dir(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    for (name, body) in files {
        fs::write(dir.path().join(name), body).expect("write league");
    }
    dir
}

#[test]
fn two_row_dataset_uses_defaults_and_recommends_home() {
    let dir = league_dir(&[("serie_a.csv", "team;rpg\nHome;1.8\nAway;1.3\n")]);
    let features =
        analyze_league_match(dir.path(), "Serie A", "Home", "Away").expect("both teams present");

    assert_eq!(features.recommendation, Recommendation::Home);
    assert_eq!(features.recommendation_text, "Best bet: 1 (home).");
    assert_eq!(features.probabilities.home_win, 40.0);
    assert_eq!(features.probabilities.draw, 25.0);
    assert_eq!(features.probabilities.away_win, 35.0);

    assert_eq!(features.goals.over15, 70.0);
    assert_eq!(features.goals.over25, 60.0);
    assert_eq!(features.goals.btts, 65.0);
    assert_eq!(features.goals.away_over15, 65.0);
    assert_eq!(features.goals.away_over25, 55.0);
    assert_eq!(features.goals.away_btts, 60.0);
    assert_eq!(features.corners.home_over85, 68.0);
    assert_eq!(features.corners.home_over95, 60.0);
    assert_eq!(features.corners.away_over85, 62.0);
    assert_eq!(features.corners.away_over95, 55.0);
    assert_eq!(features.shots.home_for, 5.0);
    assert_eq!(features.shots.home_against, 3.0);
    assert_eq!(features.shots.away_for, 4.0);
    assert_eq!(features.shots.away_against, 4.0);
    assert_eq!(features.cards.home_for, 2.0);
    assert_eq!(features.cards.away_against, 2.0);
    assert!(!features.trigger_corners);

    assert_eq!(features.home.rpg, 1.8);
    assert_eq!(features.away.rpg, 1.3);
    assert_eq!(features.home.position, "-");
    assert!(features.h2h_history.is_empty());

    // Default over15 (70) and default cards (2 + 2) sit exactly on their thresholds.
    assert_eq!(
        features.prompt,
        "Home comes in with RPG 1.80, while Away shows RPG 1.30. \
         Solid case for Over 1.5 goals in the match. \
         Physical matchup, with a good chance of cards."
    );
}

#[test]
fn lookup_normalizes_names_and_first_duplicate_wins() {
    let dir = league_dir(&[(
        "copa.csv",
        "Club;Position;rpg\nPalmeiras;1;2.0\nFlamengo;2;1.9\nPalmeiras FC;3;0.5\n",
    )]);
    let features =
        analyze_league_match(dir.path(), "copa", "sub-20 palmeiras", "FLAMENGO").expect("found");
    assert_eq!(features.home.rpg, 2.0);
    assert_eq!(features.recommendation, Recommendation::Balanced);
    // The team card reads the `team`/`nome` columns, so a `Club` header
    // falls back to the side label.
    assert_eq!(features.home.name, "Home team");
}

#[test]
fn missing_team_is_a_distinct_outcome() {
    let dir = league_dir(&[("serie_a.csv", "team;rpg\nHome;1.8\nAway;1.3\n")]);
    match analyze_league_match(dir.path(), "serie_a", "Home", "Nobody") {
        Err(AnalysisError::TeamNotFound { team, .. }) => assert_eq!(team, "Nobody"),
        other => panic!("expected TeamNotFound, got {other:?}"),
    }
}

#[test]
fn missing_or_empty_league_is_reported() {
    let dir = league_dir(&[("empty.csv", "team;rpg\n")]);
    assert!(matches!(
        analyze_league_match(dir.path(), "nowhere", "A", "B"),
        Err(AnalysisError::LeagueNotFound { .. })
    ));
    assert!(matches!(
        analyze_league_match(dir.path(), "Empty", "A", "B"),
        Err(AnalysisError::LeagueNotFound { .. })
    ));
}

#[test]
fn enriched_fields_drive_trigger_and_narrative() {
    let home = TeamRecord::from_pairs([
        ("team", "Palmeiras"),
        ("rpg", "1.40"),
        ("form", "w,w,d,l,w,w"),
        ("win_prob", "55"),
        ("draw_prob", "not a number"),
        ("over25", "66"),
        ("cards_for", "1.5"),
        ("ht_goals_scored_pct", "70.0"),
        ("corners_over85", "75.0"),
        ("logo_url", "https://img.test/p.png"),
    ]);
    let away = TeamRecord::from_pairs([("nome", "Flamengo"), ("rpg", "1.9"), ("cards_for", "1.0")]);

    let features = build_match("Brasileirão", &home, &away);
    assert_eq!(features.league, "Brasileirão");
    assert_eq!(features.probabilities.home_win, 55.0);
    assert_eq!(features.probabilities.draw, 25.0);
    assert_eq!(features.corners.home_over85, 75.0);
    assert!(features.trigger_corners);
    assert_eq!(features.recommendation, Recommendation::Away);
    assert_eq!(features.home.form, vec!["W", "W", "D", "L", "W"]);
    assert_eq!(features.away.name, "Flamengo");
    assert_eq!(features.home.logo_url, "https://img.test/p.png");

    let prompt = &features.prompt;
    assert!(prompt.starts_with("Palmeiras comes in with RPG 1.40, while Flamengo shows RPG 1.90."));
    assert!(prompt.contains("W-W-D-L-W"));
    assert!(prompt.contains("Over 2.5"));
    assert!(!prompt.contains("Over 1.5 goals"));
    assert!(!prompt.contains("chance of cards"));
    assert!(prompt.contains("[TRIGGER]"));
}

#[test]
fn over15_clause_when_over25_is_low() {
    let home = TeamRecord::from_pairs([("over15", "72"), ("over25", "50"), ("cards_for", "1")]);
    let away = TeamRecord::from_pairs([("over25", "40")]);
    let features = build_match("x", &home, &away);
    assert!(features.prompt.contains("Over 1.5 goals"));
    assert!(!features.prompt.contains("Over 2.5"));
}

#[test]
fn serializes_for_presentation() {
    // Default RPGs are 1.5 vs 1.2, a 0.3 gap, so the home side is favoured.
    let features = build_match("x", &TeamRecord::default(), &TeamRecord::default());
    let json = serde_json::to_value(&features).expect("serialize");
    assert_eq!(json["recommendation"], "home");
    assert_eq!(json["probabilities"]["home_win"], 40.0);
    assert_eq!(json["home"]["rpg"], 1.5);
    assert_eq!(json["away"]["rpg"], 1.2);

    let even = TeamRecord::from_pairs([("rpg", "1.5")]);
    let json = serde_json::to_value(build_match("x", &even, &even)).expect("serialize");
    assert_eq!(json["recommendation"], "balanced");
}

#[test]
fn enriched_league_with_non_team_header_detects_the_id_column() {
    // Once `sofascore_team_id` exists, the "team" candidate outranks "clube",
    // so names are looked up in the id column and nothing matches.
    let dir = league_dir(&[(
        "enriched.csv",
        "Clube;rpg;sofascore_team_id\nPalmeiras;1.9;1963\nFlamengo;1.7;5981\n",
    )]);
    match analyze_league_match(dir.path(), "enriched", "Palmeiras", "Flamengo") {
        Err(AnalysisError::TeamNotFound { team, .. }) => assert_eq!(team, "Palmeiras"),
        other => panic!("expected TeamNotFound, got {other:?}"),
    }

    // The same file before enrichment resolves both teams.
    let dir = league_dir(&[("raw.csv", "Clube;rpg\nPalmeiras;1.9\nFlamengo;1.7\n")]);
    let features =
        analyze_league_match(dir.path(), "raw", "Palmeiras", "Flamengo").expect("found");
    assert_eq!(features.home.rpg, 1.9);
}

#[test]
fn import_and_list_leagues() {
    let src_dir = league_dir(&[("upload.csv", "team;rpg\nA;1\n")]);
    let leagues = tempfile::tempdir().expect("tempdir");
    let target = leagues.path().join("nested");

    let dest = import_league(&target, "Premier League", &src_dir.path().join("upload.csv"))
        .expect("import");
    assert_eq!(dest, target.join("premier_league.csv"));
    import_league(&target, "La-Liga", &src_dir.path().join("upload.csv")).expect("import");

    assert_eq!(
        list_leagues(&target).expect("list"),
        vec!["la_liga".to_string(), "premier_league".to_string()]
    );
    let features = analyze_league_match(&target, "premier league", "A", "a").expect("found");
    assert_eq!(features.recommendation, Recommendation::Balanced);
}
