use std::path::Path;

use serde::Serialize;

use crate::dataset::{Dataset, TeamRecord, find_team_row, league_path};
use crate::normalize::detect_team_column;

const RPG_EDGE: f64 = 0.15;
const HT_TRIGGER_PCT: f64 = 70.0;
const OVER25_TREND_PCT: f64 = 65.0;
const OVER15_TREND_PCT: f64 = 70.0;
const CARDS_TREND_TOTAL: f64 = 4.0;
const MAX_FORM_ENTRIES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamCard {
    pub name: String,
    pub position: String,
    pub rpg: f64,
    pub form: Vec<String>,
    pub logo_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Probabilities {
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalMarkets {
    pub over15: f64,
    pub over25: f64,
    pub btts: f64,
    pub away_over15: f64,
    pub away_over25: f64,
    pub away_btts: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CornerMarkets {
    pub home_over85: f64,
    pub home_over95: f64,
    pub away_over85: f64,
    pub away_over95: f64,
}

/// For/against averages per side; used for both shots and cards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SideTotals {
    pub home_for: f64,
    pub home_against: f64,
    pub away_for: f64,
    pub away_against: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Home,
    Away,
    Balanced,
}

impl Recommendation {
    pub fn from_rpg(home_rpg: f64, away_rpg: f64) -> Self {
        if (home_rpg - away_rpg).abs() > RPG_EDGE {
            if home_rpg > away_rpg {
                Recommendation::Home
            } else {
                Recommendation::Away
            }
        } else {
            Recommendation::Balanced
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            Recommendation::Home => "Best bet: 1 (home).",
            Recommendation::Away => "Best bet: 2 (away).",
            Recommendation::Balanced => "Balanced matchup: conservative double chance 1X or X2.",
        }
    }
}

/// Paired analysis of two dataset rows. Built on request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchFeatureSet {
    pub league: String,
    pub home: TeamCard,
    pub away: TeamCard,
    pub probabilities: Probabilities,
    pub goals: GoalMarkets,
    pub corners: CornerMarkets,
    pub shots: SideTotals,
    pub cards: SideTotals,
    pub trigger_corners: bool,
    pub recommendation: Recommendation,
    pub recommendation_text: String,
    pub prompt: String,
    pub h2h_history: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("no dataset found for league {league}")]
    LeagueNotFound { league: String },
    #[error("team {team} not found in league {league}")]
    TeamNotFound { league: String, team: String },
    #[error(transparent)]
    Dataset(#[from] anyhow::Error),
}

/// Loads a league file and pairs the two named teams.
pub fn analyze_league_match(
    leagues_dir: &Path,
    league: &str,
    home_team: &str,
    away_team: &str,
) -> Result<MatchFeatureSet, AnalysisError> {
    let path = league_path(leagues_dir, league);
    if !path.exists() {
        return Err(AnalysisError::LeagueNotFound {
            league: league.to_string(),
        });
    }
    let dataset = Dataset::load(&path)?;
    if dataset.rows.is_empty() {
        return Err(AnalysisError::LeagueNotFound {
            league: league.to_string(),
        });
    }

    let team_column = detect_team_column(&dataset.headers).unwrap_or_default();
    let lookup = |team: &str| {
        find_team_row(&dataset.rows, &team_column, team).ok_or_else(|| {
            AnalysisError::TeamNotFound {
                league: league.to_string(),
                team: team.to_string(),
            }
        })
    };
    let home = lookup(home_team)?;
    let away = lookup(away_team)?;
    Ok(build_match(league, home, away))
}

pub fn build_match(league: &str, home: &TeamRecord, away: &TeamRecord) -> MatchFeatureSet {
    let probabilities = Probabilities {
        home_win: field(home, "win_prob", 40.0),
        draw: field(home, "draw_prob", 25.0),
        away_win: field(home, "lose_prob", 35.0),
    };

    let goals = GoalMarkets {
        over15: field(home, "over15", 70.0),
        over25: field(home, "over25", 60.0),
        btts: field(home, "btts", 65.0),
        away_over15: field(away, "over15", 65.0),
        away_over25: field(away, "over25", 55.0),
        away_btts: field(away, "btts", 60.0),
    };

    let corners = CornerMarkets {
        home_over85: field(home, "corners_over85", 68.0),
        home_over95: field(home, "corners_over95", 60.0),
        away_over85: field(away, "corners_over85", 62.0),
        away_over95: field(away, "corners_over95", 55.0),
    };

    let shots = SideTotals {
        home_for: field(home, "shots_for", 5.0),
        home_against: field(home, "shots_against", 3.0),
        away_for: field(away, "shots_for", 4.0),
        away_against: field(away, "shots_against", 4.0),
    };

    let cards = SideTotals {
        home_for: field(home, "cards_for", 2.0),
        home_against: field(home, "cards_against", 2.0),
        away_for: field(away, "cards_for", 2.0),
        away_against: field(away, "cards_against", 2.0),
    };

    let trigger_corners = field(home, "ht_goals_scored_pct", 0.0) >= HT_TRIGGER_PCT;

    let home_card = team_card(home, "Home team", 1.5);
    let away_card = team_card(away, "Away team", 1.2);
    let recommendation = Recommendation::from_rpg(home_card.rpg, away_card.rpg);

    let prompt = narrative(&home_card, &away_card, &goals, &cards, trigger_corners);

    MatchFeatureSet {
        league: league.to_string(),
        home: home_card,
        away: away_card,
        probabilities,
        goals,
        corners,
        shots,
        cards,
        trigger_corners,
        recommendation,
        recommendation_text: recommendation.text().to_string(),
        prompt,
        h2h_history: Vec::new(),
    }
}

/// Comma-separated recent results, upper-cased, newest five kept.
pub fn parse_form(row: &TeamRecord) -> Vec<String> {
    row.get("form")
        .unwrap_or_default()
        .split(',')
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(|p| p.to_uppercase())
        .take(MAX_FORM_ENTRIES)
        .collect()
}

fn narrative(
    home: &TeamCard,
    away: &TeamCard,
    goals: &GoalMarkets,
    cards: &SideTotals,
    trigger_corners: bool,
) -> String {
    let mut lines = vec![format!(
        "{} comes in with RPG {:.2}, while {} shows RPG {:.2}.",
        home.name, home.rpg, away.name, away.rpg
    )];

    if !home.form.is_empty() {
        lines.push(format!(
            "Playing at home, {} arrives in good shape over the last games: {}.",
            home.name,
            home.form.join("-")
        ));
    }

    if goals.over25 >= OVER25_TREND_PCT || goals.away_over25 >= OVER25_TREND_PCT {
        lines.push("High scoring trend, with a strong case for Over 2.5 goals.".to_string());
    } else if goals.over15 >= OVER15_TREND_PCT {
        lines.push("Solid case for Over 1.5 goals in the match.".to_string());
    }

    if cards.home_for + cards.away_for >= CARDS_TREND_TOTAL {
        lines.push("Physical matchup, with a good chance of cards.".to_string());
    }

    if trigger_corners {
        lines.push(
            "[TRIGGER] Home side scores >= 70% of its goals before half-time, so expect early pressure. \
             Good spot for home Over 1.5 corners."
                .to_string(),
        );
    }

    lines.join(" ")
}

fn team_card(row: &TeamRecord, default_name: &str, default_rpg: f64) -> TeamCard {
    let name = row
        .non_empty("team")
        .or_else(|| row.non_empty("nome"))
        .unwrap_or(default_name);
    TeamCard {
        name: name.to_string(),
        position: row.non_empty("position").unwrap_or("-").to_string(),
        rpg: field(row, "rpg", default_rpg),
        form: parse_form(row),
        logo_url: row.get("logo_url").unwrap_or_default().to_string(),
    }
}

fn field(row: &TeamRecord, name: &str, default: f64) -> f64 {
    row.number(name).unwrap_or(default)
}
