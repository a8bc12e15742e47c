use serde_json::{Map, Value};
use tracing::warn;

use crate::dataset::{TeamRecord, format_decimal};
use crate::remote::JsonSource;

pub const TEAM_ID_FIELD: &str = "sofascore_team_id";
pub const SEASON_ID_FIELD: &str = "sofascore_season_id";
pub const LEAGUE_ID_FIELD: &str = "sofascore_league_id";
const TEAM_ID_FALLBACK_FIELD: &str = "team_id";
const SEASON_ID_FALLBACK_FIELD: &str = "season_id";

const STATS_CONTAINER_KEYS: &[&str] = &["statistics", "teamStatistics", "data"];
const TOTAL_KEYS: &[&str] = &["total", "goals", "value"];
const MATCHES_KEYS: &[&str] = &["matches", "appearances", "played"];
const FIRST_HALF_KEYS: &[&str] = &["first", "firstHalf"];

static NULL: Value = Value::Null;

/// Columns the aggregator owns, in the order they are appended to a dataset.
pub const DERIVED_FIELDS: &[&str] = &[
    "corners_over85",
    "corners_over95",
    "shots_for",
    "shots_against",
    "cards_for",
    "cards_against",
    "ht_goals_scored_pct",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedStatistics {
    pub corners_over85: f64,
    pub corners_over95: f64,
    pub shots_for: f64,
    /// Carried over from the row; `None` when the cell holds text that is
    /// not a number, which leaves the cell as it was.
    pub shots_against: Option<f64>,
    pub cards_for: f64,
    pub cards_against: Option<f64>,
    pub ht_goals_scored_pct: f64,
}

impl DerivedStatistics {
    /// Field/value pairs in [`DERIVED_FIELDS`] order, rendered for a dataset
    /// cell. Pass-through fields without a number are left out.
    pub fn to_fields(&self) -> Vec<(&'static str, String)> {
        let values = [
            Some(self.corners_over85),
            Some(self.corners_over95),
            Some(self.shots_for),
            self.shots_against,
            Some(self.cards_for),
            self.cards_against,
            Some(self.ht_goals_scored_pct),
        ];
        DERIVED_FIELDS
            .iter()
            .zip(values)
            .filter_map(|(name, value)| value.map(|v| (*name, format_decimal(v))))
            .collect()
    }
}

/// Provider team and season ids carried by a dataset row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowIds {
    pub team_id: u64,
    pub season_id: u64,
}

/// Reads the ids a row needs for a statistics fetch. `None` when either is
/// absent or not a number; the latter is logged.
pub fn row_ids(row: &TeamRecord) -> Option<RowIds> {
    let team = row
        .non_empty(TEAM_ID_FIELD)
        .or_else(|| row.non_empty(TEAM_ID_FALLBACK_FIELD))?;
    let season = row
        .non_empty(SEASON_ID_FIELD)
        .or_else(|| row.non_empty(SEASON_ID_FALLBACK_FIELD))?;
    match (team.trim().parse::<u64>(), season.trim().parse::<u64>()) {
        (Ok(team_id), Ok(season_id)) => Some(RowIds { team_id, season_id }),
        _ => {
            warn!(team_id = team, season_id = season, "invalid ids in dataset row");
            None
        }
    }
}

pub fn team_statistics_url(base_url: &str, ids: RowIds) -> String {
    format!(
        "{base_url}/team/{}/statistics/season/{}",
        ids.team_id, ids.season_id
    )
}

/// Fetches and aggregates season statistics for one row. `None` means there
/// is nothing to merge: missing ids, provider failure or an empty payload.
pub fn fetch_team_statistics(
    source: &dyn JsonSource,
    base_url: &str,
    row: &TeamRecord,
) -> Option<DerivedStatistics> {
    let ids = row_ids(row)?;
    let payload = source.get_json(&team_statistics_url(base_url, ids)).ok()?;
    if payload.as_object().is_none_or(|o| o.is_empty()) {
        return None;
    }
    Some(aggregate(&payload, row))
}

/// Turns a season-statistics payload into the derived feature set.
/// `shots_against`/`cards_against` come from `fallback` untouched.
pub fn aggregate(payload: &Value, fallback: &TeamRecord) -> DerivedStatistics {
    let empty = Map::new();
    let stats = first_present(payload, STATS_CONTAINER_KEYS)
        .and_then(|v| v.as_object())
        .unwrap_or(&empty);
    let overall = stats
        .get("overall")
        .and_then(|v| v.as_object())
        .filter(|o| !o.is_empty())
        .unwrap_or(stats);

    let block = |key: &str| overall.get(key).unwrap_or(&NULL);

    let avg_corners = per_match_average(block("corners"));
    let avg_shots =
        per_match_average(block("shotsOnTarget")) + per_match_average(block("shotsOffTarget"));
    let avg_cards =
        per_match_average(block("yellowCards")) + per_match_average(block("redCards"));

    let goals = block("goalsScored");
    let total_goals = first_present(goals, TOTAL_KEYS)
        .and_then(as_number)
        .unwrap_or(0.0);
    let first_half = goals
        .get("periods")
        .and_then(|p| first_present(p, FIRST_HALF_KEYS))
        .and_then(as_number)
        .unwrap_or(0.0);
    let ht_pct = if total_goals > 0.0 {
        first_half / total_goals * 100.0
    } else {
        0.0
    };

    let (over85, over95) = corner_bands(avg_corners);

    DerivedStatistics {
        corners_over85: round_to(over85, 1),
        corners_over95: round_to(over95, 1),
        shots_for: round_to(avg_shots, 2),
        shots_against: passthrough(fallback, "shots_against"),
        cards_for: round_to(avg_cards, 2),
        cards_against: passthrough(fallback, "cards_against"),
        ht_goals_scored_pct: round_to(ht_pct, 1),
    }
}

/// Blank or missing cells count as 0; unparseable text is kept as-is.
fn passthrough(row: &TeamRecord, field: &str) -> Option<f64> {
    match row.non_empty(field) {
        None => Some(0.0),
        Some(_) => row.number(field),
    }
}

/// Over-8.5 / over-9.5 corner probabilities for an average corners-per-match.
pub fn corner_bands(avg_corners: f64) -> (f64, f64) {
    if avg_corners >= 10.0 {
        (75.0, 65.0)
    } else if avg_corners >= 9.0 {
        (68.0, 58.0)
    } else if avg_corners >= 8.0 {
        (60.0, 50.0)
    } else {
        (50.0, 42.0)
    }
}

/// `total / matches` for a stat block, 0 for anything unusable.
pub fn per_match_average(block: &Value) -> f64 {
    if !block.is_object() {
        return 0.0;
    }
    let total = first_present(block, TOTAL_KEYS).map(as_number);
    let matches = first_present(block, MATCHES_KEYS).map(as_number);
    match (total, matches) {
        (Some(Some(total)), Some(Some(matches))) if matches > 0.0 => total / matches,
        _ => 0.0,
    }
}

/// First key in priority order whose value is present and not null.
pub fn first_present<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find(|v| !v.is_null())
}

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
