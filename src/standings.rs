use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, info};

use crate::normalize::normalize_name;
use crate::remote::JsonSource;

/// Normalized team name -> provider team id, for one (competition, season).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandingsIndex {
    teams: HashMap<String, u64>,
}

impl StandingsIndex {
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    /// Looks up a raw team name; normalization happens here.
    pub fn team_id(&self, name: &str) -> Option<u64> {
        self.teams.get(&normalize_name(name)).copied()
    }

    fn insert(&mut self, name: &str, id: u64) {
        // Later rows overwrite earlier ones that normalize to the same key.
        self.teams.insert(normalize_name(name), id);
    }
}

pub fn standings_url(base_url: &str, competition_id: u64, season_id: u64) -> String {
    format!("{base_url}/unique-tournament/{competition_id}/season/{season_id}/standings/total")
}

/// Fetches and indexes the standings table. A provider failure yields an
/// empty index; callers read that as "nothing to enrich".
pub fn resolve_standings(
    source: &dyn JsonSource,
    base_url: &str,
    competition_id: u64,
    season_id: u64,
) -> StandingsIndex {
    let url = standings_url(base_url, competition_id, season_id);
    let Ok(payload) = source.get_json(&url) else {
        return StandingsIndex::default();
    };
    let index = parse_standings(&payload);
    info!(
        competition_id,
        season_id,
        teams = index.len(),
        "standings resolved"
    );
    index
}

/// Accepts either `standings`/`standingsTable` as a list of groups, or as an
/// object holding the groups under `tables`.
pub fn parse_standings(payload: &Value) -> StandingsIndex {
    let mut index = StandingsIndex::default();

    let standings = ["standings", "standingsTable"]
        .iter()
        .filter_map(|key| payload.get(*key))
        .find(|v| is_truthy(v));
    let groups = match standings {
        Some(Value::Array(groups)) => groups.as_slice(),
        Some(obj @ Value::Object(_)) => obj
            .get("tables")
            .and_then(|t| t.as_array())
            .map(|t| t.as_slice())
            .unwrap_or_default(),
        _ => &[],
    };

    for group in groups {
        let Some(rows) = group.get("rows").and_then(|r| r.as_array()) else {
            continue;
        };
        for row in rows {
            let Some(team) = row.get("team") else {
                continue;
            };
            let id = team.get("id").and_then(json_id);
            let name = team
                .get("name")
                .and_then(|n| n.as_str())
                .filter(|n| !n.is_empty());
            match (id, name) {
                (Some(id), Some(name)) => index.insert(name, id),
                _ => debug!(?team, "standings row without usable id/name"),
            }
        }
    }
    index
}

fn json_id(v: &Value) -> Option<u64> {
    let id = match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    (id != 0).then_some(id)
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        _ => true,
    }
}
