/// Tokens dropped wherever they appear in a team name: club-type markers,
/// age-group markers and youth labels.
const DROPPED_TOKENS: &[&str] = &[
    "fc", "sc", "ac", "cf", "u19", "u20", "u21", "u23", "junior",
];

/// Youth prefix. "Sub 20 Palmeiras" and "Sub-20 Palmeiras" both collapse to
/// "palmeiras"; the age number right after the prefix goes with it.
const YOUTH_PREFIX: &str = "sub";

/// Header substrings that identify the team-name column, highest priority first.
const TEAM_COLUMN_CANDIDATES: &[&str] = &[
    "team",
    "teams",
    "nome",
    "name",
    "club",
    "clube",
    "equipe",
    "squad",
    "team_name",
    "club_name",
];

/// Canonical comparison key for a team name.
///
/// Both the dataset loader and the provider-side standings walk go through
/// this function, so names from either source compare equal when they
/// describe the same club.
pub fn normalize_name(name: &str) -> String {
    let lowered = name.to_lowercase().replace('-', " ").replace('.', "");

    let tokens = lowered.split_whitespace().collect::<Vec<_>>();
    let mut kept = Vec::with_capacity(tokens.len());
    let mut idx = 0;
    while idx < tokens.len() {
        let token = tokens[idx];
        idx += 1;
        if token == YOUTH_PREFIX {
            if tokens
                .get(idx)
                .is_some_and(|next| next.chars().all(|c| c.is_ascii_digit()))
            {
                idx += 1;
            }
            continue;
        }
        if DROPPED_TOKENS.contains(&token) {
            continue;
        }
        kept.push(token);
    }
    kept.join(" ")
}

/// Picks the header that most likely holds team names.
///
/// Candidates are scanned in priority order and, for each one, headers in
/// their original order; the first header whose lower-cased text contains the
/// candidate wins. Falls back to the first header, or `None` when there are no
/// headers at all.
pub fn detect_team_column<S: AsRef<str>>(headers: &[S]) -> Option<String> {
    let first = headers.first()?;
    let lowered = headers
        .iter()
        .map(|h| (h.as_ref().to_lowercase(), h.as_ref()))
        .collect::<Vec<_>>();

    for candidate in TEAM_COLUMN_CANDIDATES {
        if let Some((_, original)) = lowered.iter().find(|(lower, _)| lower.contains(candidate)) {
            return Some((*original).to_string());
        }
    }
    Some(first.as_ref().to_string())
}
