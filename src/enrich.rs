use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::dataset::{Dataset, league_files};
use crate::normalize::detect_team_column;
use crate::remote::JsonSource;
use crate::standings::{StandingsIndex, resolve_standings};
use crate::team_stats::{
    DERIVED_FIELDS, LEAGUE_ID_FIELD, SEASON_ID_FIELD, TEAM_ID_FIELD, fetch_team_statistics,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichStats {
    pub rows: usize,
    pub ids_filled: usize,
    pub rows_enriched: usize,
}

#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    /// `None` when the file had no rows and was left alone.
    pub stats: Option<EnrichStats>,
}

#[derive(Debug, Clone, Default)]
pub struct SweepSummary {
    pub files_total: usize,
    pub files_updated: usize,
    pub files_skipped: usize,
    pub rows_enriched: usize,
    pub errors: Vec<String>,
}

/// Fills provider ids and derived statistics into league datasets.
pub struct RecordEnricher<'a> {
    source: &'a dyn JsonSource,
    base_url: &'a str,
}

impl<'a> RecordEnricher<'a> {
    pub fn new(source: &'a dyn JsonSource, base_url: &'a str) -> Self {
        Self { source, base_url }
    }

    /// Enriches every league file in the directory. A failing file is
    /// recorded in the summary and the sweep moves on.
    pub fn sweep(&self, leagues_dir: &Path) -> Result<SweepSummary> {
        let files = league_files(leagues_dir)?;
        info!(dir = %leagues_dir.display(), files = files.len(), "enrichment sweep started");

        let mut summary = SweepSummary {
            files_total: files.len(),
            ..SweepSummary::default()
        };
        for path in files {
            match self.enrich_file(&path) {
                Ok(FileReport {
                    stats: Some(stats), ..
                }) => {
                    summary.files_updated += 1;
                    summary.rows_enriched += stats.rows_enriched;
                }
                Ok(FileReport { stats: None, .. }) => summary.files_skipped += 1,
                Err(err) => {
                    warn!(file = %path.display(), error = %format!("{err:#}"), "dataset update failed");
                    summary.errors.push(format!("{}: {err:#}", path.display()));
                }
            }
        }

        info!(
            updated = summary.files_updated,
            skipped = summary.files_skipped,
            failed = summary.errors.len(),
            "enrichment sweep finished"
        );
        Ok(summary)
    }

    pub fn enrich_file(&self, path: &Path) -> Result<FileReport> {
        info!(file = %path.display(), "updating dataset");
        let mut dataset = Dataset::load(path)?;
        if dataset.rows.is_empty() {
            info!(file = %path.display(), "dataset has no rows, skipping");
            return Ok(FileReport {
                path: path.to_path_buf(),
                stats: None,
            });
        }

        let stats = self.enrich_dataset(&mut dataset);
        dataset
            .save(path)
            .with_context(|| format!("persist {}", path.display()))?;
        info!(
            file = %path.display(),
            rows = stats.rows,
            ids_filled = stats.ids_filled,
            enriched = stats.rows_enriched,
            "dataset updated"
        );
        Ok(FileReport {
            path: path.to_path_buf(),
            stats: Some(stats),
        })
    }

    /// In-memory part of [`Self::enrich_file`]. Existing ids are kept, new
    /// columns go after the original ones, and a row whose fetch fails keeps
    /// whatever values it already had.
    pub fn enrich_dataset(&self, dataset: &mut Dataset) -> EnrichStats {
        let mut stats = EnrichStats {
            rows: dataset.rows.len(),
            ..EnrichStats::default()
        };

        let league_id = dataset_level_value(dataset, LEAGUE_ID_FIELD);
        let season_id = dataset_level_value(dataset, SEASON_ID_FIELD);
        let team_column = detect_team_column(&dataset.headers);

        let index = match (league_id.as_deref(), season_id.as_deref()) {
            (Some(league), Some(season)) => {
                match (league.trim().parse::<u64>(), season.trim().parse::<u64>()) {
                    (Ok(league), Ok(season)) => {
                        resolve_standings(self.source, self.base_url, league, season)
                    }
                    _ => {
                        warn!(league, season, "invalid league/season ids in dataset");
                        StandingsIndex::default()
                    }
                }
            }
            _ => StandingsIndex::default(),
        };

        if let Some(team_column) = team_column.as_deref()
            && !index.is_empty()
        {
            for row in &mut dataset.rows {
                let Some(name) = row.non_empty(team_column).map(|n| n.to_string()) else {
                    continue;
                };
                if row.non_empty(TEAM_ID_FIELD).is_none()
                    && let Some(team_id) = index.team_id(&name)
                {
                    row.set(TEAM_ID_FIELD, team_id.to_string());
                    stats.ids_filled += 1;
                }
                if let Some(season) = season_id.as_deref()
                    && row.non_empty(SEASON_ID_FIELD).is_none()
                {
                    row.set(SEASON_ID_FIELD, season);
                }
            }
        }

        let mut columns = vec![TEAM_ID_FIELD, SEASON_ID_FIELD];
        columns.extend_from_slice(DERIVED_FIELDS);
        dataset.ensure_columns(&columns);

        for row in &mut dataset.rows {
            let Some(derived) = fetch_team_statistics(self.source, self.base_url, row) else {
                continue;
            };
            for (field, value) in derived.to_fields() {
                row.set(field, value);
            }
            stats.rows_enriched += 1;
        }
        stats
    }
}

/// League/season ids are declared once per file, on the first row.
fn dataset_level_value(dataset: &Dataset, column: &str) -> Option<String> {
    if !dataset.has_column(column) {
        return None;
    }
    dataset
        .rows
        .first()
        .and_then(|row| row.non_empty(column))
        .map(|v| v.to_string())
}
