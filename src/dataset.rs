use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::normalize::normalize_name;

const DELIMITER: u8 = b';';
const DATASET_EXT: &str = "csv";

/// One team's row: column name -> raw cell text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamRecord {
    fields: HashMap<String, String>,
}

impl TeamRecord {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(|s| s.as_str())
    }

    /// Cell text, treating blank cells like missing ones.
    pub fn non_empty(&self, field: &str) -> Option<&str> {
        self.get(field).filter(|v| !v.trim().is_empty())
    }

    /// Cell parsed as a number; `None` when missing, blank or not numeric.
    pub fn number(&self, field: &str) -> Option<f64> {
        self.non_empty(field)?
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
    }

    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        self.fields.insert(field.to_string(), value.into());
    }
}

/// A semicolon-delimited league file held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<TeamRecord>,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(DELIMITER)
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("open dataset {}", path.display()))?;

        let headers = reader
            .headers()
            .with_context(|| format!("read header of {}", path.display()))?
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.with_context(|| format!("read row of {}", path.display()))?;
            rows.push(TeamRecord::from_pairs(
                headers.iter().cloned().zip(record.iter().map(|c| c.to_string())),
            ));
        }
        Ok(Self { headers, rows })
    }

    /// Writes header and rows to a sibling temp file, then swaps it in.
    pub fn save(&self, path: &Path) -> Result<()> {
        let tmp = path.with_extension("csv.tmp");
        {
            let mut writer = csv::WriterBuilder::new()
                .delimiter(DELIMITER)
                .from_path(&tmp)
                .with_context(|| format!("create {}", tmp.display()))?;
            writer
                .write_record(&self.headers)
                .context("write dataset header")?;
            for row in &self.rows {
                writer
                    .write_record(self.headers.iter().map(|h| row.get(h).unwrap_or("")))
                    .context("write dataset row")?;
            }
            writer.flush().context("flush dataset")?;
        }
        fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
        Ok(())
    }

    /// Appends missing columns after the existing ones.
    pub fn ensure_columns(&mut self, columns: &[&str]) {
        for col in columns {
            if !self.headers.iter().any(|h| h == col) {
                self.headers.push((*col).to_string());
            }
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }
}

/// First row whose team cell normalizes to the same key as `team_name`.
pub fn find_team_row<'a>(
    rows: &'a [TeamRecord],
    team_column: &str,
    team_name: &str,
) -> Option<&'a TeamRecord> {
    let target = normalize_name(team_name);
    rows.iter()
        .find(|row| normalize_name(row.get(team_column).unwrap_or_default()) == target)
}

pub fn slugify_league(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace([' ', '/', '-'], "_")
}

pub fn league_path(leagues_dir: &Path, league_name: &str) -> PathBuf {
    leagues_dir.join(format!("{}.{DATASET_EXT}", slugify_league(league_name)))
}

/// Every `.csv` file in the leagues directory, sorted by file name.
pub fn league_files(leagues_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(leagues_dir)
        .with_context(|| format!("list {}", leagues_dir.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.context("read leagues dir entry")?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == DATASET_EXT) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub fn list_leagues(leagues_dir: &Path) -> Result<Vec<String>> {
    Ok(league_files(leagues_dir)?
        .iter()
        .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(|s| s.to_string()))
        .collect())
}

/// Copies an uploaded league file into place under its slug.
pub fn import_league(leagues_dir: &Path, league_name: &str, source: &Path) -> Result<PathBuf> {
    fs::create_dir_all(leagues_dir)
        .with_context(|| format!("create {}", leagues_dir.display()))?;
    let dest = league_path(leagues_dir, league_name);
    fs::copy(source, &dest)
        .with_context(|| format!("copy {} to {}", source.display(), dest.display()))?;
    Ok(dest)
}

/// Decimal text matching what the upstream files already contain:
/// whole numbers keep one decimal place (`75.0`), others print in full.
pub fn format_decimal(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
