use std::path::PathBuf;

use anyhow::Result;

use h2h_predictor::config::PipelineConfig;
use h2h_predictor::enrich::RecordEnricher;
use h2h_predictor::remote::RemoteClient;

fn main() -> Result<()> {
    h2h_predictor::load_env_files();
    h2h_predictor::init_logging();

    let mut cfg = PipelineConfig::from_env();
    if let Some(dir) = parse_dir_arg() {
        cfg.leagues_dir = dir;
    }

    let client = RemoteClient::from_config(&cfg)?;
    let enricher = RecordEnricher::new(&client, &cfg.base_url);
    let summary = enricher.sweep(&cfg.leagues_dir)?;

    println!("League update complete");
    println!("Dir: {}", cfg.leagues_dir.display());
    println!(
        "Files: {} updated, {} skipped, {} total",
        summary.files_updated, summary.files_skipped, summary.files_total
    );
    println!("Rows enriched: {}", summary.rows_enriched);
    if !summary.errors.is_empty() {
        println!("Errors: {}", summary.errors.len());
        for err in summary.errors.iter().take(8) {
            println!(" - {err}");
        }
    }
    Ok(())
}

fn parse_dir_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--dir=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--dir" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}
