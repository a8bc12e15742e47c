use std::path::Path;

use anyhow::{Context, Result, anyhow};

use h2h_predictor::config::PipelineConfig;
use h2h_predictor::dataset;
use h2h_predictor::match_builder::{AnalysisError, analyze_league_match};

const USAGE: &str = "usage:
  h2h_predictor analyze --league <name> --home <team> --away <team>
  h2h_predictor import --league <name> --file <path>
  h2h_predictor leagues";

fn main() -> Result<()> {
    h2h_predictor::load_env_files();
    h2h_predictor::init_logging();

    let cfg = PipelineConfig::from_env();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let Some(command) = args.first() else {
        println!("{USAGE}");
        return Ok(());
    };
    let rest = &args[1..];

    match command.as_str() {
        "analyze" => {
            let league = required_arg(rest, "league")?;
            let home = required_arg(rest, "home")?;
            let away = required_arg(rest, "away")?;
            match analyze_league_match(&cfg.leagues_dir, &league, &home, &away) {
                Ok(features) => {
                    let json = serde_json::to_string_pretty(&features)
                        .context("serialize match analysis")?;
                    println!("{json}");
                    Ok(())
                }
                Err(AnalysisError::LeagueNotFound { league }) => {
                    eprintln!("No dataset found for league '{league}'. Check the name or import it first.");
                    std::process::exit(2);
                }
                Err(AnalysisError::TeamNotFound { league, team }) => {
                    eprintln!("Team '{team}' is not present in the '{league}' dataset.");
                    std::process::exit(3);
                }
                Err(AnalysisError::Dataset(err)) => Err(err),
            }
        }
        "import" => {
            let league = required_arg(rest, "league")?;
            let file = required_arg(rest, "file")?;
            let dest = dataset::import_league(&cfg.leagues_dir, &league, Path::new(&file))?;
            println!("League '{league}' imported to {}", dest.display());
            Ok(())
        }
        "leagues" => {
            for league in dataset::list_leagues(&cfg.leagues_dir)? {
                println!("{league}");
            }
            Ok(())
        }
        other => Err(anyhow!("unknown command {other}\n{USAGE}")),
    }
}

fn required_arg(args: &[String], name: &str) -> Result<String> {
    arg_value(args, name).ok_or_else(|| anyhow!("missing --{name}\n{USAGE}"))
}

fn arg_value(args: &[String], name: &str) -> Option<String> {
    let flag = format!("--{name}");
    let prefix = format!("--{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if *arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
