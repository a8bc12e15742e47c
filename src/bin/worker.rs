use anyhow::Result;

use h2h_predictor::config::PipelineConfig;
use h2h_predictor::enrich::RecordEnricher;
use h2h_predictor::remote::{RemoteClient, ThreadSleeper};
use h2h_predictor::scheduler::run_periodic;

fn main() -> Result<()> {
    h2h_predictor::load_env_files();
    h2h_predictor::init_logging();

    let cfg = PipelineConfig::from_env();
    let client = RemoteClient::from_config(&cfg)?;
    let enricher = RecordEnricher::new(&client, &cfg.base_url);

    run_periodic(cfg.update_interval, &ThreadSleeper, None, || {
        enricher.sweep(&cfg.leagues_dir).map(|_| ())
    });
    Ok(())
}
