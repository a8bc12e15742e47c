pub mod config;
pub mod dataset;
pub mod enrich;
pub mod http_client;
pub mod match_builder;
pub mod normalize;
pub mod remote;
pub mod scheduler;
pub mod standings;
pub mod team_stats;

/// Installs the fmt subscriber used by every binary. `RUST_LOG` overrides the
/// default `info` level for this crate.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("h2h_predictor=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Loads `.env.local` then `.env` from the working directory, if present.
pub fn load_env_files() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}
