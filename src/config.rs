use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.sofascore.com/api/v1";
pub const DEFAULT_LEAGUES_DIR: &str = "data/leagues";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_BACKOFF_SECS: u64 = 1;
const DEFAULT_INTERVAL_HOURS: u64 = 48;

/// Everything the pipeline needs from the outside world. Built once by a
/// binary and handed to each component; library code never reads the
/// environment itself.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub leagues_dir: PathBuf,
    pub base_url: String,
    /// Proxy URLs tried in order after the direct attempt.
    pub proxies: Vec<String>,
    pub request_timeout: Duration,
    pub retry_backoff: Duration,
    pub update_interval: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            leagues_dir: PathBuf::from(DEFAULT_LEAGUES_DIR),
            base_url: DEFAULT_BASE_URL.to_string(),
            proxies: Vec::new(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry_backoff: Duration::from_secs(DEFAULT_BACKOFF_SECS),
            update_interval: Duration::from_secs(DEFAULT_INTERVAL_HOURS * 3600),
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let leagues_dir = env_string("LEAGUES_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.leagues_dir);
        let base_url = env_string("SOFASCORE_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);
        let proxies = ["PROXY_PRIMARY", "PROXY_SECONDARY"]
            .iter()
            .filter_map(|key| env_string(key))
            .collect();
        let timeout_secs = env_u64("HTTP_TIMEOUT_SECS")
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .max(1);
        let backoff_secs = env_u64("RETRY_BACKOFF_SECS").unwrap_or(DEFAULT_BACKOFF_SECS);
        let interval_hours = env_u64("UPDATE_INTERVAL_HOURS")
            .unwrap_or(DEFAULT_INTERVAL_HOURS)
            .max(1);

        Self {
            leagues_dir,
            base_url,
            proxies,
            request_timeout: Duration::from_secs(timeout_secs),
            retry_backoff: Duration::from_secs(backoff_secs),
            update_interval: Duration::from_secs(interval_hours * 3600),
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_u64(key: &str) -> Option<u64> {
    env_string(key).and_then(|v| v.parse::<u64>().ok())
}
