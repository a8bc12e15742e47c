use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::http_client::{HttpTransport, ReqwestTransport};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("all {attempts} attempts failed for {url}")]
pub struct RemoteFailure {
    pub url: String,
    pub attempts: usize,
}

/// Anything that can hand back a provider JSON document for a URL.
pub trait JsonSource {
    fn get_json(&self, url: &str) -> Result<Value, RemoteFailure>;
}

pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Direct attempt first, then each proxy in configuration order, with a fixed
/// pause after every failed attempt (the last one included).
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    proxies: Vec<String>,
    backoff: Duration,
}

impl RetryPolicy {
    pub fn new(proxies: Vec<String>, backoff: Duration) -> Self {
        Self { proxies, backoff }
    }

    pub fn max_attempts(&self) -> usize {
        1 + self.proxies.len()
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Route for each attempt: `None` is the direct connection.
    pub fn routes(&self) -> impl Iterator<Item = Option<&str>> {
        std::iter::once(None).chain(self.proxies.iter().map(|p| Some(p.as_str())))
    }
}

pub struct RemoteClient<T, S = ThreadSleeper> {
    transport: T,
    sleeper: S,
    policy: RetryPolicy,
}

impl RemoteClient<ReqwestTransport, ThreadSleeper> {
    pub fn from_config(cfg: &PipelineConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&cfg.proxies, cfg.request_timeout)
            .context("build provider transport")?;
        let policy = RetryPolicy::new(cfg.proxies.clone(), cfg.retry_backoff);
        Ok(Self::new(transport, ThreadSleeper, policy))
    }
}

impl<T: HttpTransport, S: Sleeper> RemoteClient<T, S> {
    pub fn new(transport: T, sleeper: S, policy: RetryPolicy) -> Self {
        Self {
            transport,
            sleeper,
            policy,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Strictly sequential: the first attempt answering HTTP 200 with a JSON
    /// body wins and no further routes are tried.
    pub fn get(&self, url: &str) -> Result<Value, RemoteFailure> {
        let mut attempts = 0usize;
        for route in self.policy.routes() {
            attempts += 1;
            match self.attempt(url, route) {
                Ok(value) => {
                    debug!(url, proxy = route.unwrap_or("direct"), "provider request ok");
                    return Ok(value);
                }
                Err(err) => {
                    warn!(
                        url,
                        proxy = route.unwrap_or("direct"),
                        error = %err,
                        "provider attempt failed"
                    );
                }
            }
            self.sleeper.sleep(self.policy.backoff());
        }

        warn!(url, attempts, "provider unreachable on every route");
        Err(RemoteFailure {
            url: url.to_string(),
            attempts,
        })
    }

    fn attempt(&self, url: &str, route: Option<&str>) -> Result<Value> {
        let resp = self.transport.get(url, route)?;
        if resp.status != 200 {
            return Err(anyhow!("http {}", resp.status));
        }
        serde_json::from_str(&resp.body).context("invalid provider json")
    }
}

impl<T: HttpTransport, S: Sleeper> JsonSource for RemoteClient<T, S> {
    fn get_json(&self, url: &str) -> Result<Value, RemoteFailure> {
        self.get(url)
    }
}
