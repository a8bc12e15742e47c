use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use tracing::warn;

pub const USER_AGENT_VALUE: &str = "Mozilla/5.0 (H2H Predictor Bot)";
pub const ACCEPT_VALUE: &str = "application/json, text/plain, */*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// One GET attempt, optionally routed through a proxy. Errors are transport
/// failures only; any status code comes back as a response.
pub trait HttpTransport {
    fn get(&self, url: &str, proxy: Option<&str>) -> Result<HttpResponse>;
}

/// Blocking reqwest transport. Clients are built up front, one direct and one
/// per configured proxy, all sharing the same timeout and headers.
///
/// A proxy whose client cannot be built keeps its slot: every attempt through
/// it fails, the other routes are unaffected.
pub struct ReqwestTransport {
    direct: Client,
    proxied: HashMap<String, Result<Client, String>>,
}

impl ReqwestTransport {
    pub fn new(proxies: &[String], timeout: Duration) -> Result<Self> {
        let direct = build_client(None, timeout)?;
        let mut proxied = HashMap::new();
        for proxy in proxies {
            let client = build_client(Some(proxy), timeout).map_err(|err| {
                warn!(proxy = proxy.as_str(), error = %format!("{err:#}"), "proxy route unusable");
                format!("{err:#}")
            });
            proxied.insert(proxy.clone(), client);
        }
        Ok(Self { direct, proxied })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str, proxy: Option<&str>) -> Result<HttpResponse> {
        let client = match proxy {
            None => &self.direct,
            Some(p) => match self.proxied.get(p) {
                Some(Ok(client)) => client,
                Some(Err(err)) => return Err(anyhow!("proxy {p} unusable: {err}")),
                None => return Err(anyhow!("proxy {p} was not configured")),
            },
        };
        let resp = client.get(url).send().context("request failed")?;
        let status = resp.status().as_u16();
        let body = resp.text().context("failed reading body")?;
        Ok(HttpResponse { status, body })
    }
}

fn build_client(proxy: Option<&str>, timeout: Duration) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));

    let mut builder = Client::builder().timeout(timeout).default_headers(headers);
    match proxy {
        Some(url) => {
            let proxy =
                reqwest::Proxy::all(url).with_context(|| format!("invalid proxy url {url}"))?;
            builder = builder.proxy(proxy);
        }
        // The direct route ignores HTTP_PROXY and friends from the environment.
        None => builder = builder.no_proxy(),
    }
    builder.build().context("failed to build http client")
}
