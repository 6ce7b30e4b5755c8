// # HTTP IP Resolver
//
// This crate provides the public IPv4 resolver for the dynamic DNS updater.
//
// ## Architecture
//
// Queries an ordered, fixed list of plain-text "what is my IP" services and
// returns the first usable answer. A response is usable when:
// - the request completed without a transport error
// - the status is exactly 200
// - the trimmed body is non-empty (the body is the address; it is not parsed)
//
// Every connection is forced onto IPv4, so the answer is the host's public
// IPv4 address even on dual-stack networks.
//
// ## Failure Handling
//
// A failing service is logged at debug level and the next one is tried. When
// all of them fail, only the last failure is surfaced. Retrying the whole list
// is the caller's job (`dyndns_core::retry`).

use async_trait::async_trait;
use dyndns_core::traits::IpSource;
use dyndns_core::{Error, Result};

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use reqwest::StatusCode;

/// Services queried, in order
pub const DEFAULT_IP_PROVIDERS: &[&str] = &[
    "https://api.ipify.org",
    "https://ipv4.icanhazip.com",
    "https://ifconfig.me/ip",
];

/// Total timeout per request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connect timeout per request
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Multi-provider public IPv4 resolver
#[derive(Debug, Clone)]
pub struct HttpIpResolver {
    /// Service URLs, tried in order
    providers: Vec<String>,

    /// IPv4-only HTTP client
    client: reqwest::Client,
}

impl HttpIpResolver {
    /// Create a resolver over [`DEFAULT_IP_PROVIDERS`]
    pub fn new() -> Result<Self> {
        Self::with_providers(DEFAULT_IP_PROVIDERS.iter().map(|url| url.to_string()).collect())
    }

    /// Create a resolver over a custom ordered list of services
    pub fn with_providers(providers: Vec<String>) -> Result<Self> {
        if providers.is_empty() {
            return Err(Error::config("At least one IP provider is required"));
        }

        Ok(Self {
            providers,
            client: ipv4_client()?,
        })
    }

    /// The services this resolver queries, in order
    pub fn providers(&self) -> &[String] {
        &self.providers
    }

    /// Query a single service
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::http(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response: {}", e)))?;

        if status != StatusCode::OK {
            return Err(Error::ip_source(format!("status code {}", status.as_u16())));
        }

        let ip = body.trim();
        if ip.is_empty() {
            return Err(Error::ip_source("empty response"));
        }

        Ok(ip.to_string())
    }
}

/// Build an HTTP client that only ever connects over IPv4
///
/// Binding the local side to the IPv4 wildcard address makes the connector
/// discard every IPv6 address returned by DNS. Idle connections are not kept,
/// so each run opens fresh connections.
fn ipv4_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .local_address(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .pool_max_idle_per_host(0)
        .build()
        .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))
}

#[async_trait]
impl IpSource for HttpIpResolver {
    async fn current(&self) -> Result<String> {
        let mut last_error = None;

        for url in &self.providers {
            match self.fetch(url).await {
                Ok(ip) => return Ok(ip),
                Err(e) => {
                    tracing::debug!(provider = %url, "Provider {} failed: {}", url, e);
                    last_error = Some(e);
                }
            }
        }

        let last_error = last_error.map(|e| e.to_string()).unwrap_or_default();
        Err(Error::all_providers_failed(last_error))
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}
