// # OVH DNS Provider
//
// This crate provides the OVH DNS provider implementation for the dynamic DNS
// updater.
//
// ## Scope
//
// - ✅ One HTTP request per trait call (plus a server clock lookup when the
//   offset is unknown)
// - ✅ Full error propagation; the reconciler decides what a failure means
// - ✅ HTTP timeouts (10 seconds total, 5 seconds connect)
// - ✅ Specific error handling for HTTP status codes (401/403, 404, 429, 5xx)
// - ❌ NO record creation (only existing records are updated)
// - ❌ NO retry or backoff logic
// - ❌ NO background tasks
//
// ## Security Requirements
//
// - Application secret and consumer key NEVER appear in logs
// - Credentials are provided via environment variables only
//
// ## API Reference
//
// - OVH API v1: https://api.ovh.com/console/
// - List records:   GET  `/domain/zone/{zone}/record?fieldType=A&subDomain={sub}`
// - Get record:     GET  `/domain/zone/{zone}/record/{id}`
// - Update record:  PUT  `/domain/zone/{zone}/record/{id}`
// - Refresh zone:   POST `/domain/zone/{zone}/refresh`
// - Server time:    GET  `/auth/time`
//
// ## Request Signing
//
// Every authenticated call carries:
//
// ```text
// X-Ovh-Application: <application key>
// X-Ovh-Consumer:    <consumer key>
// X-Ovh-Timestamp:   <server-corrected unix time>
// X-Ovh-Signature:   "$1$" + hex(sha1(secret+consumer+METHOD+url+body+timestamp))
// ```
//
// where the six parts are joined with `+`.

use async_trait::async_trait;
use dyndns_core::config::{OvhEndpoint, ProviderConfig};
use dyndns_core::traits::{DnsProvider, DnsRecord};
use dyndns_core::{Error, Result};
use reqwest::{Method, Url};
use ring::digest::{SHA1_FOR_LEGACY_USE_ONLY, digest};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

/// Default HTTP timeout for API requests
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Connect timeout for API requests
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Provider name used in errors and logs
const PROVIDER_NAME: &str = "ovh";

/// OVH DNS provider
///
/// # Trust Level: Untrusted
///
/// This provider is isolated and single-shot. The only state it keeps is the
/// offset between the local clock and the OVH clock, which OVH requires to
/// sign requests. The offset is dropped whenever OVH rejects a call as
/// unauthenticated, so a corrected local clock is picked up on the next call.
pub struct OvhProvider {
    /// API base URL, without trailing slash
    base_url: String,

    /// Application key (public half of the application credentials)
    application_key: String,

    /// Application secret
    /// ⚠️ NEVER log this value
    application_secret: String,

    /// Consumer key
    /// ⚠️ NEVER log this value
    consumer_key: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Server time minus local time, in seconds; `None` until looked up
    time_delta: Mutex<Option<i64>>,
}

// Custom Debug implementation that hides the credentials
impl std::fmt::Debug for OvhProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OvhProvider")
            .field("base_url", &self.base_url)
            .field("application_key", &self.application_key)
            .field("application_secret", &"<REDACTED>")
            .field("consumer_key", &"<REDACTED>")
            .finish()
    }
}

impl OvhProvider {
    /// Create a provider for a regional endpoint
    pub fn new(
        endpoint: OvhEndpoint,
        application_key: impl Into<String>,
        application_secret: impl Into<String>,
        consumer_key: impl Into<String>,
    ) -> Result<Self> {
        Self::with_base_url(
            endpoint.api_base(),
            application_key,
            application_secret,
            consumer_key,
        )
    }

    /// Create a provider against an explicit API base URL
    pub fn with_base_url(
        base_url: impl Into<String>,
        application_key: impl Into<String>,
        application_secret: impl Into<String>,
        consumer_key: impl Into<String>,
    ) -> Result<Self> {
        let application_key = application_key.into();
        let application_secret = application_secret.into();
        let consumer_key = consumer_key.into();

        if application_key.is_empty() || application_secret.is_empty() || consumer_key.is_empty() {
            return Err(Error::config(
                "OVH application key, application secret and consumer key are required",
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            application_key,
            application_secret,
            consumer_key,
            client,
            time_delta: Mutex::new(None),
        })
    }

    /// Create a provider from configuration
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        match config {
            ProviderConfig::Ovh {
                endpoint,
                application_key,
                application_secret,
                consumer_key,
            } => Self::new(
                *endpoint,
                application_key.clone(),
                application_secret.clone(),
                consumer_key.clone(),
            ),
        }
    }

    fn url(&self, path: &str) -> Result<Url> {
        Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| Error::config(format!("Invalid API URL for {}: {}", path, e)))
    }

    /// Offset between the OVH clock and the local clock
    ///
    /// Looked up with the unauthenticated `GET /auth/time` and kept until
    /// OVH rejects a signed call. A failed lookup is not cached, so the next
    /// call tries again.
    async fn time_delta(&self) -> Result<i64> {
        let mut cached = self.time_delta.lock().await;
        if let Some(delta) = *cached {
            return Ok(delta);
        }

        let url = self.url("/auth/time")?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;
        let response = check_status(response, "Server time lookup").await?;

        let server_time: i64 = parse_json(response).await?;
        let delta = server_time - unix_now();
        tracing::debug!(delta, "OVH clock offset computed");

        *cached = Some(delta);
        Ok(delta)
    }

    /// Send one signed request and check its status
    async fn signed_call(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
        operation: &str,
    ) -> Result<reqwest::Response> {
        let body = body.map(|b| b.to_string()).unwrap_or_default();
        let timestamp = unix_now() + self.time_delta().await?;

        let signature = sign(
            &self.application_secret,
            &self.consumer_key,
            method.as_str(),
            url.as_str(),
            &body,
            timestamp,
        );

        tracing::debug!(method = %method, url = %url, "Calling OVH API");

        let mut request = self
            .client
            .request(method, url)
            .header("X-Ovh-Application", &self.application_key)
            .header("X-Ovh-Consumer", &self.consumer_key)
            .header("X-Ovh-Timestamp", timestamp.to_string())
            .header("X-Ovh-Signature", signature)
            .header("Content-Type", "application/json");

        if !body.is_empty() {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        let result = check_status(response, operation).await;
        if let Err(Error::Authentication(_)) = &result {
            tracing::debug!("{} rejected, OVH clock offset will be looked up again", operation);
            *self.time_delta.lock().await = None;
        }
        result
    }
}

/// Compute the OVH v1 request signature
pub fn sign(
    application_secret: &str,
    consumer_key: &str,
    method: &str,
    url: &str,
    body: &str,
    timestamp: i64,
) -> String {
    let payload = format!(
        "{}+{}+{}+{}+{}+{}",
        application_secret, consumer_key, method, url, body, timestamp
    );
    let hash = digest(&SHA1_FOR_LEGACY_USE_ONLY, payload.as_bytes());
    format!("$1${}", hex::encode(hash.as_ref()))
}

/// Decode a JSON response body
async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let body = response
        .text()
        .await
        .map_err(|e| Error::http(format!("Failed to read response: {}", e)))?;

    Ok(serde_json::from_str(&body)?)
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// Map a non-2xx response to an error
async fn check_status(response: reqwest::Response, operation: &str) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error response".to_string());

    match status.as_u16() {
        401 | 403 => Err(Error::auth(format!(
            "Invalid OVH credentials or insufficient permissions. Status: {} - {}",
            status, error_text
        ))),
        404 => Err(Error::not_found(format!("{}: {}", operation, error_text))),
        429 => Err(Error::rate_limited(format!(
            "Rate limit exceeded. Please retry later. Status: {}",
            status
        ))),
        500..=599 => Err(Error::provider(
            PROVIDER_NAME,
            format!(
                "{} failed: OVH server error (transient): {} - {}",
                operation, status, error_text
            ),
        )),
        _ => Err(Error::provider(
            PROVIDER_NAME,
            format!("{} failed: {} - {}", operation, status, error_text),
        )),
    }
}

#[async_trait]
impl DnsProvider for OvhProvider {
    async fn list_records(&self, zone: &str, field_type: &str, subdomain: &str) -> Result<Vec<u64>> {
        let mut url = self.url(&format!("/domain/zone/{}/record", zone))?;
        url.query_pairs_mut()
            .append_pair("fieldType", field_type)
            .append_pair("subDomain", subdomain);

        let response = self
            .signed_call(Method::GET, url, None, "Record search")
            .await?;

        parse_json(response).await
    }

    async fn get_record(&self, zone: &str, record_id: u64) -> Result<DnsRecord> {
        let url = self.url(&format!("/domain/zone/{}/record/{}", zone, record_id))?;

        let response = self
            .signed_call(Method::GET, url, None, "Record lookup")
            .await?;

        parse_json(response).await
    }

    async fn update_record_target(&self, zone: &str, record_id: u64, target: &str) -> Result<()> {
        let url = self.url(&format!("/domain/zone/{}/record/{}", zone, record_id))?;
        let payload = serde_json::json!({ "target": target });

        self.signed_call(Method::PUT, url, Some(payload), "Record update")
            .await?;

        tracing::debug!(record_id, "DNS record {} in zone {} now targets {}", record_id, zone, target);
        Ok(())
    }

    async fn refresh_zone(&self, zone: &str) -> Result<()> {
        let url = self.url(&format!("/domain/zone/{}/refresh", zone))?;

        self.signed_call(Method::POST, url, None, "Zone refresh")
            .await?;

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
