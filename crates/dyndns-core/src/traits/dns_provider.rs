// # DNS Provider Trait
//
// Defines the remote operations the reconciler consumes from a DNS provider.
//
// ## Implementations
//
// - OVH API v1: `dyndns-provider-ovh` crate
//
// ## Usage
//
// ```rust,ignore
// use dyndns_core::DnsProvider;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let ids = provider.list_records("example.com", "A", "home").await?;
//     let record = provider.get_record("example.com", ids[0]).await?;
//     provider.update_record_target("example.com", record.id, "203.0.113.7").await?;
//     provider.refresh_zone("example.com").await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Record type tracked by the updater
pub const RECORD_TYPE_A: &str = "A";

/// Full detail of a DNS record, as returned by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsRecord {
    /// Opaque numeric handle assigned by the provider
    pub id: u64,
    /// Zone the record belongs to
    pub zone: String,
    /// Subdomain label; empty for the zone apex
    #[serde(default)]
    pub sub_domain: String,
    /// Record type (e.g. "A")
    pub field_type: String,
    /// Current record target
    pub target: String,
    /// Time-to-live in seconds
    #[serde(default)]
    pub ttl: u64,
}

/// Trait for DNS provider implementations
///
/// Each method maps to exactly one remote API call.
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to their endpoint only
/// - ✅ Parse provider-specific responses
/// - ✅ Return success or failure (the reconciler decides what it means)
///
/// ## Forbidden Capabilities
/// - ❌ Create records (the updater only ever mutates existing ones)
/// - ❌ Implement retry logic or backoff
/// - ❌ Decide whether an update is needed (owned by `Reconciler`)
/// - ❌ Spawn tasks or threads
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List record identifiers matching a zone, type and subdomain filter
    ///
    /// The order of the returned identifiers is the provider's order and is
    /// preserved; an empty subdomain selects records at the zone apex.
    async fn list_records(
        &self,
        zone: &str,
        field_type: &str,
        subdomain: &str,
    ) -> Result<Vec<u64>, crate::Error>;

    /// Fetch the full detail of a record
    async fn get_record(&self, zone: &str, record_id: u64) -> Result<DnsRecord, crate::Error>;

    /// Point an existing record at a new target
    async fn update_record_target(
        &self,
        zone: &str,
        record_id: u64,
        target: &str,
    ) -> Result<(), crate::Error>;

    /// Ask the provider to propagate pending zone changes
    async fn refresh_zone(&self, zone: &str) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
