// # IP Source Trait
//
// Defines the interface for discovering the host's current public IP address.
//
// ## Implementations
//
// - HTTP "what is my IP" services: `dyndns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use dyndns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//
//     let current_ip = source.current().await?;
//     println!("public IP: {}", current_ip);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Trait for IP source implementations
///
/// A source answers one question per call: what is the public address right now.
/// The address is returned as the provider reported it (trimmed); it is compared
/// verbatim with the DNS record target, so no further parsing is required.
///
/// # Trust Level: Semi-Trusted
///
/// ## Allowed Capabilities
/// - ✅ Perform outbound HTTP requests to the services it is configured with
/// - ✅ Fall back between its own services within a single call
///
/// ## Forbidden Capabilities
/// - ❌ Retry or sleep between calls (owned by [`crate::retry`])
/// - ❌ Cache an address across calls (every run must observe a fresh address)
/// - ❌ Touch DNS records (use `DnsProvider`)
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current public IP address
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The address, non-empty and trimmed
    /// - `Err(Error)`: If no address could be determined
    async fn current(&self) -> Result<String, crate::Error>;

    /// Name of the source (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
