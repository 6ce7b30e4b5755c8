//! Bounded exponential backoff around an [`IpSource`]
//!
//! The resolver is tried up to `max_attempts` times. Between two failed
//! attempts the task sleeps `2^attempt` seconds (1s, 2s, 4s, ...), with no
//! jitter and no cap. There is no sleep after the final attempt.

use crate::error::{Error, Result};
use crate::traits::IpSource;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry policy for IP resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
}

impl RetryPolicy {
    /// Create a policy with the given number of attempts
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    /// Delay to wait after the failed attempt with the given zero-based index
    pub fn delay_after(&self, attempt: u32) -> Duration {
        Duration::from_secs(2u64.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_IP_ATTEMPTS)
    }
}

/// Resolve the current IP, retrying with exponential backoff
///
/// # Returns
///
/// - `Ok(String)`: The first successful answer
/// - `Err(Error::AllAttemptsFailed)`: Wrapping the error of the final attempt
pub async fn resolve_with_retry(source: &dyn IpSource, policy: RetryPolicy) -> Result<String> {
    let mut last_error = None;

    for attempt in 0..policy.max_attempts {
        match source.current().await {
            Ok(ip) => {
                debug!(source = source.source_name(), attempt = attempt + 1, "Resolved public IP {}", ip);
                return Ok(ip);
            }
            Err(e) => {
                if attempt + 1 < policy.max_attempts {
                    let wait = policy.delay_after(attempt);
                    warn!(
                        "IP fetch attempt {}/{} failed: {} - retrying in {:?}",
                        attempt + 1,
                        policy.max_attempts,
                        e,
                        wait
                    );
                    tokio::time::sleep(wait).await;
                }
                last_error = Some(e);
            }
        }
    }

    let error = last_error.unwrap_or_else(|| Error::ip_source("no attempts were made"));
    Err(Error::all_attempts_failed(policy.max_attempts, error))
}
