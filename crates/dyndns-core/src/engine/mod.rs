//! DNS reconciler
//!
//! The Reconciler is responsible for:
//! - Resolving the current public IP (with retries)
//! - Locating the tracked "A" record at the provider
//! - Updating the record and refreshing the zone when the IP drifted
//! - Recording every outcome in [`RunMetrics`]
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  IpSource   │──── retry ────┐
//! └─────────────┘               │
//!                               ▼
//!                      ┌──────────────┐
//!                      │  Reconciler  │
//!                      └──────────────┘
//!                               │
//!               ┌───────────────┴───────────────┐
//!               ▼                               ▼
//!      ┌──────────────┐                ┌──────────────┐
//!      │ DnsProvider  │                │  RunMetrics  │
//!      │ list / get / │                │  (counters)  │
//!      │ put / refresh│                └──────────────┘
//!      └──────────────┘
//! ```
//!
//! ## Run Flow
//!
//! 1. Resolve the IP; failure counts as a failed check
//! 2. List matching records; none counts as a failed check (never created)
//! 3. Several matches: the first one is used and a warning is logged
//! 4. Fetch the record; failure counts as a failed check
//! 5. Same target: nothing to do
//! 6. Update the target; failure counts as a failed update
//! 7. Refresh the zone; failure counts as a failed update even though the
//!    record itself was written

use crate::config::{DyndnsConfig, RecordConfig};
use crate::error::Result;
use crate::metrics::RunMetrics;
use crate::retry::{RetryPolicy, resolve_with_retry};
use crate::traits::{DnsProvider, IpSource, RECORD_TYPE_A};
use chrono::Utc;
use tracing::{debug, error, info, warn};

/// Result of one reconcile run
///
/// Every variant has already been accounted for in [`RunMetrics`] by the time
/// it is returned; callers only use it for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The record already pointed at the current IP
    Unchanged {
        ip: String,
    },

    /// The record was updated and the zone refreshed
    Updated {
        record_id: u64,
        previous_ip: String,
        new_ip: String,
    },

    /// The run stopped before any mutation was attempted
    CheckFailed {
        reason: String,
    },

    /// The update or the zone refresh failed
    UpdateFailed {
        record_id: u64,
        reason: String,
    },

    /// The run panicked and was stopped at the scheduler boundary
    Faulted {
        message: String,
    },
}

/// Core reconciler
///
/// Holds the collaborators and the tracked record. It owns no state between
/// runs; all accounting goes to the metrics passed into [`Reconciler::reconcile`].
pub struct Reconciler {
    /// IP source for the public address
    ip_source: Box<dyn IpSource>,

    /// DNS provider for record lookups and updates
    provider: Box<dyn DnsProvider>,

    /// The tracked record
    record: RecordConfig,

    /// Retry policy for IP resolution
    retry: RetryPolicy,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Parameters
    ///
    /// - `ip_source`: IP source implementation
    /// - `provider`: DNS provider implementation
    /// - `config`: Validated configuration
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        config: &DyndnsConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            ip_source,
            provider,
            record: config.record.clone(),
            retry: RetryPolicy::new(config.engine.max_ip_attempts),
        })
    }

    /// Run one detect-and-correct pass
    ///
    /// Never returns an error: each failure is logged, counted and turned into
    /// a [`RunOutcome`].
    pub async fn reconcile(&self, metrics: &mut RunMetrics) -> RunOutcome {
        metrics.record_check(Utc::now());

        let zone = self.record.zone.as_str();
        let fqdn = self.record.fqdn();

        let current_ip = match resolve_with_retry(self.ip_source.as_ref(), self.retry).await {
            Ok(ip) => ip,
            Err(e) => {
                error!("Failed to retrieve public IP after retries: {}", e);
                return check_failed(metrics, e.to_string());
            }
        };

        let record_ids = match self
            .provider
            .list_records(zone, RECORD_TYPE_A, &self.record.subdomain)
            .await
        {
            Ok(ids) => ids,
            Err(e) => {
                error!(provider = self.provider.provider_name(), "Failed to search for record: {}", e);
                return check_failed(metrics, e.to_string());
            }
        };

        let Some(&record_id) = record_ids.first() else {
            warn!(zone, "No 'A' record found for {} in zone {}", fqdn, zone);
            info!(
                tip = true,
                "Please create the 'A' record manually first. Only existing records are \
                 updated; new ones are never created to avoid DNS pollution."
            );
            return check_failed(metrics, format!("no A record for {}", fqdn));
        };

        if record_ids.len() > 1 {
            warn!(
                count = record_ids.len(),
                record_id,
                "Multiple A records found ({}) for {} - updating only the first one (ID: {})",
                record_ids.len(),
                fqdn,
                record_id
            );
        }

        let record = match self.provider.get_record(zone, record_id).await {
            Ok(record) => record,
            Err(e) => {
                error!(record_id, "Failed to read record details: {}", e);
                return check_failed(metrics, e.to_string());
            }
        };

        if record.target == current_ip {
            info!(ip = %current_ip, "No IP change detected (current: {})", current_ip);
            metrics.record_unchanged(&current_ip);
            return RunOutcome::Unchanged { ip: current_ip };
        }

        info!(record_id, "IP change detected: {} → {}", record.target, current_ip);

        if let Err(e) = self
            .provider
            .update_record_target(zone, record_id, &current_ip)
            .await
        {
            error!(record_id, "Update failed: {}", e);
            return update_failed(metrics, record_id, e.to_string());
        }

        debug!(record_id, "Record target written, refreshing zone {}", zone);

        if let Err(e) = self.provider.refresh_zone(zone).await {
            error!(zone, "Zone refresh failed: {}", e);
            return update_failed(metrics, record_id, e.to_string());
        }

        info!(zone, ip = %current_ip, "Zone {} refreshed successfully with IP {}", zone, current_ip);
        metrics.record_update_success(&current_ip, Utc::now());

        RunOutcome::Updated {
            record_id,
            previous_ip: record.target,
            new_ip: current_ip,
        }
    }
}

fn check_failed(metrics: &mut RunMetrics, reason: String) -> RunOutcome {
    metrics.record_check_failure();
    RunOutcome::CheckFailed { reason }
}

fn update_failed(metrics: &mut RunMetrics, record_id: u64, reason: String) -> RunOutcome {
    metrics.record_update_failure();
    RunOutcome::UpdateFailed { record_id, reason }
}
