//! Process-wide run metrics
//!
//! A single [`RunMetrics`] value is created at startup and owned by the
//! [`Scheduler`](crate::Scheduler). Runs receive it by `&mut` reference, so
//! there is exactly one writer and no locking. Nothing is persisted; counters
//! reset only on restart.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::info;

/// Counters and timestamps accumulated across reconcile runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunMetrics {
    last_check: Option<DateTime<Utc>>,
    last_update: Option<DateTime<Utc>>,
    last_ip: Option<String>,
    updates_success: u64,
    updates_failed: u64,
    checks_failed: u64,
}

impl RunMetrics {
    /// Create empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// A run started
    pub fn record_check(&mut self, at: DateTime<Utc>) {
        self.last_check = Some(at);
    }

    /// The record already pointed at `ip`
    pub fn record_unchanged(&mut self, ip: &str) {
        self.last_ip = Some(ip.to_string());
    }

    /// The record was updated to `ip` and the zone refreshed
    pub fn record_update_success(&mut self, ip: &str, at: DateTime<Utc>) {
        self.updates_success += 1;
        self.last_update = Some(at);
        self.last_ip = Some(ip.to_string());
    }

    /// The update or the zone refresh failed
    pub fn record_update_failure(&mut self) {
        self.updates_failed += 1;
    }

    /// The run was aborted before any mutation, or faulted
    pub fn record_check_failure(&mut self) {
        self.checks_failed += 1;
    }

    pub fn last_check(&self) -> Option<DateTime<Utc>> {
        self.last_check
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    pub fn last_ip(&self) -> Option<&str> {
        self.last_ip.as_deref()
    }

    pub fn updates_success(&self) -> u64 {
        self.updates_success
    }

    pub fn updates_failed(&self) -> u64 {
        self.updates_failed
    }

    pub fn checks_failed(&self) -> u64 {
        self.checks_failed
    }

    /// Emit the summary as structured log records
    pub fn report(&self) {
        info!(
            target: "dyndns::metrics",
            last_check = %format_time(self.last_check),
            last_ip = self.last_ip().unwrap_or("unknown"),
            last_update = %format_time(self.last_update),
            "Last check: {} | Last IP: {} | Last update: {}",
            format_time(self.last_check),
            self.last_ip().unwrap_or("unknown"),
            format_time(self.last_update),
        );
        info!(
            target: "dyndns::metrics",
            updates_success = self.updates_success,
            updates_failed = self.updates_failed,
            checks_failed = self.checks_failed,
            "Updates: {} successful, {} failed | Checks failed: {}",
            self.updates_success,
            self.updates_failed,
            self.checks_failed,
        );
    }
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| "never".to_string())
}
