//! Contract Test: Failure Accounting
//!
//! Constraints verified:
//! - Failures before any mutation count as failed checks
//! - Update failures count as failed updates and skip the refresh
//! - A refresh failure after a successful write still counts as a failed update
//! - IP resolution is retried exactly `max_ip_attempts` times per run
//!
//! If this test fails, the metrics no longer tell operators what happened.

mod common;

use common::*;
use dyndns_core::{Reconciler, RunMetrics, RunOutcome};
use std::time::Duration;
use tokio::time::Instant;

fn reconciler(source: ScriptedIpSource, provider: &MockDnsProvider) -> Reconciler {
    Reconciler::new(
        Box::new(source),
        Box::new(provider.clone()),
        &minimal_config("example.com", "home"),
    )
    .expect("reconciler construction succeeds")
}

#[tokio::test(start_paused = true)]
async fn unresolvable_ip_fails_the_check_after_retries() {
    let source = ScriptedIpSource::new(vec![Step::Fail]);
    let provider = MockDnsProvider::new().with_record(42, "1.2.3.4");
    let reconciler = reconciler(source.clone(), &provider);

    let started = Instant::now();
    let mut metrics = RunMetrics::new();
    let outcome = reconciler.reconcile(&mut metrics).await;

    assert!(
        matches!(&outcome, RunOutcome::CheckFailed { reason } if reason.contains("all 3 attempts failed")),
        "unexpected outcome: {:?}",
        outcome
    );
    assert_eq!(source.call_count(), 3);
    assert_eq!(started.elapsed(), Duration::from_secs(3));
    assert_eq!(provider.call_count(Operation::List), 0);
    assert_eq!(metrics.checks_failed(), 1);
    assert_eq!(metrics.last_ip(), None);
}

#[tokio::test(start_paused = true)]
async fn transient_ip_failure_is_absorbed_by_retry() {
    let source = ScriptedIpSource::new(vec![Step::Fail, Step::Ip("5.6.7.8")]);
    let provider = MockDnsProvider::new().with_record(42, "1.2.3.4");
    let reconciler = reconciler(source.clone(), &provider);

    let mut metrics = RunMetrics::new();
    let outcome = reconciler.reconcile(&mut metrics).await;

    assert!(matches!(outcome, RunOutcome::Updated { .. }));
    assert_eq!(source.call_count(), 2);
    assert_eq!(metrics.checks_failed(), 0);
}

#[tokio::test]
async fn lookup_failure_fails_the_check() {
    let provider = MockDnsProvider::new()
        .with_record(42, "1.2.3.4")
        .failing(Operation::List);
    let reconciler = reconciler(ScriptedIpSource::fixed("5.6.7.8"), &provider);

    let mut metrics = RunMetrics::new();
    let outcome = reconciler.reconcile(&mut metrics).await;

    assert!(matches!(outcome, RunOutcome::CheckFailed { .. }));
    assert_eq!(provider.call_count(Operation::Get), 0);
    assert_eq!(metrics.checks_failed(), 1);
    assert_eq!(metrics.updates_failed(), 0);
}

#[tokio::test]
async fn detail_fetch_failure_fails_the_check() {
    let provider = MockDnsProvider::new()
        .with_record(42, "1.2.3.4")
        .failing(Operation::Get);
    let reconciler = reconciler(ScriptedIpSource::fixed("5.6.7.8"), &provider);

    let mut metrics = RunMetrics::new();
    let outcome = reconciler.reconcile(&mut metrics).await;

    assert!(matches!(outcome, RunOutcome::CheckFailed { .. }));
    assert_eq!(provider.call_count(Operation::Update), 0);
    assert_eq!(metrics.checks_failed(), 1);
}

#[tokio::test]
async fn update_failure_skips_refresh() {
    let provider = MockDnsProvider::new()
        .with_record(42, "1.2.3.4")
        .failing(Operation::Update);
    let reconciler = reconciler(ScriptedIpSource::fixed("5.6.7.8"), &provider);

    let mut metrics = RunMetrics::new();
    let outcome = reconciler.reconcile(&mut metrics).await;

    assert!(matches!(outcome, RunOutcome::UpdateFailed { record_id: 42, .. }));
    assert_eq!(provider.call_count(Operation::Refresh), 0);
    assert_eq!(metrics.updates_failed(), 1);
    assert_eq!(metrics.updates_success(), 0);
    assert_eq!(metrics.checks_failed(), 0);
}

#[tokio::test]
async fn refresh_failure_counts_as_failed_update() {
    let provider = MockDnsProvider::new()
        .with_record(42, "1.2.3.4")
        .failing(Operation::Refresh);
    let reconciler = reconciler(ScriptedIpSource::fixed("5.6.7.8"), &provider);

    let mut metrics = RunMetrics::new();
    let outcome = reconciler.reconcile(&mut metrics).await;

    assert!(matches!(outcome, RunOutcome::UpdateFailed { record_id: 42, .. }));
    // The write went through, but propagation is not guaranteed
    assert_eq!(provider.target(42).as_deref(), Some("5.6.7.8"));
    assert_eq!(metrics.updates_failed(), 1);
    assert_eq!(metrics.updates_success(), 0);
    assert_eq!(metrics.last_update(), None);
    assert_eq!(metrics.last_ip(), None);
}
