//! Periodic scheduler
//!
//! Drives the [`Reconciler`] on a fixed interval, prints the metrics summary on
//! a second, slower interval and stops on an external shutdown future.
//!
//! All three triggers are served from one `select!` loop on one task, so at most
//! one of {reconcile, report, shutdown} runs at a time and [`RunMetrics`] has a
//! single writer. Shutdown is only observed between runs; an in-flight run
//! finishes (or times out) first.
//!
//! Both interval cadences start when the immediate startup run has finished,
//! not at process start.
//!
//! Each reconcile is wrapped in an unwind boundary: a panic inside a run is
//! logged, counted as a failed check and swallowed, and the next tick runs
//! as usual.

use crate::config::EngineConfig;
use crate::engine::{Reconciler, RunOutcome};
use crate::metrics::RunMetrics;
use futures_util::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, info, trace};

/// Scheduler lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Waiting for the next trigger
    Idle,
    /// Executing a reconcile run or a metrics report
    Running,
    /// Shut down; no further runs
    Terminated,
}

/// Periodic driver for the reconciler
pub struct Scheduler {
    reconciler: Reconciler,
    metrics: RunMetrics,
    check_interval: Duration,
    report_interval: Duration,
    state: SchedulerState,
    reports: u64,
}

impl Scheduler {
    /// Create a scheduler with fresh metrics
    pub fn new(reconciler: Reconciler, engine: &EngineConfig) -> Self {
        Self {
            reconciler,
            metrics: RunMetrics::new(),
            check_interval: engine.check_interval,
            report_interval: engine.report_interval,
            state: SchedulerState::Idle,
            reports: 0,
        }
    }

    /// Accumulated metrics
    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    /// Number of metrics summaries printed so far
    pub fn reports_emitted(&self) -> u64 {
        self.reports
    }

    /// Current lifecycle state
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Run until `shutdown` resolves
    ///
    /// One reconcile runs immediately, outside the interval cadence. On
    /// shutdown a final metrics report is printed and the state becomes
    /// [`SchedulerState::Terminated`].
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        if self.state == SchedulerState::Terminated {
            debug!("Scheduler already terminated, not starting");
            return;
        }

        info!(
            "Scheduler started (check interval: {:?}, report interval: {:?})",
            self.check_interval, self.report_interval
        );

        self.run_once().await;

        let start = Instant::now();
        let mut check_ticker = interval_at(start + self.check_interval, self.check_interval);
        check_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut report_ticker = interval_at(start + self.report_interval, self.report_interval);
        report_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Shutdown signal received, exiting.");
                    self.report();
                    self.transition(SchedulerState::Terminated);
                    break;
                }

                _ = check_ticker.tick() => {
                    self.run_once().await;
                }

                _ = report_ticker.tick() => {
                    self.report();
                }
            }
        }
    }

    /// Execute a single reconcile inside the failure-isolation boundary
    pub async fn run_once(&mut self) -> RunOutcome {
        self.transition(SchedulerState::Running);

        let result = AssertUnwindSafe(self.reconciler.reconcile(&mut self.metrics))
            .catch_unwind()
            .await;
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(severity = "critical", "Recovered panic: {}", message);
                self.metrics.record_check_failure();
                RunOutcome::Faulted { message }
            }
        };

        debug!(?outcome, "Reconcile run finished");
        self.transition(SchedulerState::Idle);
        outcome
    }

    /// Print the metrics summary
    pub fn report(&mut self) {
        self.transition(SchedulerState::Running);
        self.metrics.report();
        self.reports += 1;
        self.transition(SchedulerState::Idle);
    }

    fn transition(&mut self, next: SchedulerState) {
        trace!("Scheduler state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_variants() {
        let static_str: Box<dyn Any + Send> = Box::new("static boom");
        assert_eq!(panic_message(static_str.as_ref()), "static boom");

        let owned: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
        assert_eq!(panic_message(owned.as_ref()), "owned boom");

        let other: Box<dyn Any + Send> = Box::new(42_u32);
        assert_eq!(panic_message(other.as_ref()), "unknown panic payload");
    }
}
