//! Test doubles and common utilities for contract tests
//!
//! The doubles keep their state behind `Arc`s, so a clone handed to the
//! reconciler shares call counters with the clone kept by the test.

#![allow(dead_code)]

use dyndns_core::config::{DyndnsConfig, EngineConfig, OvhEndpoint, ProviderConfig, RecordConfig};
use dyndns_core::error::{Error, Result};
use dyndns_core::traits::{DnsProvider, DnsRecord, IpSource};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted answer of [`ScriptedIpSource`]
#[derive(Debug, Clone)]
pub enum Step {
    /// Answer with this address
    Ip(&'static str),
    /// Fail like an exhausted provider list
    Fail,
    /// Panic, simulating an unexpected fault
    Panic,
}

/// An IpSource that plays back a script; the last step repeats forever
#[derive(Clone)]
pub struct ScriptedIpSource {
    script: Arc<Mutex<VecDeque<Step>>>,
    last: Arc<Mutex<Step>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedIpSource {
    pub fn new(steps: Vec<Step>) -> Self {
        let last = steps.last().cloned().unwrap_or(Step::Fail);
        Self {
            script: Arc::new(Mutex::new(steps.into())),
            last: Arc::new(Mutex::new(last)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always answer with `ip`
    pub fn fixed(ip: &'static str) -> Self {
        Self::new(vec![Step::Ip(ip)])
    }

    /// Get the number of times current() was called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for ScriptedIpSource {
    async fn current(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        // Release the locks before acting so a panic cannot poison them
        let step = {
            let mut script = self.script.lock().unwrap();
            script
                .pop_front()
                .unwrap_or_else(|| self.last.lock().unwrap().clone())
        };

        match step {
            Step::Ip(ip) => Ok(ip.to_string()),
            Step::Fail => Err(Error::all_providers_failed("status code 503")),
            Step::Panic => panic!("simulated fault in IP source"),
        }
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// Remote operation of [`MockDnsProvider`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Get,
    Update,
    Refresh,
}

#[derive(Default)]
struct MockState {
    record_ids: Vec<u64>,
    targets: HashMap<u64, String>,
    failing: Vec<Operation>,
    calls: HashMap<Operation, usize>,
    updates: Vec<(u64, String)>,
    refreshes: Vec<String>,
    list_filters: Vec<(String, String, String)>,
}

/// A mock DnsProvider that stores records in memory and tracks calls
#[derive(Clone, Default)]
pub struct MockDnsProvider {
    state: Arc<Mutex<MockState>>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an existing A record; records are listed in insertion order
    pub fn with_record(self, id: u64, target: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.record_ids.push(id);
            state.targets.insert(id, target.to_string());
        }
        self
    }

    /// Make an operation fail with a provider error
    pub fn failing(self, operation: Operation) -> Self {
        self.state.lock().unwrap().failing.push(operation);
        self
    }

    /// Get the number of times an operation was called
    pub fn call_count(&self, operation: Operation) -> usize {
        *self.state.lock().unwrap().calls.get(&operation).unwrap_or(&0)
    }

    /// Successful and failed update calls, in order
    pub fn updates(&self) -> Vec<(u64, String)> {
        self.state.lock().unwrap().updates.clone()
    }

    /// Zones passed to refresh_zone(), in order
    pub fn refreshes(&self) -> Vec<String> {
        self.state.lock().unwrap().refreshes.clone()
    }

    /// (zone, field type, subdomain) filters passed to list_records()
    pub fn list_filters(&self) -> Vec<(String, String, String)> {
        self.state.lock().unwrap().list_filters.clone()
    }

    /// Current target of a stored record
    pub fn target(&self, id: u64) -> Option<String> {
        self.state.lock().unwrap().targets.get(&id).cloned()
    }

    /// Number of records known to the provider
    pub fn record_count(&self) -> usize {
        self.state.lock().unwrap().targets.len()
    }

    fn enter(&self, operation: Operation) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(operation).or_insert(0) += 1;
        if state.failing.contains(&operation) {
            return Err(Error::provider("mock", format!("{:?} failed", operation)));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_records(&self, zone: &str, field_type: &str, subdomain: &str) -> Result<Vec<u64>> {
        self.state.lock().unwrap().list_filters.push((
            zone.to_string(),
            field_type.to_string(),
            subdomain.to_string(),
        ));
        self.enter(Operation::List)?;
        Ok(self.state.lock().unwrap().record_ids.clone())
    }

    async fn get_record(&self, zone: &str, record_id: u64) -> Result<DnsRecord> {
        self.enter(Operation::Get)?;
        let state = self.state.lock().unwrap();
        let target = state
            .targets
            .get(&record_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("record {}", record_id)))?;

        Ok(DnsRecord {
            id: record_id,
            zone: zone.to_string(),
            sub_domain: "home".to_string(),
            field_type: "A".to_string(),
            target,
            ttl: 3600,
        })
    }

    async fn update_record_target(&self, _zone: &str, record_id: u64, target: &str) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .updates
            .push((record_id, target.to_string()));
        self.enter(Operation::Update)?;
        // Only existing records can be updated
        let mut state = self.state.lock().unwrap();
        let stored = state
            .targets
            .get_mut(&record_id)
            .ok_or_else(|| Error::not_found(format!("record {}", record_id)))?;
        *stored = target.to_string();
        Ok(())
    }

    async fn refresh_zone(&self, zone: &str) -> Result<()> {
        self.state.lock().unwrap().refreshes.push(zone.to_string());
        self.enter(Operation::Refresh)
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Helper to create a minimal DyndnsConfig for testing
pub fn minimal_config(zone: &str, subdomain: &str) -> DyndnsConfig {
    DyndnsConfig {
        provider: ProviderConfig::Ovh {
            endpoint: OvhEndpoint::OvhEu,
            application_key: "test-app-key".to_string(),
            application_secret: "test-app-secret".to_string(),
            consumer_key: "test-consumer-key".to_string(),
        },
        record: RecordConfig::new(zone, subdomain),
        engine: EngineConfig {
            check_interval: Duration::from_secs(5 * 60),
            report_interval: Duration::from_secs(60 * 60),
            max_ip_attempts: 3,
        },
    }
}
