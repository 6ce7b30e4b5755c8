// # dyndns-core
//
// Core library for the OVH dynamic DNS updater.
//
// ## Architecture Overview
//
// This library keeps a single DNS "A" record pointed at the host's public IPv4:
// - **IpSource**: Trait for discovering the current public IP
// - **DnsProvider**: Trait for reading and mutating records via a provider API
// - **retry**: Bounded exponential backoff around an IpSource
// - **Reconciler**: Compares the resolved IP to the record and corrects drift
// - **Scheduler**: Drives the reconciler on an interval and reports metrics
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from HTTP implementations
// 2. **Update, never create**: Only pre-existing records are ever mutated
// 3. **Failure isolation**: No single run, whatever happens in it, stops the next
// 4. **Library-First**: All core functionality can be used as a library

pub mod traits;
pub mod engine;
pub mod scheduler;
pub mod retry;
pub mod metrics;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{IpSource, DnsProvider, DnsRecord};
pub use engine::{Reconciler, RunOutcome};
pub use scheduler::{Scheduler, SchedulerState};
pub use retry::{RetryPolicy, resolve_with_retry};
pub use metrics::RunMetrics;
pub use config::{DyndnsConfig, EngineConfig, OvhEndpoint, ProviderConfig, RecordConfig};
pub use error::{Error, Result};
