// # dyndnsd - OVH Dynamic DNS Daemon
//
// A thin integration layer. All detection and reconciliation logic lives in
// dyndns-core; this binary only wires the pieces together.
//
// The dyndnsd daemon is responsible for:
// 1. Loading an optional `.env` file and reading the environment
// 2. Validating the configuration and initializing logging
// 3. Building the HTTP IP resolver and the OVH provider client
// 4. Running the scheduler until SIGTERM or SIGINT
//
// ## Configuration
//
// All configuration is done via environment variables (or a `.env` file in
// the working directory):
//
// ### OVH API
// - `OVH_ENDPOINT`: Regional endpoint (ovh-eu, ovh-us, ovh-ca; default ovh-eu)
// - `OVH_APP_KEY`: Application key (required)
// - `OVH_APP_SECRET`: Application secret (required)
// - `OVH_CONSUMER_KEY`: Consumer key (required)
//
// ### Record
// - `DNS_ZONE`: Zone holding the record (required)
// - `DNS_SUBDOMAIN`: Subdomain label; empty or unset means the zone apex
//
// ### Engine
// - `CHECK_INTERVAL`: Time between checks, e.g. `10m`, `1h` (default 5m)
// - `LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export OVH_ENDPOINT=ovh-eu
// export OVH_APP_KEY=your_app_key
// export OVH_APP_SECRET=your_app_secret
// export OVH_CONSUMER_KEY=your_consumer_key
// export DNS_ZONE=example.com
// export DNS_SUBDOMAIN=home
// export CHECK_INTERVAL=10m
//
// dyndnsd
// ```

use anyhow::{Context, Result};
use dyndns_core::config::parse_interval;
use dyndns_core::{
    DyndnsConfig, EngineConfig, OvhEndpoint, ProviderConfig, Reconciler, RecordConfig, Scheduler,
};
use dyndns_ip_http::HttpIpResolver;
use dyndns_provider_ovh::OvhProvider;
use std::env;
use std::future::Future;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DyndnsdExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DyndnsdExitCode> for ExitCode {
    fn from(code: DyndnsdExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Raw settings as read from the environment
///
/// No `Debug` derive: the secret and consumer key must never be printed.
struct Config {
    endpoint: String,
    app_key: String,
    app_secret: String,
    consumer_key: String,
    zone: String,
    subdomain: String,
    check_interval: Option<String>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).unwrap_or_default();

        Self {
            endpoint: value("OVH_ENDPOINT"),
            app_key: value("OVH_APP_KEY"),
            app_secret: value("OVH_APP_SECRET"),
            consumer_key: value("OVH_CONSUMER_KEY"),
            zone: value("DNS_ZONE"),
            subdomain: value("DNS_SUBDOMAIN"),
            check_interval: lookup("CHECK_INTERVAL").filter(|v| !v.trim().is_empty()),
            log_level: lookup("LOG_LEVEL")
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "info".to_string()),
        }
    }

    /// Parse the log level
    fn log_level(&self) -> Result<Level> {
        match self.log_level.as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            other => anyhow::bail!(
                "LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                other
            ),
        }
    }

    /// Validate the settings and build the typed configuration
    fn validate(&self) -> Result<DyndnsConfig> {
        let required = [
            ("OVH_APP_KEY", &self.app_key),
            ("OVH_APP_SECRET", &self.app_secret),
            ("OVH_CONSUMER_KEY", &self.consumer_key),
            ("DNS_ZONE", &self.zone),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(key, _)| *key)
            .collect();
        if !missing.is_empty() {
            anyhow::bail!(
                "Missing required environment variables: {}. \
                Set them in the environment or in a .env file",
                missing.join(", ")
            );
        }

        let endpoint = if self.endpoint.is_empty() {
            OvhEndpoint::default()
        } else {
            self.endpoint.parse::<OvhEndpoint>()?
        };

        let mut engine = EngineConfig::default();
        if let Some(ref interval) = self.check_interval {
            engine.check_interval = parse_interval(interval).context("Invalid CHECK_INTERVAL")?;
        }

        let config = DyndnsConfig {
            provider: ProviderConfig::Ovh {
                endpoint,
                application_key: self.app_key.clone(),
                application_secret: self.app_secret.clone(),
                consumer_key: self.consumer_key.clone(),
            },
            record: RecordConfig::new(self.zone.clone(), self.subdomain.clone()),
            engine,
        };
        config.validate()?;

        Ok(config)
    }
}

fn main() -> ExitCode {
    // A missing .env file is fine; the outcome is logged once tracing is up
    let dotenv = dotenvy::dotenv();

    let config = Config::from_env();

    let log_level = match config.log_level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration validation error: {}", e);
            return DyndnsdExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DyndnsdExitCode::ConfigError.into();
    }

    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => info!("No .env file found, using environment variables only"),
        Err(e) => {
            error!("Failed to load .env file: {}", e);
            return DyndnsdExitCode::ConfigError.into();
        }
    }

    let dyndns_config = match config.validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Configuration validation error: {:#}", e);
            return DyndnsdExitCode::ConfigError.into();
        }
    };

    info!("Starting dyndnsd daemon");
    info!(
        zone = %dyndns_config.record.zone,
        "Tracking {} (zone: {})",
        dyndns_config.record.fqdn(),
        dyndns_config.record.zone
    );
    info!("Check interval: {:?}", dyndns_config.engine.check_interval);
    if let ProviderConfig::Ovh { endpoint, .. } = &dyndns_config.provider {
        info!("OVH endpoint: {} ({})", endpoint, endpoint.api_base());
    }

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DyndnsdExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        let scheduler = match build_scheduler(&dyndns_config) {
            Ok(scheduler) => scheduler,
            Err(e) => {
                error!("Startup error: {:#}", e);
                return DyndnsdExitCode::ConfigError;
            }
        };

        let shutdown = match shutdown_signal() {
            Ok(shutdown) => shutdown,
            Err(e) => {
                error!("Startup error: {:#}", e);
                return DyndnsdExitCode::ConfigError;
            }
        };

        run_daemon(scheduler, shutdown).await;
        DyndnsdExitCode::CleanShutdown
    });

    result.into()
}

/// Build the scheduler and its collaborators
fn build_scheduler(config: &DyndnsConfig) -> Result<Scheduler> {
    let ip_source = HttpIpResolver::new().context("Failed to create IP resolver")?;
    let provider =
        OvhProvider::from_config(&config.provider).context("Failed to create OVH client")?;

    let reconciler = Reconciler::new(Box::new(ip_source), Box::new(provider), config)?;

    Ok(Scheduler::new(reconciler, &config.engine))
}

/// Run the scheduler until the shutdown future resolves
async fn run_daemon<F>(mut scheduler: Scheduler, shutdown: F)
where
    F: Future<Output = ()>,
{
    info!("Daemon initialized successfully");
    scheduler.run_until(shutdown).await;
    info!("Shutting down daemon");
}

/// Install SIGTERM and SIGINT handlers
///
/// Handlers are registered before the first run, so a signal arriving during
/// that run is not lost. The returned future resolves on the first signal.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    let mut sigterm = signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    Ok(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!(signal = name, "Received shutdown signal: {}", name);
    })
}

/// Wait for CTRL-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!(signal = "SIGINT", "Received shutdown signal: SIGINT"),
            Err(e) => error!("Failed to wait for CTRL-C: {}", e),
        }
    })
}
