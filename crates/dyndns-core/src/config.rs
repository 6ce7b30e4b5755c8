//! Configuration types for the dynamic DNS updater
//!
//! This module defines all configuration structures used throughout the workspace.
//! Configuration is immutable once validated; the daemon builds it exactly once.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default interval between two reconcile runs
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Default interval between two metrics reports
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Default number of IP resolution attempts per run
pub const DEFAULT_MAX_IP_ATTEMPTS: u32 = 3;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DyndnsConfig {
    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// The record to keep up to date
    pub record: RecordConfig,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl DyndnsConfig {
    /// Create a configuration with default engine settings
    pub fn new(provider: ProviderConfig, record: RecordConfig) -> Self {
        Self {
            provider,
            record,
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.provider.validate()?;
        self.record.validate()?;
        self.engine.validate()?;

        Ok(())
    }
}

/// Regional OVH API endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OvhEndpoint {
    /// Europe
    #[default]
    #[serde(rename = "ovh-eu")]
    OvhEu,
    /// United States
    #[serde(rename = "ovh-us")]
    OvhUs,
    /// Canada
    #[serde(rename = "ovh-ca")]
    OvhCa,
}

impl OvhEndpoint {
    /// The selector name, as accepted by [`FromStr`]
    pub fn as_str(&self) -> &'static str {
        match self {
            OvhEndpoint::OvhEu => "ovh-eu",
            OvhEndpoint::OvhUs => "ovh-us",
            OvhEndpoint::OvhCa => "ovh-ca",
        }
    }

    /// Base URL of the v1 API for this region (no trailing slash)
    pub fn api_base(&self) -> &'static str {
        match self {
            OvhEndpoint::OvhEu => "https://eu.api.ovh.com/1.0",
            OvhEndpoint::OvhUs => "https://api.us.ovhcloud.com/1.0",
            OvhEndpoint::OvhCa => "https://ca.api.ovh.com/1.0",
        }
    }
}

impl fmt::Display for OvhEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OvhEndpoint {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ovh-eu" => Ok(OvhEndpoint::OvhEu),
            "ovh-us" => Ok(OvhEndpoint::OvhUs),
            "ovh-ca" => Ok(OvhEndpoint::OvhCa),
            other => Err(crate::Error::config(format!(
                "Invalid OVH endpoint '{}'. Valid options are 'ovh-eu', 'ovh-us', 'ovh-ca'",
                other
            ))),
        }
    }
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// OVH API v1
    Ovh {
        /// Regional endpoint
        #[serde(default)]
        endpoint: OvhEndpoint,
        /// Application key
        application_key: String,
        /// Application secret
        application_secret: String,
        /// Consumer key
        consumer_key: String,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Ovh {
                application_key,
                application_secret,
                consumer_key,
                ..
            } => {
                if application_key.is_empty() {
                    return Err(crate::Error::config("OVH application key cannot be empty"));
                }
                if application_secret.is_empty() {
                    return Err(crate::Error::config(
                        "OVH application secret cannot be empty",
                    ));
                }
                if consumer_key.is_empty() {
                    return Err(crate::Error::config("OVH consumer key cannot be empty"));
                }
                Ok(())
            }
        }
    }
}

// Secrets stay out of Debug output
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderConfig::Ovh {
                endpoint,
                application_key,
                ..
            } => f
                .debug_struct("Ovh")
                .field("endpoint", endpoint)
                .field("application_key", application_key)
                .field("application_secret", &"<REDACTED>")
                .field("consumer_key", &"<REDACTED>")
                .finish(),
        }
    }
}

/// The tracked DNS record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordConfig {
    /// Zone name (e.g. "example.com")
    pub zone: String,

    /// Subdomain label; empty means the zone apex
    #[serde(default)]
    pub subdomain: String,
}

impl RecordConfig {
    /// Create a new record configuration
    pub fn new(zone: impl Into<String>, subdomain: impl Into<String>) -> Self {
        Self {
            zone: zone.into(),
            subdomain: subdomain.into(),
        }
    }

    /// Fully qualified name of the record, for display
    pub fn fqdn(&self) -> String {
        if self.subdomain.is_empty() {
            self.zone.clone()
        } else {
            format!("{}.{}", self.subdomain, self.zone)
        }
    }

    /// Validate the record configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.zone.is_empty() {
            return Err(crate::Error::config("DNS zone cannot be empty"));
        }
        Ok(())
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Interval between reconcile runs
    #[serde(with = "humantime_serde", default = "default_check_interval")]
    pub check_interval: Duration,

    /// Interval between metrics reports
    #[serde(with = "humantime_serde", default = "default_report_interval")]
    pub report_interval: Duration,

    /// IP resolution attempts per run
    #[serde(default = "default_max_ip_attempts")]
    pub max_ip_attempts: u32,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.check_interval.is_zero() {
            return Err(crate::Error::config("Check interval must be > 0"));
        }
        if self.report_interval.is_zero() {
            return Err(crate::Error::config("Report interval must be > 0"));
        }
        if self.max_ip_attempts == 0 {
            return Err(crate::Error::config("IP resolution attempts must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            check_interval: default_check_interval(),
            report_interval: default_report_interval(),
            max_ip_attempts: default_max_ip_attempts(),
        }
    }
}

fn default_check_interval() -> Duration {
    DEFAULT_CHECK_INTERVAL
}

fn default_report_interval() -> Duration {
    DEFAULT_REPORT_INTERVAL
}

fn default_max_ip_attempts() -> u32 {
    DEFAULT_MAX_IP_ATTEMPTS
}

/// Parse a duration string such as `"10m"`, `"1h"` or `"90s"`
pub fn parse_interval(value: &str) -> Result<Duration, crate::Error> {
    let interval = humantime::parse_duration(value.trim()).map_err(|e| {
        crate::Error::config(format!(
            "Invalid interval '{}': {}. Use a duration such as '10m' or '1h'",
            value, e
        ))
    })?;

    if interval.is_zero() {
        return Err(crate::Error::config(format!(
            "Invalid interval '{}': must be greater than zero",
            value
        )));
    }

    Ok(interval)
}

/// Duration serialization using humantime format.
mod humantime_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ovh_provider() -> ProviderConfig {
        ProviderConfig::Ovh {
            endpoint: OvhEndpoint::OvhEu,
            application_key: "app-key".to_string(),
            application_secret: "app-secret".to_string(),
            consumer_key: "consumer-key".to_string(),
        }
    }

    #[test]
    fn test_endpoint_selector_parsing() {
        assert_eq!("ovh-eu".parse::<OvhEndpoint>().unwrap(), OvhEndpoint::OvhEu);
        assert_eq!("ovh-us".parse::<OvhEndpoint>().unwrap(), OvhEndpoint::OvhUs);
        assert_eq!("ovh-ca".parse::<OvhEndpoint>().unwrap(), OvhEndpoint::OvhCa);

        let err = "ovh-asia".parse::<OvhEndpoint>().unwrap_err();
        assert!(err.to_string().contains("ovh-asia"));
    }

    #[test]
    fn test_endpoint_api_base() {
        assert_eq!(OvhEndpoint::OvhEu.api_base(), "https://eu.api.ovh.com/1.0");
        assert_eq!(OvhEndpoint::default(), OvhEndpoint::OvhEu);
    }

    #[test]
    fn test_fqdn() {
        assert_eq!(RecordConfig::new("example.com", "home").fqdn(), "home.example.com");
        assert_eq!(RecordConfig::new("example.com", "").fqdn(), "example.com");
    }

    #[test]
    fn test_validate_rejects_missing_values() {
        let config = DyndnsConfig::new(ovh_provider(), RecordConfig::new("example.com", ""));
        assert!(config.validate().is_ok());

        let no_zone = DyndnsConfig::new(ovh_provider(), RecordConfig::new("", "home"));
        assert!(no_zone.validate().is_err());

        let no_secret = DyndnsConfig::new(
            ProviderConfig::Ovh {
                endpoint: OvhEndpoint::OvhCa,
                application_key: "app-key".to_string(),
                application_secret: String::new(),
                consumer_key: "consumer-key".to_string(),
            },
            RecordConfig::new("example.com", ""),
        );
        assert!(no_secret.validate().is_err());

        let mut zero_interval = config.clone();
        zero_interval.engine.check_interval = Duration::ZERO;
        assert!(zero_interval.validate().is_err());
    }

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("10m").unwrap(), Duration::from_secs(600));
        assert_eq!(parse_interval("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_interval(" 90s ").unwrap(), Duration::from_secs(90));
        assert!(parse_interval("ten minutes").is_err());
        assert!(parse_interval("0s").is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug = format!("{:?}", ovh_provider());
        assert!(debug.contains("app-key"));
        assert!(!debug.contains("app-secret"));
        assert!(!debug.contains("consumer-key"));
    }

    #[test]
    fn test_engine_config_deserializes_humantime() {
        let engine: EngineConfig =
            serde_json::from_str(r#"{"check_interval":"2m"}"#).unwrap();
        assert_eq!(engine.check_interval, Duration::from_secs(120));
        assert_eq!(engine.report_interval, DEFAULT_REPORT_INTERVAL);
        assert_eq!(engine.max_ip_attempts, 3);
    }
}
