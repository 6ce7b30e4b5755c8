//! Error types for the dynamic DNS updater
//!
//! This module defines all error types used throughout the workspace.

use thiserror::Error;

/// Result type alias for dyndns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the dynamic DNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// A single IP source failed
    #[error("IP source error: {0}")]
    IpSource(String),

    /// Every configured IP provider failed; only the last failure is kept
    #[error("all providers failed, last error: {last_error}")]
    AllProvidersFailed {
        /// Rendered error of the last provider tried
        last_error: String,
    },

    /// The retry wrapper ran out of attempts
    #[error("all {attempts} attempts failed: {source}")]
    AllAttemptsFailed {
        /// Number of attempts made
        attempts: u32,
        /// Error of the final attempt
        #[source]
        source: Box<Error>,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed JSON in a provider response
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Record or zone not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create an IP source error
    pub fn ip_source(msg: impl Into<String>) -> Self {
        Self::IpSource(msg.into())
    }

    /// Create an aggregate error from the last provider failure
    pub fn all_providers_failed(last_error: impl std::fmt::Display) -> Self {
        Self::AllProvidersFailed {
            last_error: last_error.to_string(),
        }
    }

    /// Wrap the final error of an exhausted retry loop
    pub fn all_attempts_failed(attempts: u32, source: Error) -> Self {
        Self::AllAttemptsFailed {
            attempts,
            source: Box::new(source),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_providers_failed_carries_last_error() {
        let err = Error::all_providers_failed("status code 503");
        assert_eq!(
            err.to_string(),
            "all providers failed, last error: status code 503"
        );
    }

    #[test]
    fn test_all_attempts_failed_wraps_source() {
        let inner = Error::all_providers_failed("empty response");
        let err = Error::all_attempts_failed(3, inner);

        assert_eq!(
            err.to_string(),
            "all 3 attempts failed: all providers failed, last error: empty response"
        );
        let source = std::error::Error::source(&err).expect("source is kept");
        assert!(source.to_string().contains("empty response"));
    }
}
