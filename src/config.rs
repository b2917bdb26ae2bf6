//! # Configuration Management
//!
//! Centralized configuration for session caching.
//!
//! This module provides default capacities and timeouts, the environment
//! override for the default HTTP endpoint, and a small validated config
//! structure for callers that want to tune a cache instance.
//!
//! ## Configuration Sources
//! - Environment override for the default endpoint
//! - Direct instantiation with defaults

use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Capacity of a blocking session cache when none is specified
pub const DEFAULT_BLOCKING_CAPACITY: usize = 8;

/// Capacity of an async session cache when none is specified
pub const DEFAULT_ASYNC_CAPACITY: usize = 20;

/// Per-request timeout applied when the caller does not supply one
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fallback HTTP endpoint when no environment override is set
pub const DEFAULT_HTTP_ENDPOINT: &str = "http://localhost:8545";

/// Environment variable overriding the default HTTP endpoint
pub const HTTP_ENDPOINT_ENV: &str = "HTTP_PROVIDER_URI";

/// Resolve the default HTTP endpoint.
///
/// Reads [`HTTP_ENDPOINT_ENV`] once per call and falls back to
/// [`DEFAULT_HTTP_ENDPOINT`] when unset. Nothing is cached between calls.
pub fn default_http_endpoint() -> Result<Url> {
    let raw = std::env::var(HTTP_ENDPOINT_ENV)
        .unwrap_or_else(|_| String::from(DEFAULT_HTTP_ENDPOINT));
    Ok(Url::parse(&raw)?)
}

/// Tunable settings for one session-cache instance
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Maximum number of resident sessions
    pub capacity: usize,

    /// Per-request timeout applied when a caller does not supply one
    #[serde(with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_BLOCKING_CAPACITY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl CacheConfig {
    /// Defaults for a blocking cache
    pub fn blocking() -> Self {
        Self::default()
    }

    /// Defaults for an async cache
    pub fn asynchronous() -> Self {
        Self {
            capacity: DEFAULT_ASYNC_CAPACITY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Validate the configuration for common misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means the
    /// configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.capacity == 0 {
            errors.push("Cache capacity must be greater than 0".to_string());
        } else if self.capacity > 10_000 {
            errors.push(format!(
                "Cache capacity very high: {} (each entry holds a live connection pool)",
                self.capacity
            ));
        }

        if self.request_timeout.as_millis() < 10 {
            errors.push("Request timeout too short (minimum: 10ms)".to_string());
        } else if self.request_timeout.as_secs() > 300 {
            errors.push("Request timeout too long (maximum: 300s)".to_string());
        }

        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CacheError::Config(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Helper module for Duration serialization/deserialization
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = duration.as_millis() as u64;
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(CacheConfig::blocking().validate().is_empty());
        assert!(CacheConfig::asynchronous().validate().is_empty());
    }

    #[test]
    fn zero_capacity_rejected() {
        let config = CacheConfig {
            capacity: 0,
            ..CacheConfig::default()
        };
        assert!(!config.validate().is_empty());
        assert!(config.validate_strict().is_err());
    }

    #[test]
    fn capacities_differ_per_execution_model() {
        assert_eq!(CacheConfig::blocking().capacity, DEFAULT_BLOCKING_CAPACITY);
        assert_eq!(CacheConfig::asynchronous().capacity, DEFAULT_ASYNC_CAPACITY);
    }
}
