//! Configuration type definitions.
//!
//! This module contains the structs that YAML configuration files
//! deserialize into. Every field has a default, so an empty file (or no
//! file at all) yields a working configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::directory::DiscoveryEndpoints;

/// Top-level service configuration.
///
/// # Example
///
/// ```
/// use taxcalc::config::ServiceConfig;
///
/// let config: ServiceConfig = serde_yaml::from_str("cache_size: 50\nrate_limit_ms: 250").unwrap();
/// assert_eq!(config.cache_size, 50);
/// assert_eq!(config.rate_limit().as_millis(), 250);
/// assert_eq!(config.port, 8080);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Port the server listens on.
    pub port: u16,
    /// Path prefix of the API endpoint.
    pub base_path: String,
    /// Number of responses kept in the cache.
    pub cache_size: usize,
    /// Minimum spacing between upstream calls, in milliseconds.
    pub rate_limit_ms: u64,
    /// Upstream endpoints.
    pub upstream: UpstreamConfig,
}

impl ServiceConfig {
    /// The rate-limit interval.
    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            base_path: "/api/v1".to_string(),
            cache_size: 1000,
            rate_limit_ms: 1000,
            upstream: UpstreamConfig::default(),
        }
    }
}

/// Locations of the upstream engine and its script host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// URL computation requests are POSTed to.
    pub calculation_url: String,
    /// URL of the loader script holding the version map.
    pub loader_url: String,
    /// URL of the versioned bundle, with a `{version}` placeholder.
    pub bundle_url_template: String,
    /// Timeout for every outbound HTTP request, in seconds.
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    /// The outbound request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The discovery script locations.
    pub fn discovery_endpoints(&self) -> DiscoveryEndpoints {
        DiscoveryEndpoints {
            loader_url: self.loader_url.clone(),
            bundle_url_template: self.bundle_url_template.clone(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            calculation_url: "https://paycheck-calculator.adp.com/api/pcc/v2/calculations"
                .to_string(),
            loader_url: "https://pwc.adp.com/pwc/dist/loader.js".to_string(),
            bundle_url_template:
                "https://pwc.adp.com/pwc/dist/pcc/{version}/esm/pwc-dynamic-control-generator_20.entry.js"
                    .to_string(),
            timeout_secs: 30,
        }
    }
}
