//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading service
//! configuration from a YAML file.

use std::fs;
use std::path::Path;

use crate::directory::VERSION_PLACEHOLDER;
use crate::error::{TaxError, TaxResult};

use super::types::ServiceConfig;

/// Loads, validates and provides access to the service configuration.
///
/// # Example
///
/// ```no_run
/// use taxcalc::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./taxcalcd.yaml")?;
/// println!("Listening on port {}", loader.config().port);
/// # Ok::<(), taxcalc::error::TaxError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: ServiceConfig,
}

impl ConfigLoader {
    /// Loads configuration from the YAML file at `path`.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - The file is missing
    /// - The file contains invalid YAML
    /// - A value is out of range (see [`ConfigLoader::from_config`])
    pub fn load<P: AsRef<Path>>(path: P) -> TaxResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| TaxError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        let config: ServiceConfig =
            serde_yaml::from_str(&content).map_err(|e| TaxError::ConfigParseError {
                path: path_str,
                message: e.to_string(),
            })?;

        Self::from_config(config)
    }

    /// Validates an already-built configuration.
    ///
    /// Rejects a zero cache size, a base path without a leading slash and a
    /// bundle URL template lacking the `{version}` placeholder.
    pub fn from_config(config: ServiceConfig) -> TaxResult<Self> {
        if config.cache_size == 0 {
            return Err(TaxError::InvalidConfig {
                field: "cache_size".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if !config.base_path.starts_with('/') {
            return Err(TaxError::InvalidConfig {
                field: "base_path".to_string(),
                message: format!("'{}' must start with '/'", config.base_path),
            });
        }

        if !config.upstream.bundle_url_template.contains(VERSION_PLACEHOLDER) {
            return Err(TaxError::InvalidConfig {
                field: "upstream.bundle_url_template".to_string(),
                message: format!("must contain {VERSION_PLACEHOLDER}"),
            });
        }

        Ok(Self { config })
    }

    /// Returns the validated configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> ServiceConfig {
        self.config
    }
}
