//! Configuration loading and management for the tax calculator service.
//!
//! This module provides the [`ServiceConfig`] types and a [`ConfigLoader`]
//! that reads them from YAML, falling back to defaults for anything the
//! file leaves out.
//!
//! # Example
//!
//! ```no_run
//! use taxcalc::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./taxcalcd.yaml").unwrap();
//! println!("Cache size: {}", config.config().cache_size);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{ServiceConfig, UpstreamConfig};
