//! Net income after tax, computed by delegating to an external calculation
//! engine.
//!
//! The crate discovers the engine's jurisdiction identifiers from its
//! published scripts ([`directory`]), composes well-formed computation
//! requests ([`request`]) and serves repeated queries from a bounded cache
//! while throttling upstream traffic ([`cache`], [`rate_limit`],
//! [`coordinator`]). The [`api`] module exposes this over HTTP.

#![warn(missing_docs)]

pub mod api;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod directory;
pub mod error;
pub mod models;
pub mod observability;
pub mod rate_limit;
pub mod request;
