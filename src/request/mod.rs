//! Composition and delivery of upstream computation requests.
//!
//! [`RequestBuilder`] accumulates validated inputs and composes the
//! canonical [`ComputationRequest`](crate::models::ComputationRequest);
//! [`UpstreamClient`] delivers it.

mod builder;
mod client;

pub use builder::{RequestBuilder, RequestDraft};
pub use client::UpstreamClient;
