//! Application state for the tax calculator API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::coordinator::RequestCoordinator;

/// Shared application state.
///
/// Holds the request coordinator, which owns the cache, the rate limiter
/// and the jurisdiction directory shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    coordinator: Arc<RequestCoordinator>,
}

impl AppState {
    /// Creates a new application state around the given coordinator.
    pub fn new(coordinator: RequestCoordinator) -> Self {
        Self {
            coordinator: Arc::new(coordinator),
        }
    }

    /// Returns the request coordinator.
    pub fn coordinator(&self) -> &RequestCoordinator {
        &self.coordinator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        // Required for axum state
        fn assert_clone<T: Clone + Send + Sync + 'static>() {}
        assert_clone::<AppState>();
    }
}
