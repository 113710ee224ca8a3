//! HTTP API module for the tax calculator service.
//!
//! This module provides the net income endpoint and the liveness probe
//! answered on every other path.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::NetIncomeQuery;
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
