//! Request types for the tax calculator API.
//!
//! This module defines the query string accepted by the net income endpoint.

use serde::{Deserialize, Serialize};

use crate::coordinator::QueryParams;
use crate::error::TaxResult;

/// Raw query string of the net income endpoint.
///
/// Every field is optional at this layer so that a missing salary surfaces
/// as a parameter error with a readable message rather than an extractor
/// rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetIncomeQuery {
    /// Annual salary in dollars.
    #[serde(default)]
    pub salary: Option<String>,
    /// One of `monthly`, `semi-monthly`, `biweekly` or `weekly`.
    #[serde(default, rename = "pay-frequency")]
    pub pay_frequency: Option<String>,
    /// Two-letter state code.
    #[serde(default)]
    pub state: Option<String>,
}

impl NetIncomeQuery {
    /// Normalizes the raw values into [`QueryParams`].
    pub fn into_params(self) -> TaxResult<QueryParams> {
        QueryParams::parse(
            self.salary.as_deref(),
            self.pay_frequency.as_deref(),
            self.state.as_deref(),
        )
    }
}
