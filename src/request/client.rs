//! HTTP client for the upstream calculation engine.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{TaxError, TaxResult};
use crate::models::{ComputationRequest, ComputationResponse};

/// Posts computation requests to the upstream engine and decodes the answers.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    url: String,
}

impl UpstreamClient {
    /// Creates a client for the engine at `url`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> TaxResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("taxcalc/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TaxError::Transport {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// The engine URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends one computation request. No retries.
    pub async fn calculate(&self, request: &ComputationRequest) -> TaxResult<ComputationResponse> {
        debug!(url = %self.url, "sending computation request");

        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "failed to send computation request");
                TaxError::Transport {
                    message: format!("failed to send request: {e}"),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "upstream answered with non-success status");
            return Err(TaxError::Transport {
                message: format!("status was not OK sending request: {status}"),
            });
        }

        let body = response.text().await.map_err(|e| TaxError::Transport {
            message: format!("failed to read response body: {e}"),
        })?;

        serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "failed to decode upstream response");
            TaxError::Decode {
                message: e.to_string(),
            }
        })
    }
}
