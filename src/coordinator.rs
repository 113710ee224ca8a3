//! Cache-first request coordination.
//!
//! [`RequestCoordinator`] is what the HTTP front end talks to. It turns
//! normalized [`QueryParams`] into a response: from the cache when possible,
//! otherwise through the rate limiter and a freshly built upstream request.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::cache::{CacheKey, ResponseCache};
use crate::config::ServiceConfig;
use crate::directory::{HttpScriptSource, JurisdictionDirectory};
use crate::error::{TaxError, TaxResult};
use crate::models::{ComputationResponse, PayFrequency, SalaryFrequency};
use crate::rate_limit::RateLimiter;
use crate::request::{RequestBuilder, UpstreamClient};

/// Normalized parameters of a net-income query.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use taxcalc::coordinator::QueryParams;
/// use taxcalc::models::PayFrequency;
///
/// let raw = HashMap::from([
///     ("salary".to_string(), "60000".to_string()),
///     ("state".to_string(), " ca ".to_string()),
///     ("pay-frequency".to_string(), "weekly".to_string()),
/// ]);
/// let params = QueryParams::from_query(&raw).unwrap();
/// assert_eq!(params.state, "CA");
/// assert_eq!(params.pay_frequency, PayFrequency::Weekly);
/// assert_eq!(params.cache_key().to_string(), "60000.00CAweekly");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    /// Annual salary in dollars.
    pub salary: f64,
    /// Pay frequency; unknown values fall back to monthly.
    pub pay_frequency: PayFrequency,
    /// Trimmed, uppercase state code; empty means federal only.
    pub state: String,
}

impl QueryParams {
    /// Query parameter carrying the salary.
    pub const SALARY: &'static str = "salary";
    /// Query parameter carrying the pay frequency.
    pub const PAY_FREQUENCY: &'static str = "pay-frequency";
    /// Query parameter carrying the state code.
    pub const STATE: &'static str = "state";

    /// Parses the individual raw values.
    ///
    /// A missing or non-numeric salary is an [`TaxError::InvalidParams`].
    /// The salary is not range checked here; negative values are rejected
    /// by the request builder.
    pub fn parse(
        salary: Option<&str>,
        pay_frequency: Option<&str>,
        state: Option<&str>,
    ) -> TaxResult<Self> {
        let salary = salary.ok_or_else(|| TaxError::InvalidParams {
            message: "salary must be specified".to_string(),
        })?;

        let salary: f64 = salary
            .trim()
            .parse()
            .map_err(|e| TaxError::InvalidParams {
                message: format!("salary is not a valid float: {e}"),
            })?;

        if !salary.is_finite() {
            return Err(TaxError::InvalidParams {
                message: "salary is not a finite number".to_string(),
            });
        }

        Ok(Self {
            salary,
            pay_frequency: PayFrequency::parse_lenient(pay_frequency.unwrap_or_default()),
            state: state.unwrap_or_default().trim().to_uppercase(),
        })
    }

    /// Parses a decoded query string map.
    pub fn from_query(query: &HashMap<String, String>) -> TaxResult<Self> {
        Self::parse(
            query.get(Self::SALARY).map(String::as_str),
            query.get(Self::PAY_FREQUENCY).map(String::as_str),
            query.get(Self::STATE).map(String::as_str),
        )
    }

    /// The cache fingerprint of these parameters.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.salary, &self.state, self.pay_frequency)
    }
}

/// Serves net-income queries cache first, throttling upstream traffic.
#[derive(Debug)]
pub struct RequestCoordinator {
    cache: ResponseCache,
    limiter: RateLimiter,
    directory: Arc<JurisdictionDirectory>,
    client: UpstreamClient,
    shutdown: Option<watch::Receiver<bool>>,
}

impl RequestCoordinator {
    /// Assembles a coordinator from its parts.
    pub fn new(
        cache: ResponseCache,
        limiter: RateLimiter,
        directory: Arc<JurisdictionDirectory>,
        client: UpstreamClient,
    ) -> Self {
        Self {
            cache,
            limiter,
            directory,
            client,
            shutdown: None,
        }
    }

    /// Wires the HTTP-backed directory, client, cache and limiter described
    /// by `config`.
    pub fn from_config(config: &ServiceConfig) -> TaxResult<Self> {
        let upstream = &config.upstream;
        let source = HttpScriptSource::new(upstream.timeout())
            .map_err(|message| TaxError::Transport { message })?;
        let directory = JurisdictionDirectory::new(Arc::new(source), upstream.discovery_endpoints());
        let client = UpstreamClient::new(upstream.calculation_url.clone(), upstream.timeout())?;

        info!(
            cache_size = config.cache_size,
            rate_limit_ms = config.rate_limit_ms,
            upstream = %upstream.calculation_url,
            "request coordinator configured"
        );

        Ok(Self::new(
            ResponseCache::new(config.cache_size)?,
            RateLimiter::new(config.rate_limit()),
            Arc::new(directory),
            client,
        ))
    }

    /// Cancels pending rate-limit waits once `shutdown` turns true.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// The response cache.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// The upstream rate limiter.
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// The jurisdiction directory.
    pub fn directory(&self) -> &Arc<JurisdictionDirectory> {
        &self.directory
    }

    /// Returns the cached response for `params`, or requests a fresh one.
    ///
    /// A hit never touches the limiter or the network. On a miss the request
    /// is composed first, so invalid input fails without consuming a
    /// rate-limit slot; the call then waits for the limiter, is sent once
    /// and its successful response cached. Failures are not cached.
    pub async fn retrieve_or_request(
        &self,
        params: &QueryParams,
    ) -> TaxResult<Arc<ComputationResponse>> {
        let key = params.cache_key();

        if let Some(response) = self.cache.get(&key) {
            debug!(cache_key = %key, "cache hit");
            return Ok(response);
        }
        debug!(cache_key = %key, "cache miss");

        let mut builder = self.builder_for(params).await;
        if let Some(error) = builder.take_error() {
            return Err(error);
        }

        self.limiter.wait(self.shutdown_signal()).await?;

        let response = Arc::new(builder.send().await?);
        self.cache.put(key, Arc::clone(&response));
        Ok(response)
    }

    async fn builder_for(&self, params: &QueryParams) -> RequestBuilder {
        let builder = RequestBuilder::new(self.client.clone(), Arc::clone(&self.directory))
            .with_salary(params.salary, SalaryFrequency::Annual)
            .with_pay_frequency(params.pay_frequency);

        if params.state.is_empty() {
            builder
        } else {
            builder
                .with_jurisdictions_by_code(&[params.state.as_str()])
                .await
        }
    }

    fn shutdown_signal(&self) -> impl Future<Output = ()> + use<> {
        let shutdown = self.shutdown.clone();
        async move {
            if let Some(mut shutdown) = shutdown {
                if shutdown.wait_for(|stop| *stop).await.is_ok() {
                    return;
                }
            }
            // No signal can arrive any more.
            std::future::pending::<()>().await
        }
    }
}
