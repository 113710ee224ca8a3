//! Jurisdiction discovery and lookup.
//!
//! The upstream engine identifies jurisdictions by opaque ids that are only
//! published inside the scripts of its own web calculator. Discovery is a
//! two-stage protocol:
//!
//! 1. Fetch the loader script and read the generally-available version of
//!    the calculator component from its embedded version map.
//! 2. Fetch the bundle for that version and scrape the state descriptors
//!    and the federal object literal out of it.
//!
//! [`JurisdictionDirectory`] runs this at most once per instance, on first
//! need, and memoizes the outcome (success or failure) for its lifetime.
//!
//! # Example
//!
//! ```
//! use taxcalc::directory::JurisdictionDirectory;
//! use taxcalc::models::Jurisdiction;
//!
//! # tokio_test_block_on(async {
//! let directory = JurisdictionDirectory::preloaded(vec![
//!     Jurisdiction::state("CA", "California", "ca-id"),
//! ]);
//! let california = directory.lookup("CA").await.unwrap();
//! assert_eq!(california.jurisdiction_id, "ca-id");
//! assert!(directory.lookup("ZZ").await.is_err());
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

mod parse;
mod source;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::error::{DiscoveryError, TaxError, TaxResult};
use crate::models::{FEDERAL_CODE, Jurisdiction};

pub use parse::{
    CALCULATOR_COMPONENT, extract_federal, extract_states, extract_version, repair_object_literal,
};
pub use source::{HttpScriptSource, ScriptSource};

/// Placeholder in the bundle URL template that is replaced by the version.
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Where the discovery scripts live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryEndpoints {
    /// URL of the loader script.
    pub loader_url: String,
    /// URL of the versioned bundle, containing [`VERSION_PLACEHOLDER`].
    pub bundle_url_template: String,
}

impl DiscoveryEndpoints {
    /// Returns the bundle URL for a version.
    pub fn bundle_url(&self, version: &str) -> String {
        self.bundle_url_template.replace(VERSION_PLACEHOLDER, version)
    }
}

type Entries = HashMap<String, Jurisdiction>;

/// Lazily discovered mapping from jurisdiction code to [`Jurisdiction`].
///
/// Safe to share behind an [`Arc`]: concurrent first callers wait on the
/// same single discovery run and all observe the same outcome. The run
/// happens on its own task, so it completes even if every caller that
/// was waiting on it goes away.
pub struct JurisdictionDirectory {
    source: Arc<dyn ScriptSource>,
    endpoints: DiscoveryEndpoints,
    entries: Arc<OnceCell<Result<Entries, DiscoveryError>>>,
}

impl JurisdictionDirectory {
    /// Creates an empty directory that discovers through `source`.
    pub fn new(source: Arc<dyn ScriptSource>, endpoints: DiscoveryEndpoints) -> Self {
        Self {
            source,
            endpoints,
            entries: Arc::new(OnceCell::new()),
        }
    }

    /// Creates a directory that is already populated and never fetches.
    pub fn preloaded(jurisdictions: impl IntoIterator<Item = Jurisdiction>) -> Self {
        let entries = jurisdictions
            .into_iter()
            .map(|j| (j.code().to_string(), j))
            .collect();

        Self {
            source: Arc::new(NoSource),
            endpoints: DiscoveryEndpoints {
                loader_url: String::new(),
                bundle_url_template: String::new(),
            },
            entries: Arc::new(OnceCell::new_with(Some(Ok(entries)))),
        }
    }

    /// Populates the directory if that has not been attempted yet.
    ///
    /// Returns the number of known jurisdictions, or the discovery failure.
    /// A failure is final: later calls return the same error without
    /// fetching again.
    pub async fn populate(&self) -> Result<usize, DiscoveryError> {
        self.entries().await.map(HashMap::len)
    }

    /// Resolves a single code, triggering discovery on first use.
    pub async fn lookup(&self, code: &str) -> TaxResult<Jurisdiction> {
        let entries = self.entries().await?;
        entries
            .get(code)
            .cloned()
            .ok_or_else(|| TaxError::UnknownJurisdiction {
                code: code.to_string(),
            })
    }

    /// Resolves every code or none.
    pub async fn resolve_all<S: AsRef<str>>(&self, codes: &[S]) -> TaxResult<Vec<Jurisdiction>> {
        let entries = self.entries().await?;
        codes
            .iter()
            .map(|code| {
                let code = code.as_ref();
                entries
                    .get(code)
                    .cloned()
                    .ok_or_else(|| TaxError::UnknownJurisdiction {
                        code: code.to_string(),
                    })
            })
            .collect()
    }

    /// Returns the federal jurisdiction without ever waiting on discovery.
    ///
    /// Falls back to [`Jurisdiction::federal_fallback`] when the directory
    /// is not populated (or discovery failed).
    pub fn federal(&self) -> Jurisdiction {
        match self.entries.get() {
            Some(Ok(entries)) => entries
                .get(FEDERAL_CODE)
                .cloned()
                .unwrap_or_else(Jurisdiction::federal_fallback),
            _ => Jurisdiction::federal_fallback(),
        }
    }

    /// Returns true once discovery has succeeded.
    pub fn is_populated(&self) -> bool {
        matches!(self.entries.get(), Some(Ok(_)))
    }

    /// Returns the known codes in sorted order, if populated.
    pub fn codes(&self) -> Option<Vec<String>> {
        match self.entries.get() {
            Some(Ok(entries)) => {
                let mut codes: Vec<String> = entries.keys().cloned().collect();
                codes.sort();
                Some(codes)
            }
            _ => None,
        }
    }

    async fn entries(&self) -> Result<&Entries, DiscoveryError> {
        if !self.entries.initialized() {
            let entries = Arc::clone(&self.entries);
            let source = Arc::clone(&self.source);
            let endpoints = self.endpoints.clone();
            // Later callers spawn their own task, which joins the
            // initialization already in flight instead of starting another.
            let task = tokio::spawn(async move {
                entries
                    .get_or_init(|| discover(source, endpoints))
                    .await;
            });
            if let Err(err) = task.await {
                return Err(DiscoveryError::Interrupted {
                    message: err.to_string(),
                });
            }
        }

        match self.entries.get() {
            Some(result) => result.as_ref().map_err(|err| err.clone()),
            None => Err(DiscoveryError::Interrupted {
                message: "discovery finished without a result".to_string(),
            }),
        }
    }
}

async fn discover(
    source: Arc<dyn ScriptSource>,
    endpoints: DiscoveryEndpoints,
) -> Result<Entries, DiscoveryError> {
    info!(loader_url = %endpoints.loader_url, "discovering jurisdictions");

    let result = run_discovery(source.as_ref(), &endpoints).await;
    match &result {
        Ok(entries) => info!(count = entries.len(), "jurisdictions discovered"),
        Err(err) => warn!(error = %err, "jurisdiction discovery failed"),
    }
    result
}

async fn run_discovery(
    source: &dyn ScriptSource,
    endpoints: &DiscoveryEndpoints,
) -> Result<Entries, DiscoveryError> {
    let loader_url = &endpoints.loader_url;
    let loader = source
        .fetch(loader_url)
        .await
        .map_err(|message| DiscoveryError::LoaderUnreachable {
            url: loader_url.clone(),
            message,
        })?;

    let version = extract_version(&loader)?;
    debug!(version = %version, "selected calculator version");

    let bundle_url = endpoints.bundle_url(&version);
    let bundle = source
        .fetch(&bundle_url)
        .await
        .map_err(|message| DiscoveryError::BundleUnreachable {
            url: bundle_url.clone(),
            message,
        })?;

    let states = extract_states(&bundle)?;
    let federal = extract_federal(&bundle)?;

    Ok(states
        .into_iter()
        .chain(std::iter::once(federal))
        .map(|j| (j.code().to_string(), j))
        .collect())
}

impl std::fmt::Debug for JurisdictionDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JurisdictionDirectory")
            .field("endpoints", &self.endpoints)
            .field("populated", &self.is_populated())
            .finish()
    }
}

/// Source of a preloaded directory; never consulted.
struct NoSource;

#[async_trait]
impl ScriptSource for NoSource {
    async fn fetch(&self, url: &str) -> Result<String, String> {
        Err(format!("preloaded directory does not fetch {url}"))
    }
}
