//! Fetching of the upstream script bundles.
//!
//! [`ScriptSource`] is the narrow seam between discovery and the network so
//! tests can substitute canned scripts.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

/// Fetches a script by URL and returns its body.
///
/// Errors are plain strings; the directory decides which discovery stage
/// they belong to.
#[async_trait]
pub trait ScriptSource: Send + Sync {
    /// Fetches the body at `url`.
    async fn fetch(&self, url: &str) -> Result<String, String>;
}

/// A [`ScriptSource`] backed by HTTP GET requests.
#[derive(Debug, Clone)]
pub struct HttpScriptSource {
    client: reqwest::Client,
}

impl HttpScriptSource {
    /// Creates a source with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("taxcalc/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| format!("failed to create HTTP client: {e}"))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ScriptSource for HttpScriptSource {
    async fn fetch(&self, url: &str) -> Result<String, String> {
        debug!(url = %url, "fetching script");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("status was not OK: {status}"));
        }

        response.text().await.map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/loader.js"))
            .respond_with(ResponseTemplate::new(200).set_body_string("const a=1;"))
            .mount(&server)
            .await;

        let source = HttpScriptSource::new(Duration::from_secs(5)).unwrap();
        let body = source
            .fetch(&format!("{}/loader.js", server.uri()))
            .await
            .unwrap();

        assert_eq!(body, "const a=1;");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let source = HttpScriptSource::new(Duration::from_secs(5)).unwrap();
        let err = source
            .fetch(&format!("{}/missing.js", server.uri()))
            .await
            .unwrap_err();

        assert!(err.contains("404"), "unexpected error: {err}");
    }
}
