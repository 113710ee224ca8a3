//! HTTP request handlers for the tax calculator API.
//!
//! This module contains the handler functions for all API endpoints.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{rejection::QueryRejection, ConnectInfo, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::request::NetIncomeQuery;
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Creates the API router.
///
/// The net income endpoint is served at `base_path` with and without a
/// trailing slash; every other path answers `204 No Content`.
pub fn create_router(state: AppState, base_path: &str) -> Router {
    let base = base_path.trim_end_matches('/');

    let router = if base.is_empty() {
        Router::new().route("/", get(net_income_handler))
    } else {
        Router::new()
            .route(base, get(net_income_handler))
            .route(&format!("{base}/"), get(net_income_handler))
    };

    router.fallback(health_handler).with_state(state)
}

/// Handler for `GET {base_path}/?salary=..&pay-frequency=..&state=..`.
///
/// Returns the net income per pay period as a single CSV value.
async fn net_income_handler(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    query: Result<Query<NetIncomeQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let client = client_address(&headers, connect_info.map(|ConnectInfo(addr)| addr));
    info!(
        correlation_id = %correlation_id,
        client = %client,
        "Processing net income request"
    );

    let params = match query {
        Ok(Query(raw)) => raw.into_params(),
        Err(rejection) => {
            warn!(
                correlation_id = %correlation_id,
                error = %rejection.body_text(),
                "Query string rejected"
            );
            return ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::invalid_params(rejection.body_text()),
            }
            .into_response();
        }
    };

    let params = match params {
        Ok(params) => params,
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Invalid request params");
            return ApiErrorResponse::from(err).into_response();
        }
    };

    let start_time = Instant::now();
    match state.coordinator().retrieve_or_request(&params).await {
        Ok(response) => {
            let net = response.formatted_net();
            info!(
                correlation_id = %correlation_id,
                salary = params.salary,
                state = %params.state,
                pay_frequency = %params.pay_frequency,
                net = %net,
                duration_us = start_time.elapsed().as_micros() as u64,
                "Net income request completed"
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/csv")],
                format!("{net}\n"),
            )
                .into_response()
        }
        Err(err) => {
            let api_error = ApiErrorResponse::from(err);
            warn!(
                correlation_id = %correlation_id,
                status = api_error.status.as_u16(),
                code = api_error.error.code,
                error = %api_error.error.message,
                "Net income request failed"
            );
            api_error.into_response()
        }
    }
}

/// Liveness probe answered on every path other than the API endpoint.
async fn health_handler() -> StatusCode {
    StatusCode::NO_CONTENT
}

fn client_address(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResponseCache;
    use crate::coordinator::RequestCoordinator;
    use crate::directory::JurisdictionDirectory;
    use crate::models::Jurisdiction;
    use crate::rate_limit::RateLimiter;
    use crate::request::UpstreamClient;
    use axum::{body::Body, http::Request};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const NET_BODY: &str = r#"{"net": {"amount": 3791.456, "currencyCode": "USD", "label": "Net Pay"}}"#;

    fn create_test_state(server: &MockServer) -> AppState {
        let directory = JurisdictionDirectory::preloaded(vec![
            Jurisdiction::state("CA", "California", "ca-id"),
            Jurisdiction::federal_fallback(),
        ]);
        let client = UpstreamClient::new(
            format!("{}/calculations", server.uri()),
            Duration::from_secs(5),
        )
        .unwrap();

        AppState::new(RequestCoordinator::new(
            ResponseCache::new(10).unwrap(),
            RateLimiter::new(Duration::from_millis(1)),
            Arc::new(directory),
            client,
        ))
    }

    async fn mount_upstream(server: &MockServer, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/calculations"))
            .respond_with(ResponseTemplate::new(200).set_body_string(NET_BODY))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    async fn get_request(router: Router, uri: &str) -> (StatusCode, Option<String>, String) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .map(|value| value.to_str().unwrap().to_string());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_valid_request_returns_csv_net() {
        let server = MockServer::start().await;
        mount_upstream(&server, 1).await;
        let router = create_router(create_test_state(&server), "/api/v1");

        let (status, content_type, body) = get_request(
            router,
            "/api/v1/?salary=60000&pay-frequency=monthly&state=ca",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("text/csv"));
        assert_eq!(body, "3791.46\n");
    }

    #[tokio::test]
    async fn test_base_path_without_trailing_slash() {
        let server = MockServer::start().await;
        mount_upstream(&server, 1).await;
        let router = create_router(create_test_state(&server), "/api/v1/");

        let (status, _, body) = get_request(router, "/api/v1?salary=60000").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "3791.46\n");
    }

    #[tokio::test]
    async fn test_missing_salary_returns_400() {
        let server = MockServer::start().await;
        mount_upstream(&server, 0).await;
        let router = create_router(create_test_state(&server), "/api/v1");

        let (status, _, body) = get_request(router, "/api/v1/?state=CA").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "failed to parse request params: salary must be specified");
    }

    #[tokio::test]
    async fn test_non_numeric_salary_returns_400() {
        let server = MockServer::start().await;
        mount_upstream(&server, 0).await;
        let router = create_router(create_test_state(&server), "/api/v1");

        let (status, _, body) = get_request(router, "/api/v1/?salary=lots").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.starts_with("failed to parse request params: salary is not a valid float"));
    }

    #[tokio::test]
    async fn test_negative_salary_returns_400() {
        let server = MockServer::start().await;
        mount_upstream(&server, 0).await;
        let router = create_router(create_test_state(&server), "/api/v1");

        let (status, _, body) = get_request(router, "/api/v1/?salary=-100").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            "failed to retrieve or request: salary amount must be non-negative"
        );
    }

    #[tokio::test]
    async fn test_unknown_state_returns_500() {
        let server = MockServer::start().await;
        mount_upstream(&server, 0).await;
        let router = create_router(create_test_state(&server), "/api/v1");

        let (status, _, body) = get_request(router, "/api/v1/?salary=60000&state=ZZ").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("no jurisdiction found for code: ZZ"));
    }

    #[tokio::test]
    async fn test_upstream_failure_returns_500() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        let router = create_router(create_test_state(&server), "/api/v1");

        let (status, _, body) = get_request(router, "/api/v1/?salary=60000").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("status was not OK sending request"));
    }

    #[tokio::test]
    async fn test_other_paths_return_204() {
        let server = MockServer::start().await;
        mount_upstream(&server, 0).await;
        let router = create_router(create_test_state(&server), "/api/v1");

        for uri in ["/", "/healthz", "/api/v2/"] {
            let (status, _, body) = get_request(router.clone(), uri).await;
            assert_eq!(status, StatusCode::NO_CONTENT, "path {uri}");
            assert!(body.is_empty());
        }
    }

    #[test]
    fn test_client_address_prefers_forwarded_for() {
        let peer: SocketAddr = "10.0.0.1:4000".parse().unwrap();
        let mut headers = HeaderMap::new();

        assert_eq!(client_address(&headers, Some(peer)), "10.0.0.1:4000");
        assert_eq!(client_address(&headers, None), "unknown");

        headers.insert(FORWARDED_FOR, "203.0.113.7".parse().unwrap());
        assert_eq!(client_address(&headers, Some(peer)), "203.0.113.7");
    }
}
