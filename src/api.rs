//! HTTP client for the conversion backend.
//!
//! Every call is fire-once: no retries, no backoff. Failures are classified
//! into [`ApiError`] so the views can show a category-specific message.

use crate::constants::*;
use crate::types::*;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Error type for backend calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server could not be reached at all (connection refused, DNS, ...).
    #[error("unable to connect: {0}")]
    Unreachable(String),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {}", .message.as_deref().unwrap_or("no error message"))]
    Server {
        status: StatusCode,
        message: Option<String>,
    },

    /// The request went out but no complete response came back.
    #[error("no response: {0}")]
    NoResponse(String),

    /// Anything else, e.g. a success body that is not valid JSON.
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_body() {
            ApiError::NoResponse(e.to_string())
        } else if e.is_connect() {
            ApiError::Unreachable(e.to_string())
        } else if e.is_request() {
            ApiError::NoResponse(e.to_string())
        } else {
            ApiError::Other(e.to_string())
        }
    }
}

impl ApiError {
    /// User-facing message for a failed conversion.
    pub fn convert_message(&self) -> String {
        match self {
            ApiError::Unreachable(_) => "Network error: Unable to connect to the server. \
                Please check if the backend server is running."
                .to_string(),
            ApiError::Server { message, .. } => format!(
                "Server error: {}",
                message.as_deref().unwrap_or("Unknown server error")
            ),
            ApiError::NoResponse(_) => {
                "No response from server. Please check if the backend server is running."
                    .to_string()
            }
            ApiError::Other(detail) => format!("Error: {}", detail),
        }
    }

    /// Server-supplied message when there is one, transport text otherwise.
    pub fn detail(&self) -> String {
        match self {
            ApiError::Server { message: Some(m), .. } if !m.is_empty() => m.clone(),
            ApiError::Server { status, .. } => {
                format!("Request failed with status code {}", status.as_u16())
            }
            ApiError::Unreachable(s) | ApiError::NoResponse(s) | ApiError::Other(s) => s.clone(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Unreachable(_) => "unreachable",
            ApiError::Server { .. } => "server",
            ApiError::NoResponse(_) => "no_response",
            ApiError::Other(_) => "other",
        }
    }
}

/// Client for the converter backend.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client. `timeout` of `None` keeps the transport defaults.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Self {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to build HTTP client, using defaults");
            reqwest::Client::new()
        });
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Probes `GET /api/health`. Only `200 OK` counts as healthy.
    pub async fn health(&self) -> Result<(), ApiError> {
        let response = self.http.get(self.url(HEALTH_PATH)).send().await?;
        let status = response.status();
        debug!(status = %status, "Health probe response");
        if status == StatusCode::OK {
            Ok(())
        } else {
            Err(server_error(response).await)
        }
    }

    /// Sends Solidity source to `POST /api/convert` and returns the Clarity text.
    pub async fn convert(&self, solidity_code: &str) -> Result<String, ApiError> {
        let response: ConvertResponse = self
            .post_json(CONVERT_PATH, &ConvertRequest { solidity_code })
            .await?;
        Ok(response.clarity_code)
    }

    /// Mock-deploys Clarity code with the fixed contract name and network.
    pub async fn deploy(&self, clarity_code: &str) -> Result<DeployReceipt, ApiError> {
        self.post_json(
            DEPLOY_PATH,
            &DeployRequest {
                clarity_code,
                contract_name: DEPLOY_CONTRACT_NAME,
                network: DEPLOY_NETWORK,
            },
        )
        .await
    }

    /// Asks `POST /api/explain` for a free-text explanation of the code.
    pub async fn explain(&self, clarity_code: &str) -> Result<String, ApiError> {
        let response: ExplainResponse = self
            .post_json(EXPLAIN_PATH, &ExplainRequest { clarity_code })
            .await?;
        Ok(response.explanation)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        let status = response.status();
        debug!(path, status = %status, "Backend response");
        if !status.is_success() {
            return Err(server_error(response).await);
        }
        Ok(response.json::<R>().await?)
    }
}

async fn server_error(response: reqwest::Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.is_empty());
    ApiError::Server { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{spawn_backend, unreachable_url};
    use axum::routing::{get, post};
    use axum::{http::StatusCode as Status, Json, Router};
    use serde_json::{json, Value};

    #[tokio::test]
    async fn convert_returns_clarity_code() {
        let router = Router::new().route(
            "/api/convert",
            post(|Json(body): Json<Value>| async move {
                let src = body["solidityCode"].as_str().unwrap_or_default().to_string();
                Json(json!({ "clarityCode": format!(";; from {}", src.len()) }))
            }),
        );
        let client = ApiClient::new(spawn_backend(router).await, None);
        assert_eq!(client.convert("contract A {}").await.unwrap(), ";; from 13");
    }

    #[tokio::test]
    async fn deploy_sends_fixed_parameters() {
        let router = Router::new().route(
            "/api/deploy",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["contractName"], "converted-contract");
                assert_eq!(body["network"], "testnet");
                Json(json!({ "contractId": "ST000.converted-contract", "status": "mocked" }))
            }),
        );
        let client = ApiClient::new(spawn_backend(router).await, None);
        let receipt = client.deploy("(define-constant a 1)").await.unwrap();
        assert_eq!(receipt.contract_id, "ST000.converted-contract");
        assert_eq!(receipt.extra["status"], "mocked");
    }

    #[tokio::test]
    async fn explain_returns_text() {
        let router = Router::new().route(
            "/api/explain",
            post(|| async { Json(json!({ "explanation": "Defines a constant." })) }),
        );
        let client = ApiClient::new(spawn_backend(router).await, None);
        assert_eq!(client.explain("(define-constant a 1)").await.unwrap(), "Defines a constant.");
    }

    #[tokio::test]
    async fn server_error_carries_message() {
        let router = Router::new().route(
            "/api/convert",
            post(|| async {
                (Status::BAD_REQUEST, Json(json!({ "error": "No Solidity code provided" })))
            }),
        );
        let client = ApiClient::new(spawn_backend(router).await, None);
        let err = client.convert("x").await.unwrap_err();
        assert!(matches!(err, ApiError::Server { .. }));
        assert_eq!(err.convert_message(), "Server error: No Solidity code provided");
        assert_eq!(err.detail(), "No Solidity code provided");
        assert_eq!(err.to_string(), "server returned 400 Bad Request: No Solidity code provided");
    }

    #[tokio::test]
    async fn server_error_without_body_uses_fallback() {
        let router = Router::new().route(
            "/api/convert",
            post(|| async { (Status::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let client = ApiClient::new(spawn_backend(router).await, None);
        let err = client.convert("x").await.unwrap_err();
        assert_eq!(err.convert_message(), "Server error: Unknown server error");
        assert_eq!(err.detail(), "Request failed with status code 500");
    }

    #[tokio::test]
    async fn refused_connection_is_unreachable() {
        let client = ApiClient::new(unreachable_url(), None);
        let err = client.convert("x").await.unwrap_err();
        assert!(matches!(err, ApiError::Unreachable(_)), "got {err:?}");
        assert!(err.convert_message().starts_with("Network error"));
    }

    #[tokio::test]
    async fn timeout_is_no_response() {
        let router = Router::new().route(
            "/api/convert",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({ "clarityCode": "late" }))
            }),
        );
        let client = ApiClient::new(spawn_backend(router).await, Some(Duration::from_millis(100)));
        let err = client.convert("x").await.unwrap_err();
        assert!(matches!(err, ApiError::NoResponse(_)), "got {err:?}");
        assert!(err.convert_message().starts_with("No response from server"));
    }

    #[tokio::test]
    async fn malformed_success_body_is_other() {
        let router = Router::new().route("/api/convert", post(|| async { "not json" }));
        let client = ApiClient::new(spawn_backend(router).await, None);
        let err = client.convert("x").await.unwrap_err();
        assert!(matches!(err, ApiError::Other(_)), "got {err:?}");
        assert!(err.convert_message().starts_with("Error: "));
    }

    #[tokio::test]
    async fn health_reports_status() {
        let ok = Router::new().route("/api/health", get(|| async { Json(json!({ "status": "healthy" })) }));
        assert!(ApiClient::new(spawn_backend(ok).await, None).health().await.is_ok());

        let down = Router::new().route("/api/health", get(|| async { Status::SERVICE_UNAVAILABLE }));
        assert!(ApiClient::new(spawn_backend(down).await, None).health().await.is_err());

        let no_content = Router::new().route("/api/health", get(|| async { Status::NO_CONTENT }));
        assert!(ApiClient::new(spawn_backend(no_content).await, None).health().await.is_err());
    }

    #[tokio::test]
    async fn empty_server_error_falls_back_to_unknown() {
        let router = Router::new().route(
            "/api/convert",
            post(|| async { (Status::INTERNAL_SERVER_ERROR, Json(json!({ "error": "" }))) }),
        );
        let client = ApiClient::new(spawn_backend(router).await, None);
        let err = client.convert("contract A {}").await.unwrap_err();
        assert!(matches!(err, ApiError::Server { message: None, .. }));
        assert_eq!(err.convert_message(), "Server error: Unknown server error");
        assert_eq!(err.detail(), "Request failed with status code 500");
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:5000/", None);
        assert_eq!(client.url(CONVERT_PATH), "http://localhost:5000/api/convert");
    }
}
