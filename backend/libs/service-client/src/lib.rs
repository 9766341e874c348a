//! Internal trust broker for service-to-service calls
//!
//! Any service calling another GlucoTrack service goes through
//! [`ServiceClient`]: before the request leaves the process, a fresh
//! internal token is fetched from the auth service (gated by the shared
//! `Internal-Api-Key` secret) and attached as a normal bearer credential.
//! The callee verifies it like any user token; only the role claim value
//! (`INTERNAL_SERVICE`) distinguishes it.
//!
//! A new token is fetched for every outbound call. That costs one extra
//! round trip per call but removes token caching and expiry-skew handling
//! entirely; the source system made the same trade.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use thiserror::Error;

/// Path of the internal-token issuance endpoint on the auth service.
pub const INTERNAL_TOKEN_PATH: &str = "/internal-auth/internal-token";

/// Header carrying the pre-shared internal API key.
pub const INTERNAL_API_KEY_HEADER: &str = "Internal-Api-Key";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Failures while obtaining an internal token. Outbound calls must fail
/// hard on any of these; proceeding unauthenticated is never an option.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// The auth service rejected the configured API key. Not retryable.
    #[error("internal API key rejected by the auth service")]
    InvalidApiKey,

    /// Transport failure or 5xx from the auth service. Retry-eligible with
    /// backoff, at the caller's discretion.
    #[error("auth service unreachable: {0}")]
    Upstream(String),

    /// The auth service answered with a status the broker does not expect.
    #[error("unexpected status {0} from the auth service")]
    UnexpectedStatus(StatusCode),
}

/// Client for the auth service's internal-token endpoint.
#[derive(Clone)]
pub struct InternalAuthClient {
    http: reqwest::Client,
    auth_base_url: String,
    api_key: String,
}

impl InternalAuthClient {
    pub fn new(auth_base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("HTTP client initialization failed");

        InternalAuthClient {
            http,
            auth_base_url: auth_base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Exchange the configured API key for a short-lived internal token.
    pub async fn fetch_internal_token(&self) -> Result<String, BrokerError> {
        let url = format!("{}{}", self.auth_base_url, INTERNAL_TOKEN_PATH);

        let response = self
            .http
            .post(&url)
            .header(INTERNAL_API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| BrokerError::Upstream(e.to_string()))?;

        match response.status() {
            status if status.is_success() => response
                .text()
                .await
                .map_err(|e| BrokerError::Upstream(e.to_string())),
            StatusCode::UNAUTHORIZED => Err(BrokerError::InvalidApiKey),
            status if status.is_server_error() => {
                Err(BrokerError::Upstream(format!("auth service returned {status}")))
            }
            status => Err(BrokerError::UnexpectedStatus(status)),
        }
    }
}

/// Outbound HTTP client that attaches an internal bearer token to every
/// request, except requests to the token endpoint itself.
#[derive(Clone)]
pub struct ServiceClient {
    broker: InternalAuthClient,
    http: reqwest::Client,
}

impl ServiceClient {
    pub fn new(broker: InternalAuthClient) -> Self {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("HTTP client initialization failed");

        ServiceClient { broker, http }
    }

    /// Build an authorized request. Requests targeting the internal-token
    /// endpoint are left bare, otherwise fetching the token to authorize
    /// the fetch would recurse forever.
    pub async fn request(&self, method: Method, url: &str) -> Result<RequestBuilder, BrokerError> {
        if url.contains(INTERNAL_TOKEN_PATH) {
            tracing::debug!(%url, "skipping token injection for internal token request");
            return Ok(self.http.request(method, url));
        }

        let token = self.broker.fetch_internal_token().await.map_err(|e| {
            tracing::error!(%url, error = %e, "failed to obtain internal token for outbound call");
            e
        })?;

        Ok(self.http.request(method, url).bearer_auth(token))
    }

    pub async fn get(&self, url: &str) -> Result<RequestBuilder, BrokerError> {
        self.request(Method::GET, url).await
    }

    pub async fn post(&self, url: &str) -> Result<RequestBuilder, BrokerError> {
        self.request(Method::POST, url).await
    }
}
