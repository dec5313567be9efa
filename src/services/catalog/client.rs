//! Paced, retried access to the catalog API.
//!
//! The client knows nothing about recipes or categories: it executes one
//! GET with a pacing delay before every attempt, bounded retries on rate
//! limiting and transport failures, and JSON decoding of the body.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::sleep;

/// Errors a catalog call can surface.
///
/// These never cross the orchestrator boundary; callers above it only ever
/// see an empty result list.
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("network error: {0}")]
    Network(String),

    #[error("rate limited by upstream")]
    RateLimited,

    #[error("upstream returned HTTP {0}")]
    Http(u16),

    #[error("failed to decode upstream response: {0}")]
    Decode(String),
}

/// Process-wide retry/pacing constants.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the initial attempt; total attempts = max_retries + 1.
    pub max_retries: u32,
    /// Fixed wait before every fresh request, independent of retries.
    pub pacing_delay: Duration,
    /// Wait before retry k is retry_delay * k.
    pub retry_delay: Duration,
    /// Per-request timeout handed to the transport.
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            pacing_delay: Duration::from_millis(1200),
            retry_delay: Duration::from_secs(2),
            timeout: Duration::from_secs(20),
        }
    }
}

/// A transport-level failure: connect error, timeout, or a body that never
/// arrived. Distinct from an HTTP error status, which the transport reports
/// as a [`RawResponse`].
#[derive(thiserror::Error, Debug)]
#[error("{0}")]
pub struct TransportError(pub String);

/// An HTTP response before any interpretation.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Trait for the HTTP transport, enabling mockability in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn get(
        &self,
        url: &str,
        params: &[(String, String)],
        timeout: Duration,
    ) -> Result<RawResponse, TransportError>;
}

/// Production transport backed by a shared reqwest client.
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiTransport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        params: &[(String, String)],
        timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        let response = self
            .inner
            .get(url)
            .query(params)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(RawResponse { status, body })
    }
}

/// Executes single catalog calls under the retry policy.
pub struct ResilientClient {
    transport: Arc<dyn ApiTransport>,
    policy: RetryPolicy,
}

impl ResilientClient {
    pub fn new(transport: Arc<dyn ApiTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// One paced, retried GET returning the decoded JSON body.
    ///
    /// HTTP 429 and transport failures are retried until the policy is
    /// exhausted; any other error status fails immediately, and a body that
    /// is not valid JSON fails immediately as [`CatalogError::Decode`].
    pub async fn request(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<Value, CatalogError> {
        let mut last_error = None;

        for attempt in 0..=self.policy.max_retries {
            if attempt == 0 {
                sleep(self.policy.pacing_delay).await;
            } else {
                sleep(self.policy.retry_delay * attempt).await;
            }

            match self.transport.get(url, params, self.policy.timeout).await {
                Ok(raw) if raw.status == 429 => {
                    tracing::warn!(url, attempt, "upstream rate limit hit");
                    last_error = Some(CatalogError::RateLimited);
                }
                Ok(raw) if !(200..300).contains(&raw.status) => {
                    tracing::warn!(url, status = raw.status, "upstream error status");
                    return Err(CatalogError::Http(raw.status));
                }
                Ok(raw) => {
                    return serde_json::from_str(&raw.body)
                        .map_err(|e| CatalogError::Decode(e.to_string()));
                }
                Err(e) => {
                    tracing::warn!(url, attempt, error = %e, "transport failure");
                    last_error = Some(CatalogError::Network(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CatalogError::Network("retries exhausted".to_string())))
    }
}
