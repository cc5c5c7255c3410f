//! Reqwest-based implementation of the `ProbeHttpClient` trait.
//!
//! Provides a thin adapter around `reqwest::Client` with redirects disabled,
//! so 3xx responses stay inspectable, and a fixed per-request timeout.

use std::time::Duration;

use async_trait::async_trait;
use http::Method;
use reqwest::{Client, redirect::Policy};
use thiserror::Error;
use url::Url;

use super::types::ProbeResponse;

/// Fixed timeout applied to every probe request.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Contract that abstracts the underlying HTTP transport used by the prober.
///
/// Implementations issue exactly one request per call and must not follow
/// redirects; the probe loop treats every obtained response as terminal.
#[async_trait]
pub trait ProbeHttpClient: Send + Sync {
    async fn issue(
        &self,
        method: &Method,
        url: &Url,
    ) -> Result<ProbeResponse, ProbeTransportError>;
}

/// Network-level failure that prevented a response from being obtained
/// (connection, DNS, TLS, timeout).
#[derive(Debug, Error)]
pub enum ProbeTransportError {
    #[error("http transport error: {0}")]
    Transport(String),
}

/// Reqwest-backed probe transport.
pub struct ReqwestProbeClient {
    client: Client,
}

impl ReqwestProbeClient {
    /// Creates a new client with redirects disabled and the fixed probe
    /// timeout applied. No custom headers, cookies, or authentication are
    /// configured; probes go out as stock requests.
    pub fn new() -> Result<Self, ProbeTransportError> {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(PROBE_TIMEOUT)
            .build()
            .map_err(|err| ProbeTransportError::Transport(err.to_string()))?;

        Ok(Self { client })
    }

    /// Wrap an existing reqwest client. The client should already have
    /// redirects disabled and a timeout configured; otherwise redirects will
    /// be followed automatically and the probe loop will not observe the
    /// intermediate 30x response.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestProbeClient {
    fn default() -> Self {
        Self::new().expect("failed to create reqwest probe client")
    }
}

#[async_trait]
impl ProbeHttpClient for ReqwestProbeClient {
    async fn issue(
        &self,
        method: &Method,
        url: &Url,
    ) -> Result<ProbeResponse, ProbeTransportError> {
        let response = self
            .client
            .request(method.clone(), url.as_str())
            .send()
            .await
            .map_err(|err| ProbeTransportError::Transport(err.to_string()))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body_bytes = response
            .bytes()
            .await
            .map_err(|err| ProbeTransportError::Transport(err.to_string()))?;
        let body = String::from_utf8_lossy(&body_bytes).to_string();

        Ok(ProbeResponse::new(method.clone(), status, headers, body))
    }
}
