//! Executing an `HttpRequest` through the SOCKS5 proxy.
//!
//! # Design
//! `Transport` is the I/O seam: the submitter only builds and classifies plain
//! data, and whatever implements `Transport` moves the bytes. `ProxiedTransport`
//! is the production implementation, a ureq `Agent` whose only route out is the
//! configured SOCKS5 proxy. There is no direct-connection fallback.
//!
//! The agent is configured with `http_status_as_error(false)` so non-200
//! answers come back as data and the submitter decides what they mean.

use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::error::SubmitError;
use crate::http::{HttpRequest, HttpResponse};

/// Conventional Tor SOCKS port on the local machine.
pub const DEFAULT_PROXY_ADDR: &str = "127.0.0.1:9050";

/// Hard limit on connect + send + receive for one submission.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Executes a single upload request.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, SubmitError>;
}

/// Where the SOCKS5 proxy lives and how long a submission may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    address: String,
    timeout: Duration,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_PROXY_ADDR.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ProxyConfig {
    /// Proxy at `address` (`host:port`, unauthenticated) with the default timeout.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `socks5h` so the proxy resolves destination names; onion hosts only
    /// exist inside Tor and local lookups would leak outside it.
    fn proxy_url(&self) -> String {
        format!("socks5h://{}", self.address)
    }
}

/// ureq agent routed exclusively through a SOCKS5 proxy.
///
/// Cheap to clone; clones share the agent's connection pool.
#[derive(Clone)]
pub struct ProxiedTransport {
    agent: ureq::Agent,
    config: ProxyConfig,
}

impl fmt::Debug for ProxiedTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxiedTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ProxiedTransport {
    /// Build the agent. Fails with `ProxyUnavailable` if the proxy address is
    /// not usable; nothing is sent in that case.
    pub fn new(config: ProxyConfig) -> Result<Self, SubmitError> {
        if config.address.trim().is_empty() {
            return Err(SubmitError::ProxyUnavailable("empty proxy address".to_string()));
        }
        let proxy = ureq::Proxy::new(&config.proxy_url())
            .map_err(|e| SubmitError::ProxyUnavailable(e.to_string()))?;

        let agent = ureq::Agent::config_builder()
            .proxy(Some(proxy))
            .timeout_global(Some(config.timeout))
            .http_status_as_error(false)
            .build()
            .new_agent();

        Ok(Self { agent, config })
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

impl Transport for ProxiedTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, SubmitError> {
        debug!(proxy = %self.config.address, url = %request.url, "dispatching upload");

        let mut builder = self.agent.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = builder
            .send(request.body.as_slice())
            .map_err(classify_error)?;

        let status = response.status().as_u16();
        // The body is diagnostic text only; an unreadable one is reported empty.
        let bytes = response.body_mut().read_to_vec().unwrap_or_default();
        let body = response_text(&bytes);

        Ok(HttpResponse { status, body })
    }
}

/// Server text with invalid UTF-8 replaced rather than discarded.
fn response_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Sort a ureq failure into the submission taxonomy.
fn classify_error(err: ureq::Error) -> SubmitError {
    match err {
        ureq::Error::InvalidProxyUrl | ureq::Error::ConnectProxyFailed(_) => {
            SubmitError::ProxyUnavailable(err.to_string())
        }
        ureq::Error::BadUri(_) | ureq::Error::Http(_) => {
            SubmitError::RequestConstructionFailed(err.to_string())
        }
        other => SubmitError::TransportFailed(other.to_string()),
    }
}
