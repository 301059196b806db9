//! Error types for the submission path.
//!
//! # Design
//! Each variant names the stage that failed so a caller can tell the user
//! whether Tor is down, the destination is bad, the network dropped, or the
//! server said no. `ServerRejected` keeps the raw status and body because the
//! server's explanation is the only diagnostic the user gets.

use thiserror::Error;

/// Reasons a submission can fail. None of them are retried automatically.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The SOCKS5 proxy could not be configured or reached.
    #[error("can't connect to Tor proxy: {0}")]
    ProxyUnavailable(String),

    /// The destination or body could not be turned into a request.
    #[error("failed to create request: {0}")]
    RequestConstructionFailed(String),

    /// The request was sent but the exchange failed mid-flight (including timeouts).
    #[error("failed to send request: {0}")]
    TransportFailed(String),

    /// The server answered with something other than 200.
    #[error("unexpected status: {status}, body: {body}")]
    ServerRejected { status: u16, body: String },
}

impl SubmitError {
    /// Short, stable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SubmitError::ProxyUnavailable(_) => "proxy_unavailable",
            SubmitError::RequestConstructionFailed(_) => "request_construction_failed",
            SubmitError::TransportFailed(_) => "transport_failed",
            SubmitError::ServerRejected { .. } => "server_rejected",
        }
    }
}
