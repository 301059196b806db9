//! One-shot upload of a message through the proxy.
//!
//! # Design
//! `Submitter` holds an immutable `Transport` and nothing else, so it can be
//! cloned into background threads freely. A submission is split the same way
//! every time: `build_upload` turns the destination and payload into an
//! `HttpRequest`, the transport executes it, and `check_status` decides whether
//! the response counts as delivered. Only 200 does.
//!
//! Callers on an interactive loop use `submit_with` (callback) or
//! `submit_async` (oneshot receiver). Either way the result is delivered
//! exactly once.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::destination::Destination;
use crate::error::SubmitError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{ProxiedTransport, ProxyConfig, Transport};

/// Outcome of one submission attempt.
pub type SubmissionResult = Result<Submitted, SubmitError>;

/// A delivered submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submitted {
    pub elapsed: Duration,
}

impl Submitted {
    /// Elapsed time rounded to the nearest second, as `HH:MM:SS`.
    pub fn elapsed_hms(&self) -> String {
        let secs = (self.elapsed + Duration::from_millis(500)).as_secs();
        format!("{:02}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
    }
}

/// Submits payloads to `<host>[:port]/upload` over a `Transport`.
#[derive(Debug)]
pub struct Submitter<T = ProxiedTransport> {
    transport: Arc<T>,
}

impl<T> Clone for Submitter<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl Submitter<ProxiedTransport> {
    /// Submitter routed through the local Tor SOCKS port with a 30 s timeout.
    pub fn over_tor() -> Result<Self, SubmitError> {
        Self::with_proxy(ProxyConfig::default())
    }

    pub fn with_proxy(config: ProxyConfig) -> Result<Self, SubmitError> {
        Ok(Self::new(ProxiedTransport::new(config)?))
    }
}

impl<T: Transport + 'static> Submitter<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `payload` to `host[:port]/upload` and wait for the answer.
    pub fn submit(&self, host: &str, port: &str, payload: &[u8]) -> SubmissionResult {
        let started = Instant::now();
        let destination = Destination::compose(host, port);

        let outcome = build_upload(&destination, payload)
            .and_then(|request| self.transport.execute(&request))
            .and_then(check_status);

        match outcome {
            Ok(()) => {
                let submitted = Submitted {
                    elapsed: started.elapsed(),
                };
                info!(
                    destination = %destination,
                    bytes = payload.len(),
                    elapsed = %submitted.elapsed_hms(),
                    "message sent"
                );
                Ok(submitted)
            }
            Err(err) => {
                warn!(destination = %destination, kind = err.kind(), error = %err, "submission failed");
                Err(err)
            }
        }
    }

    /// Run `submit` on a background thread and hand the result to `on_complete`.
    ///
    /// `on_complete` runs exactly once, on the background thread.
    pub fn submit_with<F>(
        &self,
        host: impl Into<String>,
        port: impl Into<String>,
        payload: impl Into<Vec<u8>>,
        on_complete: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(SubmissionResult) + Send + 'static,
    {
        let submitter = self.clone();
        let host = host.into();
        let port = port.into();
        let payload = payload.into();
        thread::spawn(move || {
            let result = submitter.submit(&host, &port, &payload);
            on_complete(result);
        })
    }

    /// Run `submit` on a background thread; the receiver yields the result.
    pub fn submit_async(
        &self,
        host: impl Into<String>,
        port: impl Into<String>,
        payload: impl Into<Vec<u8>>,
    ) -> oneshot::Receiver<SubmissionResult> {
        let (tx, rx) = oneshot::channel();
        self.submit_with(host, port, payload, move |result| {
            // A dropped receiver means the caller stopped caring.
            let _ = tx.send(result);
        });
        rx
    }
}

/// Build the upload request for `destination`.
///
/// Fails with `RequestConstructionFailed` when the URL has no host or does not
/// parse.
pub fn build_upload(destination: &Destination, payload: &[u8]) -> Result<HttpRequest, SubmitError> {
    if destination.authority().is_empty() {
        return Err(SubmitError::RequestConstructionFailed(
            "destination host is empty".to_string(),
        ));
    }
    let uri: ureq::http::Uri = destination
        .as_str()
        .parse()
        .map_err(|e: ureq::http::uri::InvalidUri| {
            SubmitError::RequestConstructionFailed(format!("{destination}: {e}"))
        })?;
    if uri.host().is_none_or(str::is_empty) {
        return Err(SubmitError::RequestConstructionFailed(format!(
            "{destination}: missing host"
        )));
    }

    Ok(HttpRequest {
        url: destination.as_str().to_string(),
        headers: vec![(
            "Content-Type".to_string(),
            "application/octet-stream".to_string(),
        )],
        body: payload.to_vec(),
    })
}

/// Only 200 counts as delivered; anything else carries the server's answer back.
pub fn check_status(response: HttpResponse) -> Result<(), SubmitError> {
    if response.status == 200 {
        return Ok(());
    }
    Err(SubmitError::ServerRejected {
        status: response.status,
        body: response.body,
    })
}
