//! Anonymous message submission core for quickmail.
//!
//! # Overview
//! Two independent pieces:
//! - the transport submitter, which POSTs a payload to `<host>[:port]/upload`
//!   through a local SOCKS5 proxy and classifies the outcome;
//! - the header encoder, which turns a subject line into folded RFC 2047
//!   encoded-words.
//!
//! # Design
//! - `Submitter` builds an `HttpRequest` as plain data, hands it to a
//!   `Transport`, and classifies the returned `HttpResponse`. The production
//!   transport is `ProxiedTransport` (ureq over SOCKS5); tests swap in doubles.
//! - Nothing here reads configuration files. Callers pass the destination host
//!   and port they loaded themselves.
//! - The submitter never falls back to a direct connection. If the proxy cannot
//!   be used the call fails.

pub mod destination;
pub mod error;
pub mod header;
pub mod http;
pub mod submitter;
pub mod transport;

pub use destination::Destination;
pub use error::SubmitError;
pub use header::{encode_subject, insert_subject};
pub use http::{HttpRequest, HttpResponse};
pub use submitter::{build_upload, check_status, SubmissionResult, Submitted, Submitter};
pub use transport::{ProxiedTransport, ProxyConfig, Transport, DEFAULT_PROXY_ADDR, DEFAULT_TIMEOUT};
