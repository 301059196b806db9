//! HTTP request/response described as plain data.
//!
//! # Design
//! The submitter builds exactly one kind of request, a POST of raw bytes, so
//! there is no method enum. Keeping the request as data means the final URL and
//! headers can be inspected before anything touches the network, and a test
//! transport can record them.

/// The single upload request, ready to be executed by a `Transport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// What came back from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}
