//! Test doubles for the quickmail upload path.
//!
//! `app`/`run` serve an upload sink: `POST /upload` records the raw body and
//! answers according to an `UploadPolicy`, `GET /uploads` lists what was
//! recorded. `socks` holds a small SOCKS5 relay so the client's proxy path can
//! be exercised without a Tor daemon.

pub mod socks;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub use socks::{run_socks5, ConnectLog};

/// One request received on `/upload`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Upload {
    pub id: Uuid,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub accepted: bool,
}

/// How the sink answers uploads.
#[derive(Clone, Debug, Default)]
pub enum UploadPolicy {
    /// 200 with body `ok`.
    #[default]
    Accept,
    /// Fixed status and body, e.g. 500 `denied`.
    Reject { status: u16, body: String },
}

/// Shared sink state: the policy and everything received so far.
#[derive(Clone, Debug, Default)]
pub struct Sink {
    uploads: Arc<RwLock<Vec<Upload>>>,
    policy: UploadPolicy,
}

impl Sink {
    pub fn new(policy: UploadPolicy) -> Self {
        Self {
            uploads: Arc::default(),
            policy,
        }
    }

    pub fn rejecting(status: u16, body: impl Into<String>) -> Self {
        Self::new(UploadPolicy::Reject {
            status,
            body: body.into(),
        })
    }

    pub async fn uploads(&self) -> Vec<Upload> {
        self.uploads.read().await.clone()
    }

    /// Same as `uploads` for callers outside the runtime.
    ///
    /// Only call this from synchronous code: `blocking_read` panics when the
    /// current thread is driving a tokio runtime.
    pub fn uploads_blocking(&self) -> Vec<Upload> {
        self.uploads.blocking_read().clone()
    }
}

/// Sink that accepts everything.
pub fn app() -> Router {
    app_with(Sink::default())
}

pub fn app_with(sink: Sink) -> Router {
    Router::new()
        .route("/upload", post(receive_upload))
        .route("/uploads", get(list_uploads))
        .with_state(sink)
}

pub async fn run(listener: TcpListener, sink: Sink) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(sink)).await
}

async fn receive_upload(
    State(sink): State<Sink>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let (status, reply) = match &sink.policy {
        UploadPolicy::Accept => (StatusCode::OK, "ok".to_string()),
        UploadPolicy::Reject { status, body } => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body.clone(),
        ),
    };

    info!(bytes = body.len(), status = status.as_u16(), "upload received");
    sink.uploads.write().await.push(Upload {
        id: Uuid::new_v4(),
        content_type,
        body: body.to_vec(),
        accepted: status == StatusCode::OK,
    });

    (status, reply)
}

async fn list_uploads(State(sink): State<Sink>) -> Json<Vec<Upload>> {
    Json(sink.uploads().await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocking_snapshot_works_outside_runtime() {
        assert!(Sink::default().uploads_blocking().is_empty());
    }

    #[tokio::test]
    #[should_panic]
    async fn blocking_snapshot_panics_inside_runtime() {
        let _ = Sink::default().uploads_blocking();
    }

    #[test]
    fn default_policy_accepts() {
        assert!(matches!(UploadPolicy::default(), UploadPolicy::Accept));
    }

    #[test]
    fn rejecting_sink_keeps_status_and_body() {
        let sink = Sink::rejecting(500, "denied");
        match sink.policy {
            UploadPolicy::Reject { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "denied");
            }
            UploadPolicy::Accept => panic!("expected reject policy"),
        }
    }

    #[test]
    fn upload_serializes_to_json() {
        let upload = Upload {
            id: Uuid::nil(),
            content_type: Some("application/octet-stream".to_string()),
            body: b"hi".to_vec(),
            accepted: true,
        };
        let json = serde_json::to_value(&upload).unwrap();
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["content_type"], "application/octet-stream");
        assert_eq!(json["body"], serde_json::json!([104, 105]));
        assert_eq!(json["accepted"], true);
    }

    #[test]
    fn new_sink_is_empty() {
        assert!(Sink::default().uploads_blocking().is_empty());
    }
}
