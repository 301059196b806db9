//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! `FfiSubmissionResult` flattens the core's `Result<Submitted, SubmitError>`
//! into one envelope: an error code, an optional message, the HTTP status and
//! response body for server rejections, and the elapsed time on success.
//! Strings handed to C are heap-allocated `CString`s owned by the caller until
//! passed back to `qm_free_result` / `qm_free_string`.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use quickmail_core::{SubmissionResult, SubmitError};

/// Opaque handle to a `Submitter`. C callers receive a pointer to this and pass
/// it back into every submit call.
pub struct FfiSubmitter {
    pub(crate) inner: quickmail_core::Submitter,
}

/// Called once from a worker thread when an async submission finishes.
///
/// The callee owns `result` and must release it with `qm_free_result`.
pub type FfiSubmitCallback = extern "C" fn(result: *mut FfiSubmissionResult, user_data: *mut c_void);

/// Error codes returned in `FfiSubmissionResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    ProxyUnavailable = 1,
    RequestConstruction = 2,
    Transport = 3,
    ServerRejected = 4,
    Panic = 5,
    NullArg = 6,
}

/// Result envelope for `qm_submit` and the async callback.
///
/// On success `error_code` is `Ok`, both strings are null and `elapsed_ms`
/// holds the wall-clock duration. On `ServerRejected`, `http_status` and
/// `response_body` carry the server's answer. Every failure sets
/// `error_message`.
#[repr(C)]
pub struct FfiSubmissionResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub response_body: *mut c_char,
    pub elapsed_ms: u64,
}

impl FfiSubmissionResult {
    pub(crate) fn from_core(result: SubmissionResult) -> *mut Self {
        let envelope = match result {
            Ok(submitted) => FfiSubmissionResult {
                error_code: FfiErrorCode::Ok,
                error_message: std::ptr::null_mut(),
                http_status: 200,
                response_body: std::ptr::null_mut(),
                elapsed_ms: u64::try_from(submitted.elapsed.as_millis()).unwrap_or(u64::MAX),
            },
            Err(err) => {
                let message = into_c_string(err.to_string());
                let (error_code, http_status, response_body) = match err {
                    SubmitError::ProxyUnavailable(_) => {
                        (FfiErrorCode::ProxyUnavailable, 0, std::ptr::null_mut())
                    }
                    SubmitError::RequestConstructionFailed(_) => {
                        (FfiErrorCode::RequestConstruction, 0, std::ptr::null_mut())
                    }
                    SubmitError::TransportFailed(_) => {
                        (FfiErrorCode::Transport, 0, std::ptr::null_mut())
                    }
                    SubmitError::ServerRejected { status, body } => {
                        (FfiErrorCode::ServerRejected, status, into_c_string(body))
                    }
                };
                FfiSubmissionResult {
                    error_code,
                    error_message: message,
                    http_status,
                    response_body,
                    elapsed_ms: 0,
                }
            }
        };
        Box::into_raw(Box::new(envelope))
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, msg.to_string())
    }

    pub(crate) fn failure(error_code: FfiErrorCode, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiSubmissionResult {
            error_code,
            error_message: into_c_string(msg),
            http_status: 0,
            response_body: std::ptr::null_mut(),
            elapsed_ms: 0,
        }))
    }
}

/// Hand a Rust string to C. Interior NULs cannot be represented and are dropped.
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    let s = if s.contains('\0') { s.replace('\0', "") } else { s };
    CString::new(s).unwrap_or_default().into_raw()
}

/// Caller context carried across to the worker thread.
///
/// The C side promises `user_data` stays valid until the callback fires.
pub(crate) struct UserData(*mut c_void);

impl UserData {
    pub(crate) fn new(ptr: *mut c_void) -> Self {
        Self(ptr)
    }

    pub(crate) fn get(&self) -> *mut c_void {
        self.0
    }
}

unsafe impl Send for UserData {}
