//! C-ABI wrapper around `quickmail-core`.
//!
//! # Overview
//! Lets a UI shell written in any language with a C FFI encode subjects and
//! submit messages through the Tor proxy without linking to Rust directly.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `qm_submit` blocks; `qm_submit_async` returns immediately and invokes the
//!   C callback exactly once from a worker thread. The UI shell is responsible
//!   for marshaling that back onto its own event loop.
//! - The C caller owns all returned pointers and must call the matching
//!   `qm_*_free` / `qm_free_*` function to release them.

pub mod types;

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use quickmail_core::{ProxyConfig, Submitter};

use types::*;

/// Borrow a C string as `&str`. Invalid UTF-8 reads as empty.
///
/// # Safety
/// `ptr` must be non-null and point to a NUL-terminated string.
unsafe fn read_str<'a>(ptr: *const c_char) -> &'a str {
    unsafe { CStr::from_ptr(ptr) }.to_str().unwrap_or("")
}

/// Optional C string: null reads as empty.
unsafe fn read_opt_str<'a>(ptr: *const c_char) -> &'a str {
    if ptr.is_null() {
        ""
    } else {
        unsafe { read_str(ptr) }
    }
}

/// Copy the payload out of C memory. A null pointer is only valid with length 0.
unsafe fn read_payload(payload: *const u8, len: usize) -> Option<Vec<u8>> {
    if payload.is_null() {
        return (len == 0).then(Vec::new);
    }
    Some(unsafe { std::slice::from_raw_parts(payload, len) }.to_vec())
}

// ---------------------------------------------------------------------------
// Subject encoding
// ---------------------------------------------------------------------------

/// Encode `subject` as a folded RFC 2047 header value.
///
/// Returns null if `subject` is null or not valid UTF-8. An empty subject
/// yields an empty string. Free the result with `qm_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn qm_encode_subject(subject: *const c_char) -> *mut c_char {
    catch_unwind(|| {
        if subject.is_null() {
            return std::ptr::null_mut();
        }
        let Ok(text) = unsafe { CStr::from_ptr(subject) }.to_str() else {
            return std::ptr::null_mut();
        };
        into_c_string(quickmail_core::encode_subject(text))
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Submitter lifecycle
// ---------------------------------------------------------------------------

/// Create a submitter routed through the SOCKS5 proxy at `proxy_addr`.
///
/// `proxy_addr` may be null for the local Tor default (`127.0.0.1:9050`);
/// `timeout_secs` of 0 means the default 30 seconds. Returns null if the proxy
/// cannot be configured. Free with `qm_submitter_free`.
#[unsafe(no_mangle)]
pub extern "C" fn qm_submitter_new(proxy_addr: *const c_char, timeout_secs: u32) -> *mut FfiSubmitter {
    catch_unwind(AssertUnwindSafe(|| {
        let mut config = if proxy_addr.is_null() {
            ProxyConfig::default()
        } else {
            ProxyConfig::new(unsafe { read_str(proxy_addr) })
        };
        if timeout_secs > 0 {
            config = config.with_timeout(Duration::from_secs(u64::from(timeout_secs)));
        }
        match Submitter::with_proxy(config) {
            Ok(inner) => Box::into_raw(Box::new(FfiSubmitter { inner })),
            Err(_) => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Free a submitter created by `qm_submitter_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn qm_submitter_free(submitter: *mut FfiSubmitter) {
    if !submitter.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(submitter) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// Submit `payload` to `host[:port]/upload` and block until done.
///
/// `port` may be null or empty. A payload that is empty or only whitespace is
/// refused with `RequestConstruction` before anything is sent.
/// Free the result with `qm_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn qm_submit(
    submitter: *const FfiSubmitter,
    host: *const c_char,
    port: *const c_char,
    payload: *const u8,
    payload_len: usize,
) -> *mut FfiSubmissionResult {
    catch_unwind(AssertUnwindSafe(|| {
        if submitter.is_null() {
            return FfiSubmissionResult::null_arg("submitter");
        }
        if host.is_null() {
            return FfiSubmissionResult::null_arg("host");
        }
        let Some(payload) = (unsafe { read_payload(payload, payload_len) }) else {
            return FfiSubmissionResult::null_arg("payload");
        };
        if payload.trim_ascii().is_empty() {
            return FfiSubmissionResult::failure(
                FfiErrorCode::RequestConstruction,
                "message is empty".to_string(),
            );
        }
        let submitter = unsafe { &*submitter };
        let (host, port) = unsafe { (read_str(host), read_opt_str(port)) };
        FfiSubmissionResult::from_core(submitter.inner.submit(host, port, &payload))
    }))
    .unwrap_or_else(|_| FfiSubmissionResult::panic("panic in qm_submit"))
}

/// Submit on a worker thread and report through `callback`.
///
/// Returns `Ok` when the submission was scheduled; `callback` is then invoked
/// exactly once with a result the callee must free. Any other return code means
/// nothing was scheduled and `callback` will not be called. `user_data` is
/// passed through untouched and must stay valid until the callback runs.
#[unsafe(no_mangle)]
pub extern "C" fn qm_submit_async(
    submitter: *const FfiSubmitter,
    host: *const c_char,
    port: *const c_char,
    payload: *const u8,
    payload_len: usize,
    callback: Option<FfiSubmitCallback>,
    user_data: *mut c_void,
) -> FfiErrorCode {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(callback) = callback else {
            return FfiErrorCode::NullArg;
        };
        if submitter.is_null() || host.is_null() {
            return FfiErrorCode::NullArg;
        }
        let Some(payload) = (unsafe { read_payload(payload, payload_len) }) else {
            return FfiErrorCode::NullArg;
        };
        if payload.trim_ascii().is_empty() {
            return FfiErrorCode::RequestConstruction;
        }
        let submitter = unsafe { &*submitter };
        let (host, port) = unsafe { (read_str(host).to_string(), read_opt_str(port).to_string()) };
        let user_data = UserData::new(user_data);

        submitter.inner.submit_with(host, port, payload, move |result| {
            callback(FfiSubmissionResult::from_core(result), user_data.get());
        });
        FfiErrorCode::Ok
    }))
    .unwrap_or(FfiErrorCode::Panic)
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiSubmissionResult`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn qm_free_result(result: *mut FfiSubmissionResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.response_body.is_null() {
            drop(unsafe { CString::from_raw(result.response_body) });
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn qm_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
