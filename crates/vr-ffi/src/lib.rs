//! C FFI bindings for vr-core
//!
//! This crate provides a C-compatible API for hosts (an upload UI, a desktop
//! shell) that keep one reference lookup loaded and run transaction files
//! against it. Exports come back as CSV or JSON strings.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::PathBuf;
use std::ptr;
use tracing::warn;

/// Opaque handle to a loaded reference lookup
pub struct FfiLookup {
    inner: vr_core::CachedLookup,
}

/// Opaque handle to the result of one run
pub struct FfiRunOutput {
    inner: vr_core::RunOutput,
}

unsafe fn path_arg(s: *const c_char) -> Option<PathBuf> {
    if s.is_null() {
        return None;
    }
    CStr::from_ptr(s).to_str().ok().map(PathBuf::from)
}

fn into_c_string(s: String) -> *mut c_char {
    CString::new(s)
        .map(CString::into_raw)
        .unwrap_or(ptr::null_mut())
}

/// Load a reference CSV and build its lookup
///
/// # Safety
/// - `path` must be a valid C string
/// - Returns null on error
/// - Caller must free the handle with `vr_lookup_free`
#[no_mangle]
pub unsafe extern "C" fn vr_lookup_load(path: *const c_char) -> *mut FfiLookup {
    let Some(path) = path_arg(path) else {
        return ptr::null_mut();
    };

    match vr_core::CachedLookup::load(&path) {
        Ok(inner) => Box::into_raw(Box::new(FfiLookup { inner })),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load reference");
            ptr::null_mut()
        }
    }
}

/// Rebuild the lookup if its reference file changed
///
/// Returns 1 if rebuilt, 0 if already current, -1 on error (the previous
/// lookup stays in place).
///
/// # Safety
/// - `lookup` must be a valid pointer returned by `vr_lookup_load`
#[no_mangle]
pub unsafe extern "C" fn vr_lookup_refresh(lookup: *mut FfiLookup) -> i32 {
    if lookup.is_null() {
        return -1;
    }

    match (*lookup).inner.refresh() {
        Ok(true) => 1,
        Ok(false) => 0,
        Err(e) => {
            warn!(error = %e, "failed to refresh reference");
            -1
        }
    }
}

/// Number of keys in the lookup
///
/// # Safety
/// - `lookup` must be a valid pointer returned by `vr_lookup_load`
#[no_mangle]
pub unsafe extern "C" fn vr_lookup_len(lookup: *const FfiLookup) -> usize {
    if lookup.is_null() {
        return 0;
    }
    (*lookup).inner.lookup().len()
}

/// Free a lookup
///
/// # Safety
/// - `lookup` must be a valid pointer returned by `vr_lookup_load` or null
#[no_mangle]
pub unsafe extern "C" fn vr_lookup_free(lookup: *mut FfiLookup) {
    if !lookup.is_null() {
        drop(Box::from_raw(lookup));
    }
}

/// Resolve and group a transaction CSV against a loaded lookup
///
/// # Safety
/// - `lookup` must be a valid pointer returned by `vr_lookup_load`
/// - `input_path` must be a valid C string
/// - Returns null on error (unreadable file, missing columns)
/// - Caller must free the handle with `vr_output_free`
#[no_mangle]
pub unsafe extern "C" fn vr_process(
    lookup: *const FfiLookup,
    input_path: *const c_char,
) -> *mut FfiRunOutput {
    if lookup.is_null() {
        return ptr::null_mut();
    }
    let Some(input) = path_arg(input_path) else {
        return ptr::null_mut();
    };

    let result = vr_core::parse_csv(&input)
        .and_then(|table| vr_core::run(&(*lookup).inner.lookup(), &table));

    match result {
        Ok(inner) => Box::into_raw(Box::new(FfiRunOutput { inner })),
        Err(e) => {
            warn!(input = %input.display(), error = %e, "failed to process transactions");
            ptr::null_mut()
        }
    }
}

/// Number of line items in a run output
///
/// # Safety
/// - `output` must be a valid pointer returned by `vr_process`
#[no_mangle]
pub unsafe extern "C" fn vr_output_line_item_count(output: *const FfiRunOutput) -> usize {
    if output.is_null() {
        return 0;
    }
    (*output).inner.line_items.len()
}

/// Number of vendor rows in a run output's summary
///
/// # Safety
/// - `output` must be a valid pointer returned by `vr_process`
#[no_mangle]
pub unsafe extern "C" fn vr_output_summary_count(output: *const FfiRunOutput) -> usize {
    if output.is_null() {
        return 0;
    }
    (*output).inner.summary.len()
}

/// The line-item export as CSV text
///
/// # Safety
/// - `output` must be a valid pointer returned by `vr_process`
/// - Returns null on error
/// - Caller must free the returned string with `vr_free_string`
#[no_mangle]
pub unsafe extern "C" fn vr_output_line_items_csv(output: *const FfiRunOutput) -> *mut c_char {
    if output.is_null() {
        return ptr::null_mut();
    }

    vr_core::line_items_to_string(&(*output).inner.line_items)
        .map(into_c_string)
        .unwrap_or(ptr::null_mut())
}

/// The grouped export as CSV text
///
/// # Safety
/// - `output` must be a valid pointer returned by `vr_process`
/// - Returns null on error
/// - Caller must free the returned string with `vr_free_string`
#[no_mangle]
pub unsafe extern "C" fn vr_output_summary_csv(output: *const FfiRunOutput) -> *mut c_char {
    if output.is_null() {
        return ptr::null_mut();
    }

    vr_core::summary_to_string(&(*output).inner.summary)
        .map(into_c_string)
        .unwrap_or(ptr::null_mut())
}

/// The grouped export plus the run report as JSON
///
/// Shape: `{"summary": [...], "report": {...}}`.
///
/// # Safety
/// - `output` must be a valid pointer returned by `vr_process`
/// - Returns null on error
/// - Caller must free the returned string with `vr_free_string`
#[no_mangle]
pub unsafe extern "C" fn vr_output_summary_json(output: *const FfiRunOutput) -> *mut c_char {
    if output.is_null() {
        return ptr::null_mut();
    }

    let inner = &(*output).inner;
    let value = serde_json::json!({
        "summary": inner.summary,
        "report": inner.report,
    });

    serde_json::to_string(&value)
        .map(into_c_string)
        .unwrap_or(ptr::null_mut())
}

/// Free a run output
///
/// # Safety
/// - `output` must be a valid pointer returned by `vr_process` or null
#[no_mangle]
pub unsafe extern "C" fn vr_output_free(output: *mut FfiRunOutput) {
    if !output.is_null() {
        drop(Box::from_raw(output));
    }
}

/// Free a string returned by other FFI functions
///
/// # Safety
/// - `s` must be a valid pointer returned by a vr_* function or null
#[no_mangle]
pub unsafe extern "C" fn vr_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
