//! Buffers crossing the boundary.

use super::engine::NativeEngine;
use crate::types::RawPayload;
use crate::{Error, Result};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr::NonNull;

/// Encode an outbound string as a caller-owned NUL-terminated buffer.
pub(crate) fn encode(field: &'static str, value: &str) -> Result<CString> {
    CString::new(value).map_err(|e| Error::Encoding {
        field,
        reason: format!("interior NUL byte at position {}", e.nul_position()),
    })
}

/// Engine-owned response buffer.
///
/// Released through the engine's `free_response` when dropped, which happens
/// exactly once whatever path the caller takes afterwards.
pub struct NativeResponse<'e> {
    ptr: NonNull<c_char>,
    engine: &'e dyn NativeEngine,
}

impl<'e> NativeResponse<'e> {
    /// Take ownership of a pointer returned by `engine`. `None` for null.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must have been returned by one of `engine`'s tokenize
    /// entry points, must not have been released yet, and must not be
    /// released by anyone else.
    pub unsafe fn from_raw(ptr: *mut c_char, engine: &'e dyn NativeEngine) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr, engine })
    }

    /// Copy the response text into caller-owned memory.
    pub fn copy_payload(&self) -> RawPayload {
        // SAFETY: the engine contract guarantees a NUL-terminated buffer that
        // stays valid until `free_response`, which only runs in `drop`.
        let bytes = unsafe { CStr::from_ptr(self.ptr.as_ptr()) }.to_bytes();
        RawPayload::from_bytes(bytes)
    }
}

impl Drop for NativeResponse<'_> {
    fn drop(&mut self) {
        // SAFETY: `from_raw` took sole ownership of a live engine buffer and
        // `drop` runs once.
        unsafe { self.engine.free_response(self.ptr.as_ptr()) }
    }
}
