//! Native engine entry points.

use crate::{Error, Result};
use libloading::Library;
use serde::{Deserialize, Serialize};
use std::os::raw::c_char;
use std::path::{Path, PathBuf};
use tracing::info;

/// The three C entry points exposed by a tokenization engine.
///
/// Implemented by [`DynamicEngine`] for shared libraries and by test doubles.
pub trait NativeEngine: Send + Sync {
    /// Stable name of the underlying engine instance. Adapters bound to
    /// engines with the same identity share one serialization lock.
    fn identity(&self) -> &str;

    /// # Safety
    ///
    /// `text` and `model_ref` must be valid NUL-terminated strings for the
    /// duration of the call.
    unsafe fn tokenize(&self, text: *const c_char, model_ref: *const c_char) -> *mut c_char;

    /// # Safety
    ///
    /// All three pointers must be valid NUL-terminated strings for the
    /// duration of the call.
    unsafe fn tokenize_with_credential(
        &self,
        text: *const c_char,
        model_ref: *const c_char,
        credential: *const c_char,
    ) -> *mut c_char;

    /// # Safety
    ///
    /// `response` must be a non-null pointer previously returned by one of
    /// this engine's tokenize entry points and not yet released.
    unsafe fn free_response(&self, response: *mut c_char);
}

/// Exported symbol names of a shared-library engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSymbols {
    pub tokenize: String,
    pub tokenize_with_credential: String,
    pub free_response: String,
}

impl Default for EngineSymbols {
    fn default() -> Self {
        Self {
            tokenize: "tokenize_text".to_string(),
            tokenize_with_credential: "tokenize_text_with_token".to_string(),
            free_response: "free_string".to_string(),
        }
    }
}

type TokenizeFn = unsafe extern "C" fn(*const c_char, *const c_char) -> *mut c_char;
type TokenizeWithCredentialFn =
    unsafe extern "C" fn(*const c_char, *const c_char, *const c_char) -> *mut c_char;
type FreeResponseFn = unsafe extern "C" fn(*mut c_char);

/// Engine loaded from a shared library at runtime.
pub struct DynamicEngine {
    identity: String,
    tokenize: TokenizeFn,
    tokenize_with_credential: TokenizeWithCredentialFn,
    free_response: FreeResponseFn,
    // Declared last: the function pointers above must not outlive it.
    _library: Library,
}

impl DynamicEngine {
    /// Load with the default symbol names.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_symbols(path, &EngineSymbols::default())
    }

    pub fn load_with_symbols(path: impl AsRef<Path>, symbols: &EngineSymbols) -> Result<Self> {
        let path = path.as_ref();
        let load_err = |reason: String| Error::EngineLoad {
            path: path.display().to_string(),
            reason,
        };

        // SAFETY: loading runs the library's initializers; the path is
        // configured by the caller, who vouches for the library.
        let library = unsafe { Library::new(path) }.map_err(|e| load_err(e.to_string()))?;

        // SAFETY: the signatures match the documented engine ABI. The copied
        // function pointers are stored next to `library`, which outlives them.
        let (tokenize, tokenize_with_credential, free_response) = unsafe {
            let tokenize = *library
                .get::<TokenizeFn>(symbols.tokenize.as_bytes())
                .map_err(|e| load_err(format!("symbol '{}': {}", symbols.tokenize, e)))?;
            let tokenize_with_credential = *library
                .get::<TokenizeWithCredentialFn>(symbols.tokenize_with_credential.as_bytes())
                .map_err(|e| {
                    load_err(format!(
                        "symbol '{}': {}",
                        symbols.tokenize_with_credential, e
                    ))
                })?;
            let free_response = *library
                .get::<FreeResponseFn>(symbols.free_response.as_bytes())
                .map_err(|e| load_err(format!("symbol '{}': {}", symbols.free_response, e)))?;
            (tokenize, tokenize_with_credential, free_response)
        };

        let identity = canonical_identity(path);
        info!(library = %identity, "loaded native tokenization engine");

        Ok(Self {
            identity,
            tokenize,
            tokenize_with_credential,
            free_response,
            _library: library,
        })
    }
}

fn canonical_identity(path: &Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .display()
        .to_string()
}

impl std::fmt::Debug for DynamicEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicEngine")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl NativeEngine for DynamicEngine {
    fn identity(&self) -> &str {
        &self.identity
    }

    unsafe fn tokenize(&self, text: *const c_char, model_ref: *const c_char) -> *mut c_char {
        (self.tokenize)(text, model_ref)
    }

    unsafe fn tokenize_with_credential(
        &self,
        text: *const c_char,
        model_ref: *const c_char,
        credential: *const c_char,
    ) -> *mut c_char {
        (self.tokenize_with_credential)(text, model_ref, credential)
    }

    unsafe fn free_response(&self, response: *mut c_char) {
        (self.free_response)(response)
    }
}
