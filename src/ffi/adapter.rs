//! Boundary call adapter: encode, dispatch, copy, release.

use super::buffer::{encode, NativeResponse};
use super::engine::NativeEngine;
use crate::types::{Credential, ModelReference, RawPayload};
use crate::{Error, ErrorContext, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{info, info_span, warn};
use uuid::Uuid;

/// Result of crossing the boundary once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// The engine answered; the native buffer has already been released.
    Payload(RawPayload),
    /// The engine returned null. There is nothing to parse and nothing to free.
    TransportFailure,
}

/// Thread-safety contract of the engine behind an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineConcurrency {
    /// One call at a time per engine identity, across all adapters.
    #[default]
    Serialized,
    /// Unsynchronized calls. Only for engines documented as thread-safe.
    Concurrent,
}

// One lock per engine identity, so two adapters over the same library do not
// race on the engine's process-global state.
static ENGINE_LOCKS: Lazy<Mutex<HashMap<String, Arc<Mutex<()>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn engine_lock(identity: &str) -> Arc<Mutex<()>> {
    // The map only ever grows; a poisoned guard still holds a consistent map.
    let mut locks = ENGINE_LOCKS.lock().unwrap_or_else(PoisonError::into_inner);
    locks
        .entry(identity.to_string())
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}

/// Owns the mechanics of one call into the native engine.
///
/// Cheap to clone; clones share the engine and its lock.
#[derive(Clone)]
pub struct BoundaryAdapter {
    engine: Arc<dyn NativeEngine>,
    lock: Option<Arc<Mutex<()>>>,
}

impl BoundaryAdapter {
    /// Adapter with [`EngineConcurrency::Serialized`].
    pub fn new(engine: Arc<dyn NativeEngine>) -> Self {
        Self::with_concurrency(engine, EngineConcurrency::Serialized)
    }

    pub fn with_concurrency(engine: Arc<dyn NativeEngine>, concurrency: EngineConcurrency) -> Self {
        let lock = match concurrency {
            EngineConcurrency::Serialized => Some(engine_lock(engine.identity())),
            EngineConcurrency::Concurrent => None,
        };
        Self { engine, lock }
    }

    pub fn concurrency(&self) -> EngineConcurrency {
        if self.lock.is_some() {
            EngineConcurrency::Serialized
        } else {
            EngineConcurrency::Concurrent
        }
    }

    pub fn engine(&self) -> &Arc<dyn NativeEngine> {
        &self.engine
    }

    /// Call the engine once and return its payload.
    ///
    /// Dispatches to the authenticated entry point iff `credential` is given.
    /// Strings containing NUL bytes are rejected before any native call.
    pub fn invoke(
        &self,
        text: &str,
        reference: &ModelReference,
        credential: Option<&Credential>,
    ) -> Result<Invocation> {
        let c_text = encode("text", text)?;
        let c_reference = encode("model reference", reference.as_str())?;
        let c_credential = credential
            .map(|c| encode("credential", c.expose()))
            .transpose()?;

        let entry_point = if c_credential.is_some() {
            "tokenize_with_credential"
        } else {
            "tokenize"
        };
        let span = info_span!(
            "native_call",
            call_id = %Uuid::new_v4(),
            entry_point,
            reference = %reference,
        );
        let _span = span.enter();

        // Guards no data; a panic in another call leaves nothing inconsistent.
        let _serialized = self
            .lock
            .as_ref()
            .map(|lock| lock.lock().unwrap_or_else(PoisonError::into_inner));

        info!("invoking native engine");
        // SAFETY: all pointers come from CStrings that live until the end of
        // this function, past the call.
        let ptr = unsafe {
            match &c_credential {
                Some(cred) => self.engine.tokenize_with_credential(
                    c_text.as_ptr(),
                    c_reference.as_ptr(),
                    cred.as_ptr(),
                ),
                None => self.engine.tokenize(c_text.as_ptr(), c_reference.as_ptr()),
            }
        };

        // SAFETY: `ptr` was just returned by this engine and is owned by nobody else.
        let response = match unsafe { NativeResponse::from_raw(ptr, self.engine.as_ref()) } {
            Some(response) => response,
            None => {
                warn!("native engine returned no response");
                return Ok(Invocation::TransportFailure);
            }
        };
        let payload = response.copy_payload();
        // Release while still holding the engine lock.
        drop(response);

        Ok(Invocation::Payload(payload))
    }

    /// Like [`invoke`](Self::invoke), on a blocking worker thread with an
    /// optional bound on the wait.
    ///
    /// The native call itself cannot be cancelled. When the limit expires the
    /// caller gets [`Error::Timeout`] while the worker runs on; it still
    /// releases its response buffer when the engine returns.
    pub async fn invoke_with_timeout(
        &self,
        text: String,
        reference: ModelReference,
        credential: Option<Credential>,
        timeout: Option<Duration>,
    ) -> Result<Invocation> {
        let adapter = self.clone();
        let task = tokio::task::spawn_blocking(move || {
            adapter.invoke(&text, &reference, credential.as_ref())
        });

        let joined = match timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    let after_ms = whole_millis(limit);
                    warn!(after_ms, "native call timed out");
                    return Err(Error::Timeout { after_ms });
                }
            },
            None => task.await,
        };

        joined.map_err(|e| {
            Error::runtime_with_context(
                "native call worker failed",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("boundary_adapter"),
            )
        })?
    }
}

// Saturates instead of truncating for limits beyond u64 milliseconds.
fn whole_millis(limit: Duration) -> u64 {
    u64::try_from(limit.as_millis()).unwrap_or(u64::MAX)
}

impl std::fmt::Debug for BoundaryAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundaryAdapter")
            .field("engine", &self.engine.identity())
            .field("concurrency", &self.concurrency())
            .finish()
    }
}
