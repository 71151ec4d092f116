//! # Credential Gating
//!
//! Decides, before a call, whether a model reference needs a credential and
//! where that credential comes from. The bridge has no built-in knowledge of
//! which models are gated: callers supply a [`GatingPolicy`].
//!
//! A missing credential is not an error. [`preflight`] yields a
//! [`CredentialWarning`] and the call proceeds unauthenticated; the engine
//! remains the authority on whether access is granted.

use crate::types::{Credential, ModelReference};
use crate::{Error, ErrorContext, Result};
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_CREDENTIAL_ENV: &str = "HF_TOKEN";

/// Decides which model references need a credential.
pub trait GatingPolicy: Send + Sync {
    fn requires_credential(&self, reference: &ModelReference) -> bool;
}

/// Nothing is gated.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGating;

impl GatingPolicy for NoGating {
    fn requires_credential(&self, _reference: &ModelReference) -> bool {
        false
    }
}

impl<F> GatingPolicy for F
where
    F: Fn(&ModelReference) -> bool + Send + Sync,
{
    fn requires_credential(&self, reference: &ModelReference) -> bool {
        self(reference)
    }
}

/// Gates references matching any of a set of regular expressions.
#[derive(Debug, Clone, Default)]
pub struct PatternGating {
    patterns: Vec<Regex>,
}

impl PatternGating {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .enumerate()
            .map(|(i, p)| {
                Regex::new(p.as_ref()).map_err(|e| {
                    Error::configuration_with_context(
                        format!("invalid gating pattern '{}'", p.as_ref()),
                        ErrorContext::new()
                            .with_field_path(format!("gated_patterns[{}]", i))
                            .with_details(e.to_string())
                            .with_source("gating"),
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl GatingPolicy for PatternGating {
    fn requires_credential(&self, reference: &ModelReference) -> bool {
        self.patterns.iter().any(|p| p.is_match(reference.as_str()))
    }
}

/// Where credentials are read from. Consulted once per gated call.
///
/// Lookup order: OS keyring (only when a service name is configured), then
/// the environment variable.
#[derive(Clone)]
pub struct CredentialSource {
    env_var: String,
    keyring: Option<KeyringSlot>,
}

#[derive(Clone)]
struct KeyringSlot {
    service: String,
    entry: Arc<keyring::Entry>,
}

impl CredentialSource {
    pub fn from_env(var: impl Into<String>) -> Self {
        Self {
            env_var: var.into(),
            keyring: None,
        }
    }

    /// Also try the OS keyring entry `(service, env_var)` before the environment.
    ///
    /// If the platform store cannot create the entry, the keyring is skipped
    /// and only the environment is consulted.
    pub fn with_keyring(mut self, service: impl Into<String>) -> Self {
        let service = service.into();
        self.keyring = match keyring::Entry::new(&service, &self.env_var) {
            Ok(entry) => Some(KeyringSlot {
                service,
                entry: Arc::new(entry),
            }),
            Err(e) => {
                warn!(service = %service, error = %e, "keyring unavailable, using environment only");
                None
            }
        };
        self
    }

    pub fn env_var(&self) -> &str {
        &self.env_var
    }

    pub fn keyring_service(&self) -> Option<&str> {
        self.keyring.as_ref().map(|k| k.service.as_str())
    }

    /// The keyring entry consulted by [`fetch`](Self::fetch), e.g. to store a token.
    pub fn keyring_entry(&self) -> Option<&keyring::Entry> {
        self.keyring.as_ref().map(|k| k.entry.as_ref())
    }

    pub fn fetch(&self) -> Option<Credential> {
        if let Some(slot) = &self.keyring {
            match slot.entry.get_password() {
                Ok(secret) => {
                    if let Some(cred) = Credential::new(secret) {
                        debug!(service = %slot.service, "credential found in keyring");
                        return Some(cred);
                    }
                }
                Err(keyring::Error::NoEntry) => {
                    debug!(service = %slot.service, "no keyring entry, trying environment");
                }
                Err(e) => {
                    debug!(service = %slot.service, error = %e, "keyring lookup failed");
                }
            }
        }
        std::env::var(&self.env_var).ok().and_then(Credential::new)
    }
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSource")
            .field("env_var", &self.env_var)
            .field("keyring_service", &self.keyring_service())
            .finish()
    }
}

impl Default for CredentialSource {
    fn default() -> Self {
        Self::from_env(DEFAULT_CREDENTIAL_ENV)
    }
}

/// Caller-facing notice that a gated model is about to be called without a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialWarning {
    pub reference: ModelReference,
    pub env_var: String,
}

impl std::fmt::Display for CredentialWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "model '{}' requires authentication; set {} to provide a credential. \
             Attempting tokenization without authentication.",
            self.reference, self.env_var
        )
    }
}

/// Result of the pre-call gating check.
#[derive(Debug, Clone)]
pub enum GateDecision {
    /// Reference is not gated; call the standard entry point.
    Open,
    /// Reference is gated and a credential is available.
    Authenticated(Credential),
    /// Reference is gated but no credential is configured.
    MissingCredential(CredentialWarning),
}

impl GateDecision {
    pub fn credential(&self) -> Option<&Credential> {
        match self {
            GateDecision::Authenticated(c) => Some(c),
            _ => None,
        }
    }

    pub fn warning(&self) -> Option<&CredentialWarning> {
        match self {
            GateDecision::MissingCredential(w) => Some(w),
            _ => None,
        }
    }
}

/// Check `reference` against `policy` and fetch a credential if needed.
pub fn preflight(
    policy: &dyn GatingPolicy,
    source: &CredentialSource,
    reference: &ModelReference,
) -> GateDecision {
    if !policy.requires_credential(reference) {
        return GateDecision::Open;
    }
    match source.fetch() {
        Some(credential) => {
            debug!(reference = %reference, "gated model, credential available");
            GateDecision::Authenticated(credential)
        }
        None => {
            let warning = CredentialWarning {
                reference: reference.clone(),
                env_var: source.env_var().to_string(),
            };
            warn!("{}", warning);
            GateDecision::MissingCredential(warning)
        }
    }
}
