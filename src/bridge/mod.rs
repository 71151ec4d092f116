//! Caller-facing bridge.
//!
//! Wires the resolver, the gating preflight, the boundary adapter and the
//! decoder into one call: hint → reference → native call → outcome.

mod builder;

pub use builder::TokenizerBridgeBuilder;

use crate::config::BridgeConfig;
use crate::ffi::{BoundaryAdapter, Invocation};
use crate::gating::{self, CredentialSource, CredentialWarning, GateDecision, GatingPolicy};
use crate::protocol::{decode, BridgeOutcome};
use crate::resolver::Resolver;
use crate::types::{Credential, ModelReference};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Outcome of [`TokenizerBridge::tokenize_gated`].
#[derive(Debug, Clone)]
pub struct GatedOutcome {
    pub reference: ModelReference,
    /// Set when the reference is gated and no credential was found. Emitted
    /// before the call was made; independent of `outcome`.
    pub warning: Option<CredentialWarning>,
    pub outcome: BridgeOutcome,
}

pub struct TokenizerBridge {
    adapter: BoundaryAdapter,
    resolver: Resolver,
    gating: Arc<dyn GatingPolicy>,
    credentials: CredentialSource,
    timeout: Option<Duration>,
}

impl TokenizerBridge {
    pub fn builder() -> TokenizerBridgeBuilder {
        TokenizerBridgeBuilder::new()
    }

    /// Build a bridge from configuration; the config must name a library.
    pub fn from_config(cfg: &BridgeConfig) -> Result<Self> {
        TokenizerBridgeBuilder::from_config(cfg)?.build()
    }

    /// Build from `TOKENIZER_BRIDGE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_config(&BridgeConfig::from_env()?)
    }

    pub fn resolve(&self, model_hint: Option<&str>) -> ModelReference {
        self.resolver.resolve(model_hint)
    }

    pub fn adapter(&self) -> &BoundaryAdapter {
        &self.adapter
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Tokenize through the standard (unauthenticated) entry point.
    pub fn tokenize(&self, text: &str, model_hint: Option<&str>) -> Result<BridgeOutcome> {
        let reference = self.resolve(model_hint);
        let invocation = self.adapter.invoke(text, &reference, None)?;
        Ok(finish(&reference, invocation))
    }

    /// Tokenize through the authenticated entry point.
    pub fn tokenize_with_credential(
        &self,
        text: &str,
        model_hint: Option<&str>,
        credential: &Credential,
    ) -> Result<BridgeOutcome> {
        let reference = self.resolve(model_hint);
        let invocation = self.adapter.invoke(text, &reference, Some(credential))?;
        Ok(finish(&reference, invocation))
    }

    /// Resolve, consult the gating policy, then call.
    ///
    /// Gated references use the credential source; if it has nothing the
    /// warning is recorded and the standard entry point is used anyway.
    pub fn tokenize_gated(&self, text: &str, model_hint: Option<&str>) -> Result<GatedOutcome> {
        let reference = self.resolve(model_hint);
        let decision = self.preflight(&reference);
        let invocation = self
            .adapter
            .invoke(text, &reference, decision.credential())?;
        let outcome = finish(&reference, invocation);
        Ok(GatedOutcome {
            reference,
            warning: into_warning(decision),
            outcome,
        })
    }

    /// Check whether `reference` needs a credential and fetch it.
    pub fn preflight(&self, reference: &ModelReference) -> GateDecision {
        gating::preflight(self.gating.as_ref(), &self.credentials, reference)
    }

    /// [`tokenize`](Self::tokenize) off the async executor, bounded by the
    /// configured timeout.
    pub async fn tokenize_async(
        &self,
        text: &str,
        model_hint: Option<&str>,
    ) -> Result<BridgeOutcome> {
        let reference = self.resolve(model_hint);
        let invocation = self
            .adapter
            .invoke_with_timeout(text.to_string(), reference.clone(), None, self.timeout)
            .await?;
        Ok(finish(&reference, invocation))
    }

    pub async fn tokenize_with_credential_async(
        &self,
        text: &str,
        model_hint: Option<&str>,
        credential: Credential,
    ) -> Result<BridgeOutcome> {
        let reference = self.resolve(model_hint);
        let invocation = self
            .adapter
            .invoke_with_timeout(
                text.to_string(),
                reference.clone(),
                Some(credential),
                self.timeout,
            )
            .await?;
        Ok(finish(&reference, invocation))
    }

    pub async fn tokenize_gated_async(
        &self,
        text: &str,
        model_hint: Option<&str>,
    ) -> Result<GatedOutcome> {
        let reference = self.resolve(model_hint);
        let decision = self.preflight(&reference);
        let credential = decision.credential().cloned();
        let invocation = self
            .adapter
            .invoke_with_timeout(text.to_string(), reference.clone(), credential, self.timeout)
            .await?;
        let outcome = finish(&reference, invocation);
        Ok(GatedOutcome {
            reference,
            warning: into_warning(decision),
            outcome,
        })
    }
}

impl std::fmt::Debug for TokenizerBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenizerBridge")
            .field("adapter", &self.adapter)
            .field("resolver", &self.resolver)
            .field("credential_env", &self.credentials.env_var())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn finish(reference: &ModelReference, invocation: Invocation) -> BridgeOutcome {
    let outcome = match invocation {
        Invocation::Payload(raw) => decode(raw),
        Invocation::TransportFailure => BridgeOutcome::TransportFailure,
    };
    info!(reference = %reference, outcome = outcome.kind(), "tokenization finished");
    outcome
}

fn into_warning(decision: GateDecision) -> Option<CredentialWarning> {
    match decision {
        GateDecision::MissingCredential(warning) => Some(warning),
        GateDecision::Open | GateDecision::Authenticated(_) => None,
    }
}
