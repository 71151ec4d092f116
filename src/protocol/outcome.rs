//! Terminal outcome of a single boundary call.

use crate::types::{DiagnosticLog, RawPayload, TokenizationResult};
use crate::{Error, Result};

/// Exactly one terminal state per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeOutcome {
    Success {
        result: TokenizationResult,
        debug_logs: DiagnosticLog,
    },
    /// The engine produced a well-formed payload carrying an error string.
    SemanticFailure {
        message: String,
        debug_logs: DiagnosticLog,
    },
    /// The payload does not match the wire format, usually a version
    /// mismatch between bridge and engine. The raw text is kept for diagnosis.
    ProtocolFailure { reason: String, raw: RawPayload },
    /// The engine returned no payload.
    TransportFailure,
}

/// Successful call, as returned by [`BridgeOutcome::into_result`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokenized {
    pub result: TokenizationResult,
    pub debug_logs: DiagnosticLog,
}

impl BridgeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BridgeOutcome::Success { .. })
    }

    pub fn result(&self) -> Option<&TokenizationResult> {
        match self {
            BridgeOutcome::Success { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Engine diagnostics attached to the outcome (empty for transport and
    /// protocol failures).
    pub fn debug_logs(&self) -> &[String] {
        match self {
            BridgeOutcome::Success { debug_logs, .. }
            | BridgeOutcome::SemanticFailure { debug_logs, .. } => debug_logs,
            BridgeOutcome::ProtocolFailure { .. } | BridgeOutcome::TransportFailure => &[],
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeOutcome::Success { .. } => "success",
            BridgeOutcome::SemanticFailure { .. } => "semantic_failure",
            BridgeOutcome::ProtocolFailure { .. } => "protocol_failure",
            BridgeOutcome::TransportFailure => "transport_failure",
        }
    }

    /// Collapse the failure variants into [`Error`] for `?`-style callers.
    pub fn into_result(self) -> Result<Tokenized> {
        match self {
            BridgeOutcome::Success { result, debug_logs } => Ok(Tokenized { result, debug_logs }),
            BridgeOutcome::SemanticFailure {
                message,
                debug_logs,
            } => Err(Error::Semantic {
                message,
                debug_logs,
            }),
            BridgeOutcome::ProtocolFailure { reason, raw } => Err(Error::Protocol {
                reason,
                raw: raw.into_inner(),
            }),
            BridgeOutcome::TransportFailure => Err(Error::Transport),
        }
    }
}
