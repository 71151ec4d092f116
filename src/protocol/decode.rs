//! Payload decoder (RawPayload -> BridgeOutcome)

use super::outcome::BridgeOutcome;
use super::wire::ResponseEnvelope;
use crate::types::{RawPayload, TokenizationResult};
use tracing::{debug, warn};

/// Classify an engine payload.
///
/// Never called for a null response; that case is already a
/// [`BridgeOutcome::TransportFailure`] at the adapter.
pub fn decode(raw: RawPayload) -> BridgeOutcome {
    if raw.is_lossy() {
        warn!("engine payload is not valid UTF-8");
        return BridgeOutcome::ProtocolFailure {
            reason: "malformed response: payload is not valid UTF-8".to_string(),
            raw,
        };
    }

    let envelope: ResponseEnvelope = match serde_json::from_str(raw.as_str()) {
        Ok(env) => env,
        Err(e) => {
            warn!(error = %e, "engine payload is not a valid response object");
            return BridgeOutcome::ProtocolFailure {
                reason: format!("malformed response: {}", e),
                raw,
            };
        }
    };

    let debug_logs = envelope.debug_logs.clone().unwrap_or_default();
    for line in &debug_logs {
        debug!(target: "tokenizer_bridge::engine", "{}", line);
    }

    // An error string wins even when tokens/ids are also present.
    if let Some(message) = envelope.error_message() {
        return BridgeOutcome::SemanticFailure {
            message: message.to_string(),
            debug_logs,
        };
    }

    let (tokens, ids) = match (envelope.tokens, envelope.ids) {
        (Some(tokens), Some(ids)) => (tokens, ids),
        (tokens, ids) => {
            let missing = match (tokens.is_none(), ids.is_none()) {
                (true, true) => "tokens, ids",
                (true, false) => "tokens",
                _ => "ids",
            };
            warn!(missing, "engine payload lacks required fields");
            return BridgeOutcome::ProtocolFailure {
                reason: format!("missing required field(s): {}", missing),
                raw,
            };
        }
    };

    let (token_count, id_count) = (tokens.len(), ids.len());
    match TokenizationResult::new(tokens, ids) {
        Some(result) => BridgeOutcome::Success { result, debug_logs },
        None => {
            warn!(token_count, id_count, "engine payload has unpaired tokens and ids");
            BridgeOutcome::ProtocolFailure {
                reason: format!(
                    "tokens/ids length mismatch: {} tokens, {} ids",
                    token_count, id_count
                ),
                raw,
            }
        }
    }
}

/// Convenience wrapper over [`decode`] for borrowed text.
pub fn decode_str(raw: &str) -> BridgeOutcome {
    decode(RawPayload::new(raw))
}
