//! Serde model of the engine response.

use serde::{Deserialize, Serialize};

/// Response object as written by the engine.
///
/// Every field is optional at the serde level so that a bare
/// `{"error": "..."}` parses; the decoder enforces which fields a successful
/// response must carry. `debug_logs` may be `null`; a `null` `tokens` or
/// `ids` counts as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_logs: Option<Vec<String>>,
}

impl ResponseEnvelope {
    /// The engine's error message, if it reported a non-empty one.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}
