//! Tokenization result and payload types.

use serde::{Deserialize, Serialize};

/// Ordered diagnostic lines reported by the engine. Informational only.
pub type DiagnosticLog = Vec<String>;

/// Caller-owned copy of a response buffer returned by the engine.
///
/// By the time a `RawPayload` exists the native buffer it was copied from has
/// already been released. Bytes that were not valid UTF-8 are replaced with
/// U+FFFD and the payload is flagged so the decoder can reject it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload {
    text: String,
    lossy: bool,
}

impl RawPayload {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            lossy: false,
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(text) => Self::new(text),
            Err(_) => Self {
                text: String::from_utf8_lossy(bytes).into_owned(),
                lossy: true,
            },
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// True when the engine's bytes were not valid UTF-8.
    pub fn is_lossy(&self) -> bool {
        self.lossy
    }

    pub fn into_inner(self) -> String {
        self.text
    }
}

impl std::fmt::Display for RawPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Surface tokens paired index-by-index with their vocabulary ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizationResult {
    tokens: Vec<String>,
    ids: Vec<u32>,
}

impl TokenizationResult {
    /// Returns `None` when the two sequences differ in length.
    pub fn new(tokens: Vec<String>, ids: Vec<u32>) -> Option<Self> {
        if tokens.len() != ids.len() {
            return None;
        }
        Some(Self { tokens, ids })
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterate `(token, id)` pairs in order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.tokens
            .iter()
            .map(String::as_str)
            .zip(self.ids.iter().copied())
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<u32>) {
        (self.tokens, self.ids)
    }
}
