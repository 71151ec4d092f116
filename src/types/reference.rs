//! Model reference type.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Identifier of a tokenizer artifact as understood by the native engine.
///
/// Either a filesystem path or a symbolic model id; the bridge never
/// distinguishes the two.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelReference(String);

impl ModelReference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn from_path(path: &Path) -> Self {
        Self(path.to_string_lossy().into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ModelReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ModelReference {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ModelReference {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ModelReference {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
