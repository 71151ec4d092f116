//! # Model Reference Resolver
//!
//! Turns a caller hint into a [`ModelReference`]. Sources are tried in order
//! and the first match wins:
//!
//! 1. a non-empty explicit hint, used verbatim
//! 2. the local hub cache:
//!    `<cache_root>/<vendor>/hub/models--<default_model>/snapshots/<snapshot>/tokenizer.json`
//! 3. a fixed fallback path
//!
//! Resolution never fails. Filesystem errors while probing the cache are
//! logged at `debug` and the next source is tried; whether the reference
//! actually points at a loadable tokenizer is decided by the engine.

use crate::types::ModelReference;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

pub const DEFAULT_VENDOR: &str = "huggingface";
pub const DEFAULT_MODEL: &str = "bert-base-uncased";
pub const DEFAULT_FALLBACK_PATH: &str = "../models/tokenizer.json";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Which snapshot directory to use when the cache holds several.
///
/// Directory listing order is unspecified, so every policy sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotOrder {
    /// Lexicographically smallest name.
    #[default]
    First,
    /// Lexicographically largest name.
    Last,
    /// Most recently modified directory; ties broken by name.
    NewestModified,
}

#[derive(Debug, Clone)]
pub struct Resolver {
    cache_root: Option<PathBuf>,
    vendor: String,
    default_model: String,
    fallback_path: PathBuf,
    snapshot_order: SnapshotOrder,
}

impl Resolver {
    /// Resolver rooted at `~/.cache` with the stock defaults.
    pub fn new() -> Self {
        Self {
            cache_root: dirs::home_dir().map(|home| home.join(".cache")),
            vendor: DEFAULT_VENDOR.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            fallback_path: PathBuf::from(DEFAULT_FALLBACK_PATH),
            snapshot_order: SnapshotOrder::default(),
        }
    }

    /// Override the cache root (the directory that contains `<vendor>/hub`).
    pub fn with_cache_root(mut self, root: impl AsRef<Path>) -> Self {
        self.cache_root = Some(root.as_ref().to_path_buf());
        self
    }

    /// Disable the cache lookup entirely.
    pub fn without_cache(mut self) -> Self {
        self.cache_root = None;
        self
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = vendor.into();
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_fallback_path(mut self, path: impl AsRef<Path>) -> Self {
        self.fallback_path = path.as_ref().to_path_buf();
        self
    }

    pub fn with_snapshot_order(mut self, order: SnapshotOrder) -> Self {
        self.snapshot_order = order;
        self
    }

    pub fn fallback_path(&self) -> &Path {
        &self.fallback_path
    }

    /// Resolve a hint into a model reference. Always returns something.
    pub fn resolve(&self, explicit_hint: Option<&str>) -> ModelReference {
        if let Some(hint) = explicit_hint.filter(|h| !h.is_empty()) {
            debug!(reference = hint, "using explicit model hint");
            return ModelReference::new(hint);
        }

        if let Some(path) = self.find_cached_tokenizer() {
            debug!(path = %path.display(), "resolved tokenizer from local cache");
            return ModelReference::from_path(&path);
        }

        debug!(path = %self.fallback_path.display(), "falling back to default tokenizer path");
        ModelReference::from_path(&self.fallback_path)
    }

    /// `<cache_root>/<vendor>/hub/models--<model>/snapshots`, if a cache root is known.
    pub fn snapshots_dir(&self) -> Option<PathBuf> {
        let root = self.cache_root.as_ref()?;
        Some(
            root.join(&self.vendor)
                .join("hub")
                .join(format!("models--{}", self.default_model.replace('/', "--")))
                .join("snapshots"),
        )
    }

    fn find_cached_tokenizer(&self) -> Option<PathBuf> {
        let snapshots = self.snapshots_dir()?;
        let entries = match std::fs::read_dir(&snapshots) {
            Ok(rd) => rd,
            Err(e) => {
                debug!(dir = %snapshots.display(), error = %e, "snapshot cache not readable");
                return None;
            }
        };

        let mut candidates: Vec<(String, PathBuf, Option<SystemTime>)> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| {
                let modified = entry.metadata().ok().and_then(|m| m.modified().ok());
                (
                    entry.file_name().to_string_lossy().into_owned(),
                    entry.path(),
                    modified,
                )
            })
            .collect();

        if candidates.is_empty() {
            debug!(dir = %snapshots.display(), "snapshot cache is empty");
            return None;
        }
        candidates.sort_by(|a, b| a.0.cmp(&b.0));

        let chosen = match self.snapshot_order {
            SnapshotOrder::First => candidates.first(),
            SnapshotOrder::Last => candidates.last(),
            // max_by_key keeps the last maximum, i.e. the largest name on ties
            SnapshotOrder::NewestModified => candidates.iter().max_by_key(|c| c.2),
        }?;

        let tokenizer = chosen.1.join(TOKENIZER_FILE);
        if tokenizer.is_file() {
            Some(tokenizer)
        } else {
            debug!(snapshot = %chosen.0, "selected snapshot has no {}", TOKENIZER_FILE);
            None
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}
